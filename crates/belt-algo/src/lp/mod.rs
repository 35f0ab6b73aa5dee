//! Solver-independent MILP description.
//!
//! The balancer formulation is written against these types only. Backends
//! translate a [`MilpModel`] into their own representation at solve time, so
//! the same model can be dumped, exported, verified or solved by any of them.

pub mod expr;
pub mod model;

pub use expr::{LinearExpr, VarId};
pub use model::{Constraint, ConstraintFamily, MilpModel, Relation, Sense, VarDomain, VarSpec};
