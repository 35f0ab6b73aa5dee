//! # belt-algo: Belt Balancer Design as a MILP
//!
//! Generates, solves and checks the mixed-integer program whose solutions
//! are splitter networks that spread N inbound cargo streams evenly over M
//! outbound belts.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Generation | [`formulation`] | [`BalancerModel`] wrapping a [`lp::MilpModel`] |
//! | Solving | [`solve`] | [`solve::SolveOutcome`] |
//! | Decoding | [`extract`] | [`BeltGraph`] |
//! | Checking | [`verify`] | [`verify::VerificationReport`] |
//! | Export | [`export`] | summary, full dump, CPLEX LP text |
//!
//! ## Example
//!
//! ```no_run
//! use belt_algo::{design, SolverConfig};
//! use belt_core::BalancerConfig;
//!
//! let run = design(&BalancerConfig::new(2, 2, 1), &SolverConfig::default())?;
//! println!("{}", run.graph);
//! # Ok::<(), belt_core::BalancerError>(())
//! ```

pub mod export;
pub mod extract;
pub mod formulation;
pub mod lp;
pub mod pipeline;
pub mod solve;
pub mod verify;

pub use extract::{extract, extract_assignment, BeltGraph, CargoShare, Connection, SplitterState};
pub use formulation::BalancerModel;
pub use pipeline::{design, Design};
pub use solve::{MilpBackend, MipSolverKind, SolveOutcome, SolveStatus, SolverConfig};
pub use verify::{verify, VerificationReport, Violation, ViolationKind, DEFAULT_TOLERANCE};
