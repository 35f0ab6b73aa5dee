//! Objective: minimize total belt volume.

use belt_core::IndexSpace;

use super::variables::BalancerVariables;
use crate::lp::{LinearExpr, MilpModel, Sense};

/// `minimize Σ_{(p,q)∈B} v[p,q]`
pub fn set_objective(model: &mut MilpModel, space: &IndexSpace, vars: &BalancerVariables) {
    let total = LinearExpr::sum(space.routes().iter().map(|r| vars.v[r]));
    model.set_objective(Sense::Minimize, total);
}
