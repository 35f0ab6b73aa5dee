//! End-to-end design run: generate, solve, decode.

use belt_core::{BalancerConfig, BalancerResult};
use tracing::info;

use crate::extract::{extract, BeltGraph};
use crate::formulation::BalancerModel;
use crate::solve::{solve, SolveOutcome, SolverConfig};

/// Everything produced by one design run.
#[derive(Debug, Clone)]
pub struct Design {
    pub model: BalancerModel,
    pub outcome: SolveOutcome,
    pub graph: BeltGraph,
}

/// Build the model for `config`, solve it and decode the result.
pub fn design(config: &BalancerConfig, solver: &SolverConfig) -> BalancerResult<Design> {
    let model = BalancerModel::build(config)?;
    let outcome = solve(model.milp(), solver)?;
    let graph = extract(&model, Some(&outcome))?;
    info!(
        belts = graph.connections.len(),
        splitters = graph.splitters.len(),
        objective = graph.objective,
        "balancer designed"
    );
    Ok(Design {
        model,
        outcome,
        graph,
    })
}
