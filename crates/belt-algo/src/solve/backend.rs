//! Solver adapter boundary.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use belt_core::{BalancerError, BalancerResult};

use crate::lp::{MilpModel, VarId};

/// How good the returned assignment is known to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimal.
    Optimal,
    /// Feasible, optimality not proven.
    Feasible,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Feasible => write!(f, "feasible"),
        }
    }
}

/// One value per model variable, indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    values: Vec<f64>,
}

impl Assignment {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.get(var.index()).copied()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fail unless this assignment has one finite value per variable of
    /// `model`.
    pub fn check_shape(&self, model: &MilpModel) -> BalancerResult<()> {
        if self.values.len() != model.num_vars() {
            return Err(BalancerError::SolutionDecode(format!(
                "assignment has {} values but the model declares {} variables",
                self.values.len(),
                model.num_vars()
            )));
        }
        if let Some(pos) = self.values.iter().position(|v| !v.is_finite()) {
            return Err(BalancerError::SolutionDecode(format!(
                "non-finite value {} for {}",
                self.values[pos],
                model.var_name(VarId(pos))
            )));
        }
        Ok(())
    }
}

/// A successful solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub assignment: Assignment,
    pub objective: f64,
}

impl SolveOutcome {
    /// Wrap a raw assignment, checking its shape and evaluating the model's
    /// objective on it.
    pub fn from_values(
        model: &MilpModel,
        status: SolveStatus,
        values: Vec<f64>,
    ) -> BalancerResult<Self> {
        let assignment = Assignment::new(values);
        assignment
            .check_shape(model)
            .map_err(|e| BalancerError::Solver(format!("backend returned a bad assignment: {e}")))?;
        let objective = model.objective().evaluate(assignment.values());
        Ok(Self {
            status,
            assignment,
            objective,
        })
    }
}

/// A MILP solver.
///
/// Implementations report infeasibility as
/// [`BalancerError::SolverInfeasible`], a time limit that expires before any
/// feasible assignment as [`BalancerError::SolverTimeout`] and every other
/// failure as [`BalancerError::Solver`]. An assignment found before the limit
/// expired but not proven optimal comes back as [`SolveStatus::Feasible`].
pub trait MilpBackend: Send + Sync {
    /// Unique identifier (e.g., "microlp", "highs")
    fn id(&self) -> &str;

    /// Whether [`MilpBackend::solve`] stops by itself once `time_limit` has
    /// passed. Backends that return `false` are run on a watchdog thread.
    fn enforces_time_limit(&self) -> bool {
        false
    }

    /// Solve the model, stopping after `time_limit` if one is given.
    fn solve(
        &self,
        model: &MilpModel,
        time_limit: Option<Duration>,
    ) -> BalancerResult<SolveOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::VarDomain;

    #[test]
    fn test_backend_is_object_safe() {
        fn _accepts_backend(_b: &dyn MilpBackend) {}
        fn _assert_send_sync<T: Send + Sync>() {}
        _assert_send_sync::<Box<dyn MilpBackend>>();
    }

    #[test]
    fn test_shape_check() {
        let mut model = MilpModel::new();
        model.add_var("a", VarDomain::Binary);
        model.add_var("b", VarDomain::Binary);

        assert!(Assignment::new(vec![0.0, 1.0]).check_shape(&model).is_ok());
        assert!(matches!(
            Assignment::new(vec![0.0]).check_shape(&model),
            Err(BalancerError::SolutionDecode(_))
        ));
        let err = Assignment::new(vec![0.0, f64::NAN])
            .check_shape(&model)
            .unwrap_err();
        assert!(err.to_string().contains("b"));
    }

    #[test]
    fn test_outcome_evaluates_objective() {
        let mut model = MilpModel::new();
        let a = model.add_var("a", VarDomain::Continuous { min: 0.0, max: 1.0 });
        let b = model.add_var("b", VarDomain::Continuous { min: 0.0, max: 1.0 });
        model.set_objective(crate::lp::Sense::Minimize, a + 2.0 * b);

        let outcome =
            SolveOutcome::from_values(&model, SolveStatus::Optimal, vec![0.5, 0.25]).unwrap();
        assert_eq!(outcome.objective, 1.0);
        assert_eq!(outcome.assignment.value(b), Some(0.25));
        assert_eq!(outcome.status.to_string(), "optimal");
    }

    #[test]
    fn test_outcome_rejects_short_assignment() {
        let mut model = MilpModel::new();
        model.add_var("a", VarDomain::Binary);
        let err = SolveOutcome::from_values(&model, SolveStatus::Optimal, vec![]).unwrap_err();
        assert!(matches!(err, BalancerError::Solver(_)));
    }
}
