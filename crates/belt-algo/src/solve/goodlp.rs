//! `good_lp` solver backends.
//!
//! `microlp` is a pure-Rust branch-and-bound MIP solver and is always
//! available. HiGHS needs the `solver-highs` feature and handles the larger
//! layouts in reasonable time. Both take the time limit natively and return
//! their best incumbent when it runs out.

use std::str::FromStr;
use std::time::{Duration, Instant};

use good_lp::solvers::{
    ResolutionError, Solution, SolutionStatus, Solver, SolverModel, WithTimeLimit,
};
use good_lp::{constraint, variable, Expression, ProblemVariables, Variable, VariableDefinition};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use belt_core::{BalancerError, BalancerResult};

use super::backend::{MilpBackend, SolveOutcome, SolveStatus};
use crate::lp::{LinearExpr, MilpModel, Relation, Sense, VarDomain};

/// MIP solvers reachable through `good_lp`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MipSolverKind {
    #[default]
    Microlp,
    #[cfg(feature = "solver-highs")]
    Highs,
}

const AVAILABLE_MIP_SOLVERS: &[&str] = &[
    "microlp",
    #[cfg(feature = "solver-highs")]
    "highs",
];

impl MipSolverKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_MIP_SOLVERS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MipSolverKind::Microlp => "microlp",
            #[cfg(feature = "solver-highs")]
            MipSolverKind::Highs => "highs",
        }
    }

    /// Backend that solves with this solver.
    pub fn backend(&self) -> GoodLpBackend {
        GoodLpBackend::new(*self)
    }
}

impl std::fmt::Display for MipSolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn unknown_solver_error(label: &str) -> BalancerError {
    BalancerError::Configuration(format!(
        "unknown MIP solver '{}'; supported values: {}",
        label,
        MipSolverKind::available().join(", ")
    ))
}

impl FromStr for MipSolverKind {
    type Err = BalancerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "microlp" => Ok(MipSolverKind::Microlp),
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(MipSolverKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            other => Err(unknown_solver_error(other)),
        }
    }
}

/// Translates a [`MilpModel`] into a `good_lp` problem and solves it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpBackend {
    kind: MipSolverKind,
}

impl GoodLpBackend {
    pub fn new(kind: MipSolverKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> MipSolverKind {
        self.kind
    }
}

impl MilpBackend for GoodLpBackend {
    fn id(&self) -> &str {
        self.kind.as_str()
    }

    fn enforces_time_limit(&self) -> bool {
        true
    }

    fn solve(
        &self,
        model: &MilpModel,
        time_limit: Option<Duration>,
    ) -> BalancerResult<SolveOutcome> {
        let start = Instant::now();
        debug!(
            solver = self.id(),
            variables = model.num_vars(),
            constraints = model.constraints().len(),
            time_limit = ?time_limit,
            "handing model to good_lp"
        );

        let solved = match self.kind {
            MipSolverKind::Microlp => {
                solve_using(model, good_lp::solvers::microlp::microlp, time_limit)
            }
            #[cfg(feature = "solver-highs")]
            MipSolverKind::Highs => {
                solve_using(model, good_lp::solvers::highs::highs, time_limit)
            }
        };
        let (status, values) =
            solved.map_err(|err| map_resolution_error(err, time_limit, start.elapsed()))?;

        let outcome = SolveOutcome::from_values(model, status, values)?;
        info!(
            solver = self.id(),
            status = %outcome.status,
            objective = outcome.objective,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "solve finished"
        );
        Ok(outcome)
    }
}

fn definition(domain: &VarDomain) -> VariableDefinition {
    match *domain {
        VarDomain::Binary => variable().binary(),
        VarDomain::Integer { min, max } => variable().integer().min(min).max(max),
        VarDomain::Continuous { min, max } => variable().min(min).max(max),
    }
}

fn expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant_term());
    for (var, coef) in expr.terms() {
        out += coef * handles[var.index()];
    }
    out
}

fn solve_using<S>(
    model: &MilpModel,
    solver: S,
    time_limit: Option<Duration>,
) -> Result<(SolveStatus, Vec<f64>), ResolutionError>
where
    S: Solver,
    S::Model: SolverModel<Error = ResolutionError> + WithTimeLimit,
{
    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = model
        .vars()
        .iter()
        .map(|spec| vars.add(definition(&spec.domain).name(spec.name.clone())))
        .collect();

    let objective = expression(model.objective(), &handles);
    let unsolved = match model.sense() {
        Sense::Minimize => vars.minimise(objective),
        Sense::Maximize => vars.maximise(objective),
    };
    let mut problem = unsolved.using(solver);
    if let Some(limit) = time_limit {
        problem = problem.with_time_limit(limit.as_secs_f64());
    }

    for c in model.constraints() {
        let lhs = expression(&c.lhs, &handles);
        let row = match c.relation {
            Relation::Eq => constraint::eq(lhs, c.rhs),
            Relation::Le => constraint::leq(lhs, c.rhs),
            Relation::Ge => constraint::geq(lhs, c.rhs),
        };
        problem = problem.with(row);
    }

    let solution = problem.solve()?;
    let values = handles.iter().map(|&h| solution.value(h)).collect();
    Ok((solve_status(solution.status()), values))
}

/// Anything short of a proof of optimality is only feasible.
fn solve_status(status: SolutionStatus) -> SolveStatus {
    match status {
        SolutionStatus::Optimal => SolveStatus::Optimal,
        SolutionStatus::TimeLimit | SolutionStatus::GapLimit => SolveStatus::Feasible,
    }
}

/// A failure after the time limit has run out means no incumbent was found
/// in time.
fn map_resolution_error(
    err: ResolutionError,
    time_limit: Option<Duration>,
    elapsed: Duration,
) -> BalancerError {
    match (err, time_limit) {
        (ResolutionError::Infeasible, _) => {
            BalancerError::SolverInfeasible("no assignment satisfies every constraint".into())
        }
        (ResolutionError::Unbounded, _) => BalancerError::Solver("objective is unbounded".into()),
        (_, Some(limit)) if elapsed >= limit => BalancerError::SolverTimeout(limit),
        (other, _) => BalancerError::Solver(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::{Constraint, ConstraintFamily, VarId};

    #[test]
    fn test_solver_kind_parsing() {
        assert_eq!("microlp".parse::<MipSolverKind>().unwrap(), MipSolverKind::Microlp);
        assert_eq!("MICROLP".parse::<MipSolverKind>().unwrap(), MipSolverKind::Microlp);
        let err = "cplex".parse::<MipSolverKind>().unwrap_err();
        assert!(err.to_string().contains("supported values"));
        assert!(MipSolverKind::available().contains(&"microlp"));
    }

    #[cfg(not(feature = "solver-highs"))]
    #[test]
    fn test_highs_requires_feature() {
        assert!("highs".parse::<MipSolverKind>().is_err());
    }

    fn cover_model() -> (MilpModel, VarId, VarId) {
        // minimize a + 1.5b subject to a + 2b >= 3, a binary, b integer in [0, 2]
        let mut model = MilpModel::new();
        let a = model.add_var("a", VarDomain::Binary);
        let b = model.add_var("b", VarDomain::Integer { min: 0.0, max: 2.0 });
        model.add_constraint(Constraint::new(
            "cover",
            ConstraintFamily::Topology,
            a + 2.0 * b,
            Relation::Ge,
            3.0,
        ));
        model.set_objective(Sense::Minimize, a + 1.5 * b);
        (model, a, b)
    }

    #[test]
    fn test_small_integer_program() {
        let (model, a, b) = cover_model();

        let outcome = GoodLpBackend::default().solve(&model, None).unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert!((outcome.objective - 2.5).abs() < 1e-6);
        assert!((outcome.assignment.value(a).unwrap() - 1.0).abs() < 1e-6);
        assert!((outcome.assignment.value(b).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_generous_time_limit_still_proves_optimality() {
        let (model, _, _) = cover_model();
        let backend = GoodLpBackend::default();
        assert!(backend.enforces_time_limit());

        let outcome = backend.solve(&model, Some(Duration::from_secs(30))).unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert!((outcome.objective - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_unproven_incumbent_is_feasible() {
        assert_eq!(solve_status(SolutionStatus::Optimal), SolveStatus::Optimal);
        assert_eq!(solve_status(SolutionStatus::TimeLimit), SolveStatus::Feasible);
        assert_eq!(solve_status(SolutionStatus::GapLimit), SolveStatus::Feasible);
    }

    #[test]
    fn test_failure_after_limit_is_a_timeout() {
        let limit = Duration::from_secs(2);
        let err = map_resolution_error(
            ResolutionError::Other("Time limit reached before finding a feasible solution"),
            Some(limit),
            Duration::from_secs(3),
        );
        assert!(matches!(err, BalancerError::SolverTimeout(d) if d == limit));

        let err = map_resolution_error(
            ResolutionError::Str("numerical trouble".into()),
            Some(limit),
            Duration::from_millis(5),
        );
        assert!(matches!(err, BalancerError::Solver(_)));

        let err = map_resolution_error(ResolutionError::Infeasible, Some(limit), limit * 2);
        assert!(matches!(err, BalancerError::SolverInfeasible(_)));
    }

    #[test]
    fn test_infeasible_program() {
        let mut model = MilpModel::new();
        let a = model.add_var("a", VarDomain::Binary);
        model.add_constraint(Constraint::new(
            "too_much",
            ConstraintFamily::Topology,
            a,
            Relation::Eq,
            2.0,
        ));
        model.set_objective(Sense::Minimize, LinearExpr::from(a));

        let err = GoodLpBackend::default().solve(&model, None).unwrap_err();
        assert!(matches!(err, BalancerError::SolverInfeasible(_)));
    }
}
