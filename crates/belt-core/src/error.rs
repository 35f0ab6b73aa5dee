//! Unified error type for balancer generation, solving and decoding
//!
//! Every fallible operation in the workspace returns [`BalancerResult`]. The
//! variants follow the lifecycle of a design run: configuration problems are
//! caught before a model is handed to a solver, solver outcomes other than a
//! usable assignment are surfaced verbatim, and decoding fails when there is
//! no assignment to decode.
//!
//! # Example
//!
//! ```ignore
//! use belt_core::{BalancerConfig, BalancerResult};
//!
//! fn run(config: &BalancerConfig) -> BalancerResult<()> {
//!     config.validate()?;
//!     let model = BalancerModel::build(config)?;
//!     let outcome = solve(&model)?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use thiserror::Error;

/// Error type for all balancer operations.
///
/// The core never recovers from any of these on its own. Loosening big-M
/// constants or retrying with another splitter budget is a decision for the
/// caller.
#[derive(Error, Debug)]
pub enum BalancerError {
    /// Invalid or infeasible-by-construction counts or parameters.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The assembled system has no feasible assignment.
    #[error("Solver reported the model infeasible: {0}")]
    SolverInfeasible(String),

    /// The solver exceeded its time budget.
    #[error("Solver timed out after {0:?}")]
    SolverTimeout(Duration),

    /// Backend failure that is neither infeasibility nor a timeout.
    #[error("Solver error: {0}")]
    Solver(String),

    /// Extraction attempted without a valid assignment.
    #[error("Solution decode error: {0}")]
    SolutionDecode(String),

    /// I/O errors (config files, exports)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),
}

impl BalancerError {
    /// True for outcomes reported by the solving step rather than by
    /// generation or decoding.
    pub fn is_solver_outcome(&self) -> bool {
        matches!(
            self,
            BalancerError::SolverInfeasible(_)
                | BalancerError::SolverTimeout(_)
                | BalancerError::Solver(_)
        )
    }
}

/// Convenience type alias for Results using BalancerError.
pub type BalancerResult<T> = Result<T, BalancerError>;

impl From<serde_json::Error> for BalancerError {
    fn from(err: serde_json::Error) -> Self {
        BalancerError::Parse(err.to_string())
    }
}
