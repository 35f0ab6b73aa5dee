//! Solving a generated model.
//!
//! [`MilpBackend`] is the boundary to an external MILP solver. [`solve`]
//! runs one backend call, optionally bounded by a wall-clock timeout:
//!
//! ```ignore
//! use belt_algo::solve::{solve, SolverConfig};
//!
//! let outcome = solve(model.milp(), &SolverConfig::default().with_timeout(30))?;
//! ```

pub mod backend;
pub mod goodlp;

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use belt_core::{BalancerError, BalancerResult};

use crate::lp::MilpModel;
pub use backend::{Assignment, MilpBackend, SolveOutcome, SolveStatus};
pub use goodlp::{GoodLpBackend, MipSolverKind};

/// Which solver to use and how long to wait for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// MIP solver
    pub solver: MipSolverKind,
    /// Wall-clock limit in seconds; `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl SolverConfig {
    pub fn with_solver(mut self, solver: MipSolverKind) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Solve `model` with the solver named in `config`.
pub fn solve(model: &MilpModel, config: &SolverConfig) -> BalancerResult<SolveOutcome> {
    let backend: Arc<dyn MilpBackend> = Arc::new(config.solver.backend());
    solve_with(backend, model, config.timeout())
}

/// Solve `model` on `backend`, giving up after `timeout`.
///
/// Backends that enforce the limit themselves are called directly and stop
/// on their own, returning their best incumbent as
/// [`SolveStatus::Feasible`]. Any other backend runs on a watchdog thread:
/// when the deadline passes first the caller gets
/// [`BalancerError::SolverTimeout`], but the worker cannot be interrupted and
/// keeps running until the backend returns.
pub fn solve_with(
    backend: Arc<dyn MilpBackend>,
    model: &MilpModel,
    timeout: Option<Duration>,
) -> BalancerResult<SolveOutcome> {
    let Some(limit) = timeout else {
        return backend.solve(model, None);
    };

    if backend.enforces_time_limit() {
        info!(solver = backend.id(), time_limit = ?limit, "solving with time limit");
        return backend.solve(model, Some(limit));
    }

    info!(solver = backend.id(), timeout = ?limit, "solving on watchdog thread");
    let (tx, rx) = mpsc::channel();
    let owned = model.clone();
    let worker = Arc::clone(&backend);
    thread::Builder::new()
        .name(format!("milp-{}", backend.id()))
        .spawn(move || {
            // The receiver is gone once the deadline has passed.
            let _ = tx.send(worker.solve(&owned, Some(limit)));
        })?;

    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            warn!(
                solver = backend.id(),
                timeout = ?limit,
                "solver timed out; worker left running"
            );
            Err(BalancerError::SolverTimeout(limit))
        }
        Err(RecvTimeoutError::Disconnected) => Err(BalancerError::Solver(format!(
            "{} worker exited without a result",
            backend.id()
        ))),
    }
}
