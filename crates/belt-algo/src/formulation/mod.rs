//! Belt balancer MILP formulation
//!
//! Builds the full mixed-integer program for one [`BalancerConfig`]:
//!
//! ## Decision Variables
//!
//! | Variable | Index | Domain |
//! |----------|-------|--------|
//! | `e[p,q]` | route | binary |
//! | `v[p,q]` | route | `[0, 1]` |
//! | `t[p,q,c]` | route × cargo | `[0, 1]` |
//! | `n[s]`, `m[s]` | splitter | integer `[0, 2]` |
//! | `z[s]` | splitter | binary |
//! | `x[s,c]`, `y[s,c]` | splitter × cargo | `[0, U_x]` |
//! | `xe[s,q,c]` | splitter output × cargo | `[0, U_x]` |
//! | `tz[s,q,c]` | splitter output × cargo | `[0, U_t]` |
//!
//! ## Constraint Families
//!
//! 1. volume definition, 2. fan-in/out definition, 3. splitter flow
//! aggregation, 4. topology, 5. traffic balance, 6. capacity, 7. cargo
//! conservation, 8. degree bounds, 9. even-split linearization.
//!
//! ## Objective
//!
//! Minimize the total volume carried by all routes.

pub mod constraints;
pub mod mccormick;
pub mod nonlinear;
pub mod objective;
pub mod variables;

use std::time::Instant;

use belt_core::{BalancerConfig, BalancerResult, IndexSpace, TrafficParams};
use tracing::info;

use crate::lp::MilpModel;
use constraints::FamilyInputs;
pub use variables::BalancerVariables;

/// A generated balancer model together with the index space and parameters
/// it was built from.
#[derive(Debug, Clone)]
pub struct BalancerModel {
    config: BalancerConfig,
    space: IndexSpace,
    traffic: TrafficParams,
    vars: BalancerVariables,
    milp: MilpModel,
}

impl BalancerModel {
    /// Generate the model for `config`.
    ///
    /// Fails with [`belt_core::BalancerError::Configuration`] before any
    /// variable is declared when counts, big-M bounds or traffic conservation
    /// are invalid.
    pub fn build(config: &BalancerConfig) -> BalancerResult<Self> {
        let start = Instant::now();
        let space = IndexSpace::generate(config)?;
        let traffic = TrafficParams::build(&space)?;

        let mut milp = MilpModel::new();
        let vars = BalancerVariables::allocate(&mut milp, &space, config);
        constraints::add_all(
            &mut milp,
            &FamilyInputs {
                space: &space,
                traffic: &traffic,
                config,
                vars: &vars,
            },
        );
        objective::set_objective(&mut milp, &space, &vars);

        info!(
            config = %config,
            variables = milp.num_vars(),
            constraints = milp.constraints().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built balancer model"
        );

        Ok(Self {
            config: config.clone(),
            space,
            traffic,
            vars,
            milp,
        })
    }

    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    pub fn space(&self) -> &IndexSpace {
        &self.space
    }

    pub fn traffic(&self) -> &TrafficParams {
        &self.traffic
    }

    pub fn variables(&self) -> &BalancerVariables {
        &self.vars
    }

    pub fn milp(&self) -> &MilpModel {
        &self.milp
    }
}
