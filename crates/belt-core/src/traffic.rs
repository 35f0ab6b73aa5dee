//! Per-cargo traffic parameters.
//!
//! Every inbound belt carries its own cargo at `v_in`; every outbound belt
//! must receive `v_out` in total, split evenly across all cargos. Throughput
//! is capped by the narrower side.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BalancerError, BalancerResult};
use crate::index::{CargoType, IndexSpace, Node};

/// Tolerance of the supply/demand balance check.
pub const CONSERVATION_TOLERANCE: f64 = 1e-9;

/// Traffic fractions derived from belt counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficParams {
    /// `min(|I|, |J|)`
    pub throughput: f64,
    /// Load on each inbound belt.
    pub v_in: f64,
    /// Load on each outbound belt.
    pub v_out: f64,
    cargo_count: usize,
}

impl TrafficParams {
    /// Derive the parameters and check that every cargo's supply equals its
    /// demand.
    pub fn build(space: &IndexSpace) -> BalancerResult<Self> {
        let n_in = space.inbound().len();
        let n_out = space.outbound().len();
        let n_cargo = space.cargos().len();
        if n_in == 0 || n_out == 0 || n_cargo == 0 {
            return Err(BalancerError::Configuration(
                "traffic parameters need at least one inbound belt, outbound belt and cargo"
                    .into(),
            ));
        }

        let throughput = n_in.min(n_out) as f64;
        let params = Self {
            throughput,
            v_in: throughput / n_in as f64,
            v_out: throughput / n_out as f64,
            cargo_count: n_cargo,
        };

        for (i, c) in space.inbound_cargos() {
            check_fraction("f", i, c, params.supply(i, c))?;
        }
        for (j, c) in space.outbound_cargos() {
            check_fraction("g", j, c, params.demand(j, c))?;
        }
        for &c in space.cargos() {
            let supply: f64 = space.inbound().iter().map(|&i| params.supply(i, c)).sum();
            let demand: f64 = space.outbound().iter().map(|&j| params.demand(j, c)).sum();
            if (supply - demand).abs() > CONSERVATION_TOLERANCE {
                return Err(BalancerError::Configuration(format!(
                    "cargo {c} is not conserved: supply {supply} != demand {demand}"
                )));
            }
        }

        debug!(
            throughput = params.throughput,
            v_in = params.v_in,
            v_out = params.v_out,
            "traffic parameters"
        );
        Ok(params)
    }

    /// `f[i,c]`: traffic of cargo `c` on inbound belt `i`.
    pub fn supply(&self, inbound: Node, cargo: CargoType) -> f64 {
        if inbound.is_inbound() && inbound.ordinal() == cargo.ordinal() {
            self.v_in
        } else {
            0.0
        }
    }

    /// `g[j,c]`: traffic of cargo `c` required on outbound belt `j`.
    pub fn demand(&self, outbound: Node, _cargo: CargoType) -> f64 {
        if outbound.is_outbound() {
            self.v_out / self.cargo_count as f64
        } else {
            0.0
        }
    }
}

fn check_fraction(name: &str, node: Node, cargo: CargoType, value: f64) -> BalancerResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(BalancerError::Configuration(format!(
            "{name}[{node},{cargo}] = {value} is outside [0, 1]"
        )));
    }
    Ok(())
}
