//! Decision variable allocation.

use std::collections::HashMap;

use belt_core::{
    BalancerConfig, CargoType, IndexSpace, Node, Route, ROUTE_CAPACITY, SPLITTER_MAX_DEGREE,
};

use crate::lp::{MilpModel, VarDomain, VarId};

/// Handles to every decision variable of a balancer model, keyed by index
/// tuple.
#[derive(Debug, Clone, Default)]
pub struct BalancerVariables {
    /// `e[p,q]` route existence
    pub e: HashMap<Route, VarId>,
    /// `v[p,q]` route volume
    pub v: HashMap<Route, VarId>,
    /// `t[p,q,c]` traffic fraction
    pub t: HashMap<(Route, CargoType), VarId>,
    /// `n[s]` fan-in
    pub n: HashMap<Node, VarId>,
    /// `m[s]` fan-out
    pub m: HashMap<Node, VarId>,
    /// `z[s]` split indicator
    pub z: HashMap<Node, VarId>,
    /// `x[s,c]` splitter inflow
    pub x: HashMap<(Node, CargoType), VarId>,
    /// `y[s,c]` splitter outflow
    pub y: HashMap<(Node, CargoType), VarId>,
    /// `xe[s,q,c]` = `e[s,q]·x[s,c]`
    pub xe: HashMap<(Route, CargoType), VarId>,
    /// `tz[s,q,c]` = `t[s,q,c]·z[s]`
    pub tz: HashMap<(Route, CargoType), VarId>,
}

impl BalancerVariables {
    /// Declare all variables in `model`.
    ///
    /// Declaration order is fixed (route families first, then splitter
    /// families, then auxiliaries) so variable handles are reproducible.
    pub fn allocate(model: &mut MilpModel, space: &IndexSpace, config: &BalancerConfig) -> Self {
        let mut vars = Self::default();
        let degree = SPLITTER_MAX_DEGREE as f64;
        let fraction = VarDomain::Continuous {
            min: 0.0,
            max: ROUTE_CAPACITY,
        };
        let inflow = VarDomain::Continuous {
            min: 0.0,
            max: config.big_m.u_x,
        };

        for &route in space.routes() {
            vars.e.insert(route, model.add_var(format!("e[{route}]"), VarDomain::Binary));
        }
        for &route in space.routes() {
            vars.v.insert(route, model.add_var(format!("v[{route}]"), fraction));
        }
        for (route, cargo) in space.route_cargos() {
            let id = model.add_var(format!("t[{route},{cargo}]"), fraction);
            vars.t.insert((route, cargo), id);
        }

        for &s in space.splitters() {
            let fan = VarDomain::Integer {
                min: 0.0,
                max: degree,
            };
            vars.n.insert(s, model.add_var(format!("n[{s}]"), fan));
            vars.m.insert(s, model.add_var(format!("m[{s}]"), fan));
            vars.z.insert(s, model.add_var(format!("z[{s}]"), VarDomain::Binary));
        }
        for (s, cargo) in space.splitter_cargos() {
            vars.x.insert((s, cargo), model.add_var(format!("x[{s},{cargo}]"), inflow));
            vars.y.insert((s, cargo), model.add_var(format!("y[{s},{cargo}]"), inflow));
        }

        for (route, cargo) in space.splitter_output_cargos() {
            let xe = model.add_var(format!("xe[{route},{cargo}]"), inflow);
            let tz = model.add_var(
                format!("tz[{route},{cargo}]"),
                VarDomain::Continuous {
                    min: 0.0,
                    max: config.big_m.u_t,
                },
            );
            vars.xe.insert((route, cargo), xe);
            vars.tz.insert((route, cargo), tz);
        }

        vars
    }

    /// Total number of handles.
    pub fn len(&self) -> usize {
        self.e.len()
            + self.v.len()
            + self.t.len()
            + self.n.len()
            + self.m.len()
            + self.z.len()
            + self.x.len()
            + self.y.len()
            + self.xe.len()
            + self.tz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
