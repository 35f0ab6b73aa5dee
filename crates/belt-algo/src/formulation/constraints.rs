//! Constraint families of the balancer formulation.
//!
//! Each family is generated by its own function, universally quantified over
//! its index set. An empty index set (no splitters, say) simply contributes no
//! rows.

use belt_core::{BalancerConfig, IndexSpace, TrafficParams};
use tracing::debug;

use super::mccormick::{linearize_product, Product};
use super::variables::BalancerVariables;
use crate::lp::{Constraint, ConstraintFamily, LinearExpr, MilpModel, Relation};

/// Everything a family generator reads.
pub struct FamilyInputs<'a> {
    pub space: &'a IndexSpace,
    pub traffic: &'a TrafficParams,
    pub config: &'a BalancerConfig,
    pub vars: &'a BalancerVariables,
}

/// Emit families 1 to 9 in order.
pub fn add_all(model: &mut MilpModel, inputs: &FamilyInputs<'_>) {
    volume_definition(model, inputs);
    fan_definition(model, inputs);
    flow_aggregation(model, inputs);
    topology(model, inputs);
    traffic_balance(model, inputs);
    capacity(model, inputs);
    cargo_conservation(model, inputs);
    degree_bounds(model, inputs);
    even_split(model, inputs);

    for (family, count) in model.family_counts() {
        debug!(family = family.label(), count, "constraints generated");
    }
}

/// 1. `v[p,q] = Σ_c t[p,q,c]`
fn volume_definition(model: &mut MilpModel, inputs: &FamilyInputs<'_>) {
    let FamilyInputs { space, vars, .. } = inputs;
    for &route in space.routes() {
        let total = LinearExpr::sum(space.cargos().iter().map(|&c| vars.t[&(route, c)]));
        model.add_constraint(Constraint::new(
            format!("volume[{route}]"),
            ConstraintFamily::VolumeDefinition,
            vars.v[&route],
            Relation::Eq,
            total,
        ));
    }
}

/// 2. `n[s] = Σ_p e[p,s]`, `m[s] = Σ_q e[s,q]`
fn fan_definition(model: &mut MilpModel, inputs: &FamilyInputs<'_>) {
    let FamilyInputs { space, vars, .. } = inputs;
    for &s in space.splitters() {
        let fan_in = LinearExpr::sum(space.routes_into(s).map(|r| vars.e[r]));
        model.add_constraint(Constraint::new(
            format!("fan_in[{s}]"),
            ConstraintFamily::FanDefinition,
            vars.n[&s],
            Relation::Eq,
            fan_in,
        ));
        let fan_out = LinearExpr::sum(space.routes_from(s).map(|r| vars.e[r]));
        model.add_constraint(Constraint::new(
            format!("fan_out[{s}]"),
            ConstraintFamily::FanDefinition,
            vars.m[&s],
            Relation::Eq,
            fan_out,
        ));
    }
}

/// 3. `x[s,c] = Σ_p t[p,s,c]`, `y[s,c] = Σ_q t[s,q,c]`
fn flow_aggregation(model: &mut MilpModel, inputs: &FamilyInputs<'_>) {
    let FamilyInputs { space, vars, .. } = inputs;
    for (s, c) in space.splitter_cargos() {
        let inflow = LinearExpr::sum(space.routes_into(s).map(|&r| vars.t[&(r, c)]));
        model.add_constraint(Constraint::new(
            format!("inflow[{s},{c}]"),
            ConstraintFamily::FlowAggregation,
            vars.x[&(s, c)],
            Relation::Eq,
            inflow,
        ));
        let outflow = LinearExpr::sum(space.routes_from(s).map(|&r| vars.t[&(r, c)]));
        model.add_constraint(Constraint::new(
            format!("outflow[{s},{c}]"),
            ConstraintFamily::FlowAggregation,
            vars.y[&(s, c)],
            Relation::Eq,
            outflow,
        ));
    }
}

/// 4. Every inbound belt leaves on exactly one route, every outbound belt is
/// fed by exactly one.
fn topology(model: &mut MilpModel, inputs: &FamilyInputs<'_>) {
    let FamilyInputs { space, vars, .. } = inputs;
    for &i in space.inbound() {
        model.add_constraint(Constraint::new(
            format!("inbound_degree[{i}]"),
            ConstraintFamily::Topology,
            LinearExpr::sum(space.routes_from(i).map(|r| vars.e[r])),
            Relation::Eq,
            1.0,
        ));
    }
    for &j in space.outbound() {
        model.add_constraint(Constraint::new(
            format!("outbound_degree[{j}]"),
            ConstraintFamily::Topology,
            LinearExpr::sum(space.routes_into(j).map(|r| vars.e[r])),
            Relation::Eq,
            1.0,
        ));
    }
}

/// 5. `Σ_q t[i,q,c] = f[i,c]`, `Σ_p t[p,j,c] = g[j,c]`
fn traffic_balance(model: &mut MilpModel, inputs: &FamilyInputs<'_>) {
    let FamilyInputs {
        space,
        traffic,
        vars,
        ..
    } = inputs;
    for (i, c) in space.inbound_cargos() {
        model.add_constraint(Constraint::new(
            format!("supply[{i},{c}]"),
            ConstraintFamily::TrafficBalance,
            LinearExpr::sum(space.routes_from(i).map(|&r| vars.t[&(r, c)])),
            Relation::Eq,
            traffic.supply(i, c),
        ));
    }
    for (j, c) in space.outbound_cargos() {
        model.add_constraint(Constraint::new(
            format!("demand[{j},{c}]"),
            ConstraintFamily::TrafficBalance,
            LinearExpr::sum(space.routes_into(j).map(|&r| vars.t[&(r, c)])),
            Relation::Eq,
            traffic.demand(j, c),
        ));
    }
}

/// 6. `v[p,q] <= e[p,q]`
fn capacity(model: &mut MilpModel, inputs: &FamilyInputs<'_>) {
    let FamilyInputs { space, vars, .. } = inputs;
    for &route in space.routes() {
        model.add_constraint(Constraint::new(
            format!("capacity[{route}]"),
            ConstraintFamily::Capacity,
            vars.v[&route],
            Relation::Le,
            vars.e[&route],
        ));
    }
}

/// 7. `x[s,c] = y[s,c]`
fn cargo_conservation(model: &mut MilpModel, inputs: &FamilyInputs<'_>) {
    let FamilyInputs { space, vars, .. } = inputs;
    for (s, c) in space.splitter_cargos() {
        model.add_constraint(Constraint::new(
            format!("conservation[{s},{c}]"),
            ConstraintFamily::CargoConservation,
            vars.x[&(s, c)],
            Relation::Eq,
            vars.y[&(s, c)],
        ));
    }
}

/// 8. Fan-in at most 2; a splitting splitter has fan-in at least 1 and
/// fan-out exactly 2, a non-splitting one fan-out at most 1. Fan-in and
/// fan-out are zero together or non-zero together.
fn degree_bounds(model: &mut MilpModel, inputs: &FamilyInputs<'_>) {
    let FamilyInputs { space, vars, .. } = inputs;
    let family = ConstraintFamily::DegreeBounds;
    for &s in space.splitters() {
        let (n, m, z) = (vars.n[&s], vars.m[&s], vars.z[&s]);
        let rows: [(&str, LinearExpr, Relation, LinearExpr); 6] = [
            ("max_fan_in", n.into(), Relation::Le, LinearExpr::constant(2.0)),
            ("split_fan_in", n.into(), Relation::Ge, z.into()),
            ("split_fan_out", m.into(), Relation::Ge, 2.0 * z),
            ("single_fan_out", m.into(), Relation::Le, 1.0 + LinearExpr::from(z)),
            ("fed_outputs", m.into(), Relation::Le, 2.0 * n),
            ("drained_inputs", n.into(), Relation::Le, 2.0 * m),
        ];
        for (label, lhs, relation, rhs) in rows {
            model.add_constraint(Constraint::new(
                format!("{label}[{s}]"),
                family,
                lhs,
                relation,
                rhs,
            ));
        }
    }
}

/// 9. `t[s,q,c]·(1 + z[s]) = e[s,q]·x[s,c]` via `xe = e·x`, `tz = t·z`,
/// `xe = t + tz`.
fn even_split(model: &mut MilpModel, inputs: &FamilyInputs<'_>) {
    let FamilyInputs { space, config, vars, .. } = inputs;
    let family = ConstraintFamily::EvenSplit;
    for (route, c) in space.splitter_output_cargos() {
        let s = route.producer;
        let key = (route, c);
        let (t, xe, tz) = (vars.t[&key], vars.xe[&key], vars.tz[&key]);

        linearize_product(
            model,
            family,
            &format!("xe[{route},{c}]"),
            Product {
                product: xe,
                continuous: vars.x[&(s, c)],
                binary: vars.e[&route],
                bound: config.big_m.u_x,
            },
        );
        linearize_product(
            model,
            family,
            &format!("tz[{route},{c}]"),
            Product {
                product: tz,
                continuous: t,
                binary: vars.z[&s],
                bound: config.big_m.u_t,
            },
        );
        model.add_constraint(Constraint::new(
            format!("split[{route},{c}]"),
            family,
            xe,
            Relation::Eq,
            t + tz,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(config: &BalancerConfig) -> MilpModel {
        let space = IndexSpace::generate(config).unwrap();
        let traffic = TrafficParams::build(&space).unwrap();
        let mut model = MilpModel::new();
        let vars = BalancerVariables::allocate(&mut model, &space, config);
        add_all(
            &mut model,
            &FamilyInputs {
                space: &space,
                traffic: &traffic,
                config,
                vars: &vars,
            },
        );
        model
    }

    #[test]
    fn test_family_sizes() {
        let config = BalancerConfig::new(2, 2, 2);
        let space = IndexSpace::generate(&config).unwrap();
        let model = build(&config);
        let counts = model.family_counts();

        let routes = space.routes().len();
        let outputs = space.splitter_outputs().count();
        assert_eq!(counts[&ConstraintFamily::VolumeDefinition], routes);
        assert_eq!(counts[&ConstraintFamily::FanDefinition], 2 * 2);
        assert_eq!(counts[&ConstraintFamily::FlowAggregation], 2 * 2 * 2);
        assert_eq!(counts[&ConstraintFamily::Topology], 2 + 2);
        assert_eq!(counts[&ConstraintFamily::TrafficBalance], 2 * 2 + 2 * 2);
        assert_eq!(counts[&ConstraintFamily::Capacity], routes);
        assert_eq!(counts[&ConstraintFamily::CargoConservation], 2 * 2);
        assert_eq!(counts[&ConstraintFamily::DegreeBounds], 6 * 2);
        assert_eq!(counts[&ConstraintFamily::EvenSplit], 7 * outputs * 2);
    }

    #[test]
    fn test_no_splitters_only_route_families() {
        let model = build(&BalancerConfig::new(1, 1, 0));
        let counts = model.family_counts();
        assert_eq!(counts[&ConstraintFamily::VolumeDefinition], 1);
        assert_eq!(counts[&ConstraintFamily::Topology], 2);
        assert_eq!(counts[&ConstraintFamily::TrafficBalance], 2);
        assert_eq!(counts[&ConstraintFamily::Capacity], 1);
        assert_eq!(counts[&ConstraintFamily::FanDefinition], 0);
        assert_eq!(counts[&ConstraintFamily::DegreeBounds], 0);
        assert_eq!(counts[&ConstraintFamily::EvenSplit], 0);
    }

    #[test]
    fn test_traffic_balance_right_hand_sides() {
        let model = build(&BalancerConfig::new(2, 4, 1));
        let supply: Vec<f64> = model
            .constraints()
            .iter()
            .filter(|c| c.name.starts_with("supply["))
            .map(|c| c.rhs)
            .collect();
        assert_eq!(supply, vec![1.0, 0.0, 0.0, 1.0]);

        let demand = model
            .constraints()
            .iter()
            .find(|c| c.name == "demand[j3,c2]")
            .unwrap();
        assert_eq!(demand.rhs, 0.25);
    }

    #[test]
    fn test_split_link_row() {
        let model = build(&BalancerConfig::new(2, 2, 1));
        let link = model
            .constraints()
            .iter()
            .find(|c| c.name == "split[s1,j1,c1]")
            .unwrap();
        assert_eq!(
            model.format_constraint(link),
            "split[s1,j1,c1]: -t[s1,j1,c1] + xe[s1,j1,c1] - tz[s1,j1,c1] = 0"
        );
    }
}
