//! Decoding a solver assignment into a belt graph.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use petgraph::algo::{has_path_connecting, is_cyclic_directed};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use belt_core::{BalancerError, BalancerResult, CargoType, Node};

use crate::formulation::BalancerModel;
use crate::lp::VarId;
use crate::solve::{Assignment, SolveOutcome, SolveStatus};

/// Binary variables above this value count as 1.
pub const ACTIVE_THRESHOLD: f64 = 0.5;

/// Cargo amounts below this are reported as absent.
const CARGO_EPSILON: f64 = 1e-9;

/// Traffic of one cargo on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CargoShare {
    pub cargo: CargoType,
    pub amount: f64,
}

/// A built belt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub producer: Node,
    pub consumer: Node,
    pub volume: f64,
    pub cargo: Vec<CargoShare>,
}

/// Degree and split flag of a splitter that carries any belt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterState {
    pub splitter: Node,
    pub fan_in: u8,
    pub fan_out: u8,
    pub splits: bool,
}

/// The decoded balancer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeltGraph {
    pub status: SolveStatus,
    pub objective: f64,
    /// Built belts, in model route order.
    pub connections: Vec<Connection>,
    /// Splitters in use.
    pub splitters: Vec<SplitterState>,
}

/// Decode `outcome` against `model`.
///
/// Fails with [`BalancerError::SolutionDecode`] when there is no outcome or
/// its assignment does not fit the model.
pub fn extract(model: &BalancerModel, outcome: Option<&SolveOutcome>) -> BalancerResult<BeltGraph> {
    let outcome = outcome.ok_or_else(|| {
        BalancerError::SolutionDecode("no assignment to decode; solve the model first".into())
    })?;
    let mut graph = extract_assignment(model, &outcome.assignment)?;
    graph.status = outcome.status;
    graph.objective = outcome.objective;
    Ok(graph)
}

/// Decode a bare assignment. Status is reported as feasible and the
/// objective is evaluated from the assignment.
pub fn extract_assignment(
    model: &BalancerModel,
    assignment: &Assignment,
) -> BalancerResult<BeltGraph> {
    let milp = model.milp();
    assignment.check_shape(milp)?;
    let values = assignment.values();
    let vars = model.variables();
    let space = model.space();
    let value = |id: VarId| values[id.index()];

    let mut connections = Vec::new();
    for route in space.routes() {
        if value(vars.e[route]) <= ACTIVE_THRESHOLD {
            continue;
        }
        let cargo = space
            .cargos()
            .iter()
            .map(|&c| CargoShare {
                cargo: c,
                amount: value(vars.t[&(*route, c)]),
            })
            .filter(|share| share.amount > CARGO_EPSILON)
            .collect();
        connections.push(Connection {
            producer: route.producer,
            consumer: route.consumer,
            volume: value(vars.v[route]),
            cargo,
        });
    }

    let splitters = space
        .splitters()
        .iter()
        .filter_map(|&s| {
            let fan_in = value(vars.n[&s]).round().max(0.0) as u8;
            let fan_out = value(vars.m[&s]).round().max(0.0) as u8;
            if fan_in == 0 && fan_out == 0 {
                return None;
            }
            Some(SplitterState {
                splitter: s,
                fan_in,
                fan_out,
                splits: value(vars.z[&s]) > ACTIVE_THRESHOLD,
            })
        })
        .collect::<Vec<_>>();

    debug!(
        connections = connections.len(),
        splitters = splitters.len(),
        "decoded assignment"
    );

    Ok(BeltGraph {
        status: SolveStatus::Feasible,
        objective: milp.objective().evaluate(values),
        connections,
        splitters,
    })
}

impl BeltGraph {
    /// `(producer, consumer, volume)` for every built belt.
    pub fn triples(&self) -> Vec<(Node, Node, f64)> {
        self.connections
            .iter()
            .map(|c| (c.producer, c.consumer, c.volume))
            .collect()
    }

    /// Total traffic per cargo arriving at `node`.
    pub fn delivered(&self, node: Node) -> BTreeMap<CargoType, f64> {
        let mut totals = BTreeMap::new();
        for conn in self.connections.iter().filter(|c| c.consumer == node) {
            for share in &conn.cargo {
                *totals.entry(share.cargo).or_insert(0.0) += share.amount;
            }
        }
        totals
    }

    /// Number of splitters that split.
    pub fn split_count(&self) -> usize {
        self.splitters.iter().filter(|s| s.splits).count()
    }

    /// Directed graph of built belts weighted by volume.
    pub fn to_digraph(&self) -> (DiGraph<Node, f64>, HashMap<Node, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for conn in &self.connections {
            let from = *index
                .entry(conn.producer)
                .or_insert_with(|| graph.add_node(conn.producer));
            let to = *index
                .entry(conn.consumer)
                .or_insert_with(|| graph.add_node(conn.consumer));
            graph.add_edge(from, to, conn.volume);
        }
        (graph, index)
    }

    /// Whether any belt feeds back into an earlier splitter.
    pub fn has_feedback_loop(&self) -> bool {
        let (graph, _) = self.to_digraph();
        is_cyclic_directed(&graph)
    }

    /// Whether a chain of belts leads from `from` to `to`.
    pub fn connects(&self, from: Node, to: Node) -> bool {
        let (graph, index) = self.to_digraph();
        match (index.get(&from), index.get(&to)) {
            (Some(&a), Some(&b)) => has_path_connecting(&graph, a, b, None),
            _ => false,
        }
    }

    /// JSON rendering.
    pub fn to_json(&self) -> BalancerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for BeltGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Belt connections in solution:")?;
        for conn in &self.connections {
            writeln!(
                f,
                "    {} -> {}    v = {:.8}",
                conn.producer, conn.consumer, conn.volume
            )?;
        }
        if !self.splitters.is_empty() {
            writeln!(f, "Splitters in use:")?;
            for s in &self.splitters {
                writeln!(
                    f,
                    "    {}    in = {}  out = {}{}",
                    s.splitter,
                    s.fan_in,
                    s.fan_out,
                    if s.splits { "  (split)" } else { "" }
                )?;
            }
        }
        write!(f, "Objective: {:.8} ({})", self.objective, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use belt_core::BalancerConfig;

    fn direct_model() -> BalancerModel {
        BalancerModel::build(&BalancerConfig::new(1, 1, 0)).unwrap()
    }

    #[test]
    fn test_missing_outcome() {
        let err = extract(&direct_model(), None).unwrap_err();
        assert!(matches!(err, BalancerError::SolutionDecode(_)));
    }

    #[test]
    fn test_shape_mismatch() {
        let model = direct_model();
        let err = extract_assignment(&model, &Assignment::new(vec![1.0])).unwrap_err();
        assert!(matches!(err, BalancerError::SolutionDecode(_)));
        let non_finite = Assignment::new(vec![1.0, f64::INFINITY, 1.0]);
        let err = extract_assignment(&model, &non_finite).unwrap_err();
        assert!(matches!(err, BalancerError::SolutionDecode(_)));
    }

    #[test]
    fn test_hand_built_assignment() {
        // Variables of the 1/1/0 model in declaration order: e, v, t
        let model = direct_model();
        let outcome = SolveOutcome {
            status: SolveStatus::Optimal,
            assignment: Assignment::new(vec![1.0, 1.0, 1.0]),
            objective: 1.0,
        };
        let graph = extract(&model, Some(&outcome)).unwrap();
        assert_eq!(
            graph.triples(),
            vec![(Node::Inbound(1), Node::Outbound(1), 1.0)]
        );
        assert_eq!(graph.connections[0].cargo.len(), 1);
        assert!(graph.splitters.is_empty());
        assert!(!graph.has_feedback_loop());
        assert!(graph.connects(Node::Inbound(1), Node::Outbound(1)));

        let text = graph.to_string();
        assert!(text.starts_with("Belt connections in solution:\n    i1 -> j1    v = 1.00000000"));
        assert!(text.contains("(optimal)"));
    }

    #[test]
    fn test_unbuilt_routes_are_skipped() {
        let model = direct_model();
        let graph = extract_assignment(&model, &Assignment::new(vec![0.4, 0.0, 0.0])).unwrap();
        assert!(graph.connections.is_empty());
        assert_eq!(graph.objective, 0.0);
    }

    #[test]
    fn test_json_rendering() {
        let model = direct_model();
        let graph = extract_assignment(&model, &Assignment::new(vec![1.0, 1.0, 1.0])).unwrap();
        let json = graph.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["connections"][0]["producer"]["kind"], "inbound");
        assert_eq!(parsed["connections"][0]["volume"], 1.0);
        assert_eq!(parsed["status"], "feasible");
    }
}
