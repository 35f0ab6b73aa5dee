//! Index spaces of the balancer model.
//!
//! Belt endpoints are identified by a kind and a 1-based ordinal. Producers
//! (inbound belts and splitters) feed consumers (splitters and outbound belts)
//! along routes; [`IndexSpace::generate`] enumerates the legal routes by
//! applying [`is_admissible`] to each producer/consumer pair as it goes.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BalancerConfig;
use crate::error::BalancerResult;

/// A belt endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum Node {
    Inbound(usize),
    Splitter(usize),
    Outbound(usize),
}

impl Node {
    /// 1-based ordinal within the node's kind.
    pub fn ordinal(&self) -> usize {
        match self {
            Node::Inbound(k) | Node::Splitter(k) | Node::Outbound(k) => *k,
        }
    }

    pub fn is_inbound(&self) -> bool {
        matches!(self, Node::Inbound(_))
    }

    pub fn is_splitter(&self) -> bool {
        matches!(self, Node::Splitter(_))
    }

    pub fn is_outbound(&self) -> bool {
        matches!(self, Node::Outbound(_))
    }

    /// Nodes that can feed a route.
    pub fn is_producer(&self) -> bool {
        !self.is_outbound()
    }

    /// Nodes that can receive a route.
    pub fn is_consumer(&self) -> bool {
        !self.is_inbound()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Inbound(k) => write!(f, "i{k}"),
            Node::Splitter(k) => write!(f, "s{k}"),
            Node::Outbound(k) => write!(f, "j{k}"),
        }
    }
}

/// A cargo type, one per inbound belt. 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CargoType(pub usize);

impl CargoType {
    pub fn ordinal(&self) -> usize {
        self.0
    }
}

impl fmt::Display for CargoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A directed belt connection from a producer to a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Route {
    pub producer: Node,
    pub consumer: Node,
}

impl Route {
    pub fn new(producer: Node, consumer: Node) -> Self {
        Self { producer, consumer }
    }

    /// Route leaves a splitter.
    pub fn is_splitter_output(&self) -> bool {
        self.producer.is_splitter()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.producer, self.consumer)
    }
}

/// Whether `producer -> consumer` is a legal belt.
///
/// Splitters never feed themselves. Inbound belts may only reach outbound
/// belts directly when there are no splitters to route through.
pub fn is_admissible(producer: Node, consumer: Node, splitter_budget: usize) -> bool {
    if !producer.is_producer() || !consumer.is_consumer() {
        return false;
    }
    if producer.is_splitter() && producer == consumer {
        return false;
    }
    if producer.is_inbound() && consumer.is_outbound() {
        return splitter_budget == 0;
    }
    true
}

/// All index sets of one balancer instance.
#[derive(Debug, Clone)]
pub struct IndexSpace {
    inbound: Vec<Node>,
    outbound: Vec<Node>,
    splitters: Vec<Node>,
    cargos: Vec<CargoType>,
    producers: Vec<Node>,
    consumers: Vec<Node>,
    routes: Vec<Route>,
    route_set: HashSet<Route>,
}

impl IndexSpace {
    /// Enumerate every index set for `config`.
    ///
    /// Routes are listed producer-major in `P = I ∪ S` order, then consumer in
    /// `Q = S ∪ J` order. This order is stable and is the order in which
    /// extracted connections are reported.
    pub fn generate(config: &BalancerConfig) -> BalancerResult<Self> {
        config.validate()?;

        let inbound: Vec<Node> = (1..=config.inbound).map(Node::Inbound).collect();
        let outbound: Vec<Node> = (1..=config.outbound).map(Node::Outbound).collect();
        let splitters: Vec<Node> = (1..=config.splitters).map(Node::Splitter).collect();
        let cargos: Vec<CargoType> = (1..=config.cargos()).map(CargoType).collect();

        let producers: Vec<Node> = inbound.iter().chain(splitters.iter()).copied().collect();
        let consumers: Vec<Node> = splitters.iter().chain(outbound.iter()).copied().collect();

        let mut routes = Vec::new();
        for &p in &producers {
            for &q in &consumers {
                if is_admissible(p, q, config.splitters) {
                    routes.push(Route::new(p, q));
                }
            }
        }
        let route_set: HashSet<Route> = routes.iter().copied().collect();

        debug!(
            producers = producers.len(),
            consumers = consumers.len(),
            routes = routes.len(),
            "generated index space"
        );

        Ok(Self {
            inbound,
            outbound,
            splitters,
            cargos,
            producers,
            consumers,
            routes,
            route_set,
        })
    }

    pub fn inbound(&self) -> &[Node] {
        &self.inbound
    }

    pub fn outbound(&self) -> &[Node] {
        &self.outbound
    }

    pub fn splitters(&self) -> &[Node] {
        &self.splitters
    }

    pub fn cargos(&self) -> &[CargoType] {
        &self.cargos
    }

    /// `P = I ∪ S`
    pub fn producers(&self) -> &[Node] {
        &self.producers
    }

    /// `Q = S ∪ J`
    pub fn consumers(&self) -> &[Node] {
        &self.consumers
    }

    /// Legal routes `B`, in stable order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// O(1) route membership.
    pub fn contains(&self, producer: Node, consumer: Node) -> bool {
        self.route_set.contains(&Route::new(producer, consumer))
    }

    /// Routes whose producer is a splitter (`W`).
    pub fn splitter_outputs(&self) -> impl Iterator<Item = &Route> + '_ {
        self.routes.iter().filter(|r| r.is_splitter_output())
    }

    /// Legal routes leaving `producer`.
    pub fn routes_from(&self, producer: Node) -> impl Iterator<Item = &Route> + '_ {
        self.routes.iter().filter(move |r| r.producer == producer)
    }

    /// Legal routes entering `consumer`.
    pub fn routes_into(&self, consumer: Node) -> impl Iterator<Item = &Route> + '_ {
        self.routes.iter().filter(move |r| r.consumer == consumer)
    }

    /// `B × C`
    pub fn route_cargos(&self) -> impl Iterator<Item = (Route, CargoType)> + '_ {
        self.routes
            .iter()
            .flat_map(move |&r| self.cargos.iter().map(move |&c| (r, c)))
    }

    /// `W × C`
    pub fn splitter_output_cargos(&self) -> impl Iterator<Item = (Route, CargoType)> + '_ {
        self.splitter_outputs()
            .flat_map(move |&r| self.cargos.iter().map(move |&c| (r, c)))
    }

    /// `S × C`
    pub fn splitter_cargos(&self) -> impl Iterator<Item = (Node, CargoType)> + '_ {
        self.splitters
            .iter()
            .flat_map(move |&s| self.cargos.iter().map(move |&c| (s, c)))
    }

    /// `I × C`
    pub fn inbound_cargos(&self) -> impl Iterator<Item = (Node, CargoType)> + '_ {
        self.inbound
            .iter()
            .flat_map(move |&i| self.cargos.iter().map(move |&c| (i, c)))
    }

    /// `J × C`
    pub fn outbound_cargos(&self) -> impl Iterator<Item = (Node, CargoType)> + '_ {
        self.outbound
            .iter()
            .flat_map(move |&j| self.cargos.iter().map(move |&c| (j, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BalancerError;

    #[test]
    fn test_node_display() {
        assert_eq!(Node::Inbound(1).to_string(), "i1");
        assert_eq!(Node::Splitter(10).to_string(), "s10");
        assert_eq!(Node::Outbound(3).to_string(), "j3");
        assert_eq!(CargoType(2).to_string(), "c2");
        assert_eq!(Route::new(Node::Inbound(1), Node::Splitter(2)).to_string(), "i1,s2");
    }

    #[test]
    fn test_admissibility_rules() {
        assert!(!is_admissible(Node::Splitter(1), Node::Splitter(1), 2));
        assert!(is_admissible(Node::Splitter(1), Node::Splitter(2), 2));
        assert!(!is_admissible(Node::Inbound(1), Node::Outbound(1), 2));
        assert!(is_admissible(Node::Inbound(1), Node::Outbound(1), 0));
        assert!(!is_admissible(Node::Outbound(1), Node::Splitter(1), 2));
        assert!(!is_admissible(Node::Splitter(1), Node::Inbound(1), 2));
    }

    #[test]
    fn test_route_count() {
        // |I|·|S| + |S|·(|S|-1) + |S|·|J|
        let space = IndexSpace::generate(&BalancerConfig::new(2, 3, 4)).unwrap();
        assert_eq!(space.routes().len(), 2 * 4 + 4 * 3 + 4 * 3);
        assert_eq!(space.splitter_outputs().count(), 4 * 3 + 4 * 3);
        assert_eq!(space.cargos().len(), 2);
        assert_eq!(space.route_cargos().count(), space.routes().len() * 2);
    }

    #[test]
    fn test_routes_respect_exclusions() {
        let space = IndexSpace::generate(&BalancerConfig::default()).unwrap();
        for route in space.routes() {
            assert!(!(route.producer.is_inbound() && route.consumer.is_outbound()));
            assert_ne!(route.producer, route.consumer);
        }
        assert!(space.contains(Node::Inbound(1), Node::Splitter(1)));
        assert!(!space.contains(Node::Inbound(1), Node::Outbound(1)));
        assert!(!space.contains(Node::Splitter(4), Node::Splitter(4)));
    }

    #[test]
    fn test_zero_splitters_admits_direct_routes() {
        let space = IndexSpace::generate(&BalancerConfig::new(1, 1, 0)).unwrap();
        assert_eq!(
            space.routes(),
            &[Route::new(Node::Inbound(1), Node::Outbound(1))]
        );
        assert_eq!(space.splitter_outputs().count(), 0);
        assert_eq!(space.splitter_cargos().count(), 0);
    }

    #[test]
    fn test_route_order_is_stable() {
        let space = IndexSpace::generate(&BalancerConfig::new(1, 1, 2)).unwrap();
        let names: Vec<String> = space.routes().iter().map(|r| r.to_string()).collect();
        assert_eq!(
            names,
            vec!["i1,s1", "i1,s2", "s1,s2", "s1,j1", "s2,s1", "s2,j1"]
        );
    }

    #[test]
    fn test_incident_routes() {
        let space = IndexSpace::generate(&BalancerConfig::new(2, 2, 1)).unwrap();
        assert_eq!(space.routes_from(Node::Splitter(1)).count(), 2);
        assert_eq!(space.routes_into(Node::Splitter(1)).count(), 2);
        assert_eq!(space.routes_into(Node::Outbound(2)).count(), 1);
    }

    #[test]
    fn test_invalid_counts() {
        let err = IndexSpace::generate(&BalancerConfig::new(0, 1, 1)).unwrap_err();
        assert!(matches!(err, BalancerError::Configuration(_)));
    }
}
