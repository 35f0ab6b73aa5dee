//! Balancer configuration.
//!
//! A [`BalancerConfig`] is the only input to model generation. It is built
//! once, validated, and then passed by reference through every stage; nothing
//! downstream mutates it.
//!
//! The big-M constants are not tuning knobs. They must bound the quantities
//! they linearize: `u_t` bounds any per-cargo traffic fraction on a route
//! (route capacity is 1) and `u_x` bounds any per-cargo splitter inflow (at
//! most two inputs at full capacity). Smaller values would cut off feasible
//! balancers, so [`BalancerConfig::validate`] rejects them.

use serde::{Deserialize, Serialize};

use crate::error::{BalancerError, BalancerResult};

/// Capacity of a single belt, in units of one full belt.
pub const ROUTE_CAPACITY: f64 = 1.0;

/// Maximum number of input (and output) belts a splitter accepts.
pub const SPLITTER_MAX_DEGREE: usize = 2;

/// Big-M bounds used by the even-split linearization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BigM {
    /// Upper bound on the traffic of one cargo along any route.
    pub u_t: f64,
    /// Upper bound on the traffic of one cargo flowing into any splitter.
    pub u_x: f64,
}

impl BigM {
    /// Smallest provable bound for `t[p,q,c]`.
    pub const MIN_U_T: f64 = ROUTE_CAPACITY;
    /// Smallest provable bound for `x[s,c]`.
    pub const MIN_U_X: f64 = SPLITTER_MAX_DEGREE as f64 * ROUTE_CAPACITY;

    pub fn new(u_t: f64, u_x: f64) -> Self {
        Self { u_t, u_x }
    }

    /// Reject bounds that are not finite or that fall below the provable
    /// bounds of the variables they multiply.
    pub fn validate(&self) -> BalancerResult<()> {
        if !self.u_t.is_finite() || self.u_t < Self::MIN_U_T {
            return Err(BalancerError::Configuration(format!(
                "u_t must be a finite bound of at least {} (got {})",
                Self::MIN_U_T,
                self.u_t
            )));
        }
        if !self.u_x.is_finite() || self.u_x < Self::MIN_U_X {
            return Err(BalancerError::Configuration(format!(
                "u_x must be a finite bound of at least {} (got {})",
                Self::MIN_U_X,
                self.u_x
            )));
        }
        Ok(())
    }
}

impl Default for BigM {
    fn default() -> Self {
        Self {
            u_t: Self::MIN_U_T,
            u_x: Self::MIN_U_X,
        }
    }
}

/// Everything needed to generate a balancer model.
///
/// The default is the 8 inbound, 8 outbound, 10 splitter reference layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Number of inbound belts (one cargo type each).
    pub inbound: usize,
    /// Number of outbound belts.
    pub outbound: usize,
    /// Number of splitters the design may use.
    pub splitters: usize,
    /// Linearization bounds.
    pub big_m: BigM,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            inbound: 8,
            outbound: 8,
            splitters: 10,
            big_m: BigM::default(),
        }
    }
}

impl BalancerConfig {
    /// Create a configuration with default big-M bounds.
    pub fn new(inbound: usize, outbound: usize, splitters: usize) -> Self {
        Self {
            inbound,
            outbound,
            splitters,
            big_m: BigM::default(),
        }
    }

    /// Set the big-M bounds
    pub fn with_big_m(mut self, big_m: BigM) -> Self {
        self.big_m = big_m;
        self
    }

    /// Set the splitter budget
    pub fn with_splitters(mut self, splitters: usize) -> Self {
        self.splitters = splitters;
        self
    }

    /// Number of cargo types, fixed to one per inbound belt.
    pub fn cargos(&self) -> usize {
        self.inbound
    }

    /// Check counts and bounds.
    ///
    /// Inbound and outbound counts must be positive. A splitter budget of
    /// zero is allowed; it describes a network of direct belts only.
    pub fn validate(&self) -> BalancerResult<()> {
        if self.inbound == 0 {
            return Err(BalancerError::Configuration(
                "inbound belt count must be positive".into(),
            ));
        }
        if self.outbound == 0 {
            return Err(BalancerError::Configuration(
                "outbound belt count must be positive".into(),
            ));
        }
        self.big_m.validate()
    }
}

impl std::fmt::Display for BalancerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} inbound, {} outbound, {} splitters (u_t={}, u_x={})",
            self.inbound, self.outbound, self.splitters, self.big_m.u_t, self.big_m.u_x
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference_layout() {
        let config = BalancerConfig::default();
        assert_eq!(config.inbound, 8);
        assert_eq!(config.outbound, 8);
        assert_eq!(config.splitters, 10);
        assert_eq!(config.big_m.u_t, 1.0);
        assert_eq!(config.big_m.u_x, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_counts_rejected() {
        assert!(matches!(
            BalancerConfig::new(0, 2, 1).validate(),
            Err(BalancerError::Configuration(_))
        ));
        assert!(matches!(
            BalancerConfig::new(2, 0, 1).validate(),
            Err(BalancerError::Configuration(_))
        ));
    }

    #[test]
    fn test_zero_splitters_allowed() {
        assert!(BalancerConfig::new(1, 1, 0).validate().is_ok());
    }

    #[test]
    fn test_big_m_must_be_provable_bounds() {
        let loose = BalancerConfig::new(2, 2, 1).with_big_m(BigM::new(4.0, 10.0));
        assert!(loose.validate().is_ok());

        let tight_t = BalancerConfig::new(2, 2, 1).with_big_m(BigM::new(0.5, 2.0));
        assert!(matches!(
            tight_t.validate(),
            Err(BalancerError::Configuration(msg)) if msg.contains("u_t")
        ));

        let tight_x = BalancerConfig::new(2, 2, 1).with_big_m(BigM::new(1.0, 1.5));
        assert!(matches!(
            tight_x.validate(),
            Err(BalancerError::Configuration(msg)) if msg.contains("u_x")
        ));

        let infinite = BalancerConfig::new(2, 2, 1).with_big_m(BigM::new(f64::INFINITY, 2.0));
        assert!(infinite.validate().is_err());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: BalancerConfig =
            serde_json::from_str(r#"{"inbound": 3, "big_m": {"u_x": 5.0}}"#).unwrap();
        assert_eq!(config.inbound, 3);
        assert_eq!(config.outbound, 8);
        assert_eq!(config.big_m.u_t, 1.0);
        assert_eq!(config.big_m.u_x, 5.0);
    }
}
