//! # belt-core: Balancer Configuration and Index Spaces
//!
//! Shared building blocks for belt balancer design:
//!
//! - [`BalancerConfig`]: belt counts, splitter budget and big-M bounds
//! - [`IndexSpace`]: belt endpoints, cargo types and the legal routes between them
//! - [`TrafficParams`]: per-cargo supply and demand derived from belt counts
//! - [`BalancerError`]: the error type every balancer operation returns
//!
//! ## Quick Start
//!
//! ```rust
//! use belt_core::{BalancerConfig, IndexSpace, TrafficParams};
//!
//! let config = BalancerConfig::new(2, 2, 1);
//! let space = IndexSpace::generate(&config).unwrap();
//! let traffic = TrafficParams::build(&space).unwrap();
//!
//! assert_eq!(space.routes().len(), 4);
//! assert_eq!(traffic.v_out, 1.0);
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod traffic;

pub use config::{BalancerConfig, BigM, ROUTE_CAPACITY, SPLITTER_MAX_DEGREE};
pub use error::{BalancerError, BalancerResult};
pub use index::{is_admissible, CargoType, IndexSpace, Node, Route};
pub use traffic::{TrafficParams, CONSERVATION_TOLERANCE};
