pub mod completions;
pub mod config;
pub mod model;
pub mod solve;
