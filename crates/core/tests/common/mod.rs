//! Shared helpers for the integration suites.
//!
//! - Fixtures: sample nodes, factories and configuration files
//! - Assertions: comparisons over resolved values

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
pub use fixtures::*;
