//! # dc-protocol
//!
//! Shared data models for dag-composer.
//!
//! This crate defines the serializable structures exchanged between the
//! composer core and its presentation layers:
//! - Pipeline listings rendered by `list` (plain or `--json`)
//! - Execution summaries rendered by `run --json`
//!
//! ## Modules
//!
//! - [`pipeline_models`]: Pipeline descriptions as seen by a registry listing
//! - [`execution_models`]: Execution status and per-variable outcomes
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde and serde_json
//! - Independent compilation: No dependencies on other dag-composer crates

pub mod execution_models;
pub mod pipeline_models;

// Re-export all public types for convenience
pub use execution_models::*;
pub use pipeline_models::*;
