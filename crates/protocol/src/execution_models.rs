//! Execution outcome models.
//!
//! These structures describe the result of a single pipeline execution in a
//! serializable form, independent of the engine that produced it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overall outcome of executing a pipeline's final variables.
///
/// - Complete: every requested variable was computed
/// - Partial: some variables were computed, others failed
/// - Failed: no requested variable could be computed
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Complete,
    Partial,
    Failed,
}

impl ExecutionStatus {
    /// Derive the status from the number of computed and failed variables.
    pub fn from_counts(computed: usize, failed: usize) -> Self {
        match (computed, failed) {
            (_, 0) => Self::Complete,
            (0, _) => Self::Failed,
            _ => Self::Partial,
        }
    }
}

/// Serializable summary of one execution, as printed by `run --json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ExecutionSummary {
    /// Name of the pipeline that was executed.
    pub pipeline: String,

    /// Aggregate outcome.
    pub status: ExecutionStatus,

    /// Computed values keyed by variable name.
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,

    /// Error messages keyed by the variable that failed.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}
