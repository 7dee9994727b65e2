//! Execution engine abstraction.
//!
//! An [`Engine`] owns a set of transformation nodes plus the configuration
//! they were built with. Given the names of the variables to compute and the
//! values bound to the graph's leaves, it evaluates the graph in dependency
//! order.
//!
//! The built-in implementation is [`Graph`], assembled with a
//! [`GraphBuilder`].

pub mod error;
pub mod graph;

pub use error::{EngineError, EngineResult};
pub use graph::{Graph, GraphBuilder, Module, Node, NodeInputs};

use crate::config::ValueMap;
use dc_protocol::execution_models::{ExecutionStatus, ExecutionSummary};
use std::collections::{BTreeMap, BTreeSet};

/// A configured DAG engine.
pub trait Engine: Send + Sync {
    /// Configuration baked in when the engine was built.
    fn config(&self) -> &ValueMap;

    /// Unbound leaf names needed to compute `final_vars`.
    ///
    /// Names in `overrides` are taken as given, so their upstream leaves are
    /// not required.
    fn required_inputs(&self, final_vars: &[String], overrides: &ValueMap) -> EngineResult<BTreeSet<String>>;

    /// Compute `final_vars` with `inputs` bound to the graph's leaves.
    ///
    /// A node named in `overrides` is not run; its supplied value is used
    /// instead. Failures are reported per variable in the returned report.
    /// A variable requested twice is reported once.
    fn execute(&self, final_vars: &[String], inputs: &ValueMap, overrides: &ValueMap) -> ExecutionReport;

    /// Render the subgraph needed for `final_vars` in DOT format.
    fn visualize(&self, final_vars: &[String]) -> EngineResult<String>;
}

/// Outcome of one engine execution.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Computed values for the requested variables that succeeded.
    pub values: ValueMap,
    /// Errors for the requested variables that failed.
    pub errors: BTreeMap<String, EngineError>,
}

impl ExecutionReport {
    pub fn status(&self) -> ExecutionStatus {
        ExecutionStatus::from_counts(self.values.len(), self.errors.len())
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Serializable form of this report.
    pub fn to_summary(&self, pipeline: &str) -> ExecutionSummary {
        ExecutionSummary {
            pipeline: pipeline.to_string(),
            status: self.status(),
            values: self
                .values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            errors: self
                .errors
                .iter()
                .map(|(k, e)| (k.clone(), e.to_string()))
                .collect(),
        }
    }
}
