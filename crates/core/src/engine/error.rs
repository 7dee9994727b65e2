//! Error types for graph construction and evaluation.

use thiserror::Error;

/// Errors raised while building or evaluating a graph.
///
/// Evaluation errors are reported per requested variable, so one failing
/// branch does not hide the values computed by the others.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The requested variable is not produced by any active node.
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    /// A node needs values that are neither computed nor supplied.
    #[error("Node '{node}' is missing required inputs: {}", .inputs.join(", "))]
    MissingInputs { node: String, inputs: Vec<String> },

    /// A node function returned an error.
    #[error("Node '{node}' failed: {source}")]
    NodeFailed {
        node: String,
        #[source]
        source: anyhow::Error,
    },

    /// A dependency of the node failed, so the node was never run.
    #[error("Node '{node}' was skipped because '{upstream}' failed")]
    UpstreamFailed { node: String, upstream: String },

    /// Two active nodes share a name.
    #[error("Duplicate node '{0}'")]
    DuplicateNode(String),

    /// The active nodes do not form a DAG.
    #[error("Dependency cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },
}

impl EngineError {
    pub(crate) fn failed_node(node: &str, source: anyhow::Error) -> Self {
        Self::NodeFailed {
            node: node.to_string(),
            source,
        }
    }
}

/// Type alias for Result with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
