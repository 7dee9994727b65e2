//! Error types for pipelines and registries.

use crate::engine::EngineError;
use thiserror::Error;

/// Errors raised by a single pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A pipeline must request at least one variable.
    #[error("Pipeline requests no final variables")]
    EmptyFinalVars,

    /// The same variable was requested twice.
    #[error("Final variable '{0}' is requested more than once")]
    DuplicateFinalVar(String),

    /// The engine could not be built for this pipeline.
    #[error("Failed to build pipeline engine: {0}")]
    Build(#[source] EngineError),

    /// Computing a final variable failed.
    #[error("Pipeline '{pipeline}' failed to compute '{variable}': {source}")]
    Execution {
        pipeline: String,
        variable: String,
        #[source]
        source: EngineError,
    },

    /// The engine could not describe the pipeline's graph.
    #[error("Failed to inspect pipeline '{pipeline}': {source}")]
    Introspection {
        pipeline: String,
        #[source]
        source: EngineError,
    },

    /// Inputs needed for execution were not supplied.
    #[error("Pipeline '{pipeline}' is missing required inputs: {}", .inputs.join(", "))]
    MissingInputs {
        pipeline: String,
        inputs: Vec<String>,
    },
}

/// Errors raised while assembling a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate pipeline name '{0}'")]
    DuplicatePipeline(String),

    #[error("Invalid pipeline name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

/// Type alias for Result with PipelineError.
pub type PipelineResult<T> = Result<T, PipelineError>;
