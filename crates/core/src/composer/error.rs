//! Error types for the composer.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised while resolving configuration or building the registry.
#[derive(Error, Debug)]
pub enum ComposerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The factory returned an error.
    #[error("Pipeline factory '{factory}' failed: {source}")]
    Registration {
        factory: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Type alias for Result with ComposerError.
pub type ComposerResult<T> = Result<T, ComposerError>;
