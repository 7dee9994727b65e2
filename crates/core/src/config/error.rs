//! Error types for configuration resolution.
//!
//! This module defines all errors that can occur while locating, parsing,
//! overriding and validating a configuration.

use crate::config::schema::SchemaErrors;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be found by the active strategy.
    #[error(
        "Configuration file '{}' not found (searched: {}). Consider using an absolute path.",
        .path.display(),
        display_paths(.searched)
    )]
    NotFound { path: PathBuf, searched: Vec<PathBuf> },

    /// Both search strategies were requested for the same resolution.
    #[error("Conflicting search strategies: git-root search and recursive search cannot be combined")]
    ConflictingSearchStrategies,

    /// A search strategy was requested without a configuration file to search for.
    #[error("Search strategy '{strategy}' requires a configuration file name")]
    SearchWithoutFile { strategy: &'static str },

    /// Failed to read a configuration file from disk.
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse YAML file at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON file at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The file parsed but does not have the shape of a configuration.
    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    /// A dotlist override could not be parsed.
    #[error("Invalid override '{token}': {reason}")]
    OverrideParse { token: String, reason: String },

    /// The merged configuration does not satisfy the declared schema.
    #[error("Configuration failed schema validation: {0}")]
    SchemaValidation(SchemaErrors),
}

impl ConfigError {
    pub(crate) fn override_parse(token: &str, reason: impl Into<String>) -> Self {
        Self::OverrideParse {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
