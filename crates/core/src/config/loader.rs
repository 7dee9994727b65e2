//! Configuration loading.
//!
//! [`ConfigResolver::load`] runs the whole resolution for one invocation:
//! - Locate the source file with the active [`SearchStrategy`]
//! - Parse it by extension (`.yaml`/`.yml`, `.toml`, `.json`)
//! - Apply the dotlist overrides in order
//! - Validate against the declared [`Schema`], if any

use crate::config::dotlist::{apply_overrides, parse_dotlist};
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::{ResolvedConfig, ValueMap};
use crate::config::schema::Schema;
use crate::config::search::{locate, ConfigSource, SearchStrategy};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Per-invocation inputs to [`ConfigResolver::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub search_git_root: bool,
    pub search_recursive: bool,
    /// Dotlist tokens, applied in order after the file is loaded.
    pub overrides: Vec<String>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides.extend(overrides.into_iter().map(Into::into));
        self
    }

    pub fn search_git_root(mut self) -> Self {
        self.search_git_root = true;
        self
    }

    pub fn search_recursive(mut self) -> Self {
        self.search_recursive = true;
        self
    }
}

/// Resolves configuration relative to a working directory.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    working_dir: PathBuf,
    schema: Option<Schema>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigResolver {
    /// A resolver rooted at the process working directory.
    pub fn new() -> Self {
        let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            working_dir,
            schema: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Find the configuration file `options` points at without loading it.
    pub fn locate(&self, options: &LoadOptions) -> ConfigResult<Option<ConfigSource>> {
        let strategy =
            SearchStrategy::from_flags(options.search_git_root, options.search_recursive)?;
        locate(options.config_file.as_deref(), strategy, &self.working_dir)
    }

    /// Resolve a configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Both search flags are set, or a search flag is set without a file
    /// - The file cannot be found, read or parsed
    /// - An override token is malformed
    /// - The merged result fails schema validation
    ///
    /// Override tokens are checked before the file system is touched, so a
    /// malformed token is reported even when the file is missing.
    pub fn load(&self, options: &LoadOptions) -> ConfigResult<ResolvedConfig> {
        let strategy =
            SearchStrategy::from_flags(options.search_git_root, options.search_recursive)?;
        let overrides = parse_dotlist(&options.overrides)?;
        let source = locate(options.config_file.as_deref(), strategy, &self.working_dir)?;

        let (mut root, path) = match source {
            Some(source) => {
                tracing::debug!(path = %source.path().display(), "loading config file");
                let path = source.path().to_path_buf();
                (load_file(&path)?, Some(path))
            }
            None => {
                tracing::debug!("no config file requested, starting from an empty mapping");
                (ValueMap::new(), None)
            }
        };

        apply_overrides(&mut root, &overrides);

        if let Some(schema) = &self.schema {
            root = schema.validate(root).map_err(ConfigError::SchemaValidation)?;
        }

        Ok(ResolvedConfig::new(root, path))
    }
}

/// Read and parse one configuration file.
///
/// The format is chosen by extension; anything other than `.toml` or `.json`
/// is read as YAML. An empty file is an empty mapping.
pub fn load_file(path: &Path) -> ConfigResult<ValueMap> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => {
            let table: toml::Table =
                toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
                    path: path.to_path_buf(),
                    source,
                })?;
            serde_json::to_value(table).map_err(|e| ConfigError::invalid(path, e.to_string()))?
        }
        Some("json") => {
            if content.trim().is_empty() {
                return Ok(ValueMap::new());
            }
            serde_json::from_str(&content).map_err(|source| ConfigError::JsonParse {
                path: path.to_path_buf(),
                source,
            })?
        }
        _ => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                    path: path.to_path_buf(),
                    source,
                })?;
            if yaml.is_null() {
                return Ok(ValueMap::new());
            }
            serde_json::to_value(yaml).map_err(|e| ConfigError::invalid(path, e.to_string()))?
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::invalid(
            path,
            format!(
                "top level must be a mapping, found {}",
                crate::config::models::value_kind(&other)
            ),
        )),
    }
}
