//! The composer: configuration plus a pipeline factory.
//!
//! A [`Composer`] owns the factory that turns a [`ResolvedConfig`] into a
//! [`Registry`], the default configuration source, and a single-entry cache of
//! the last resolution. [`Composer::resolve`] always produces a fresh
//! [`Resolved`] pair; [`Composer::find_pipelines`] with no configuration
//! serves the cached default.

pub mod error;

pub use error::{ComposerError, ComposerResult};

use crate::config::{ConfigResolver, LoadOptions, ResolvedConfig, Schema};
use crate::pipeline::Registry;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

type Factory = dyn Fn(&ResolvedConfig) -> anyhow::Result<Registry> + Send + Sync;

/// An immutable configuration and the registry built from it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub config: Arc<ResolvedConfig>,
    pub registry: Arc<Registry>,
}

/// Builds pipeline registries from configuration.
///
/// # Example
///
/// ```rust
/// use dc_core::composer::Composer;
/// use dc_core::config::LoadOptions;
/// use dc_core::pipeline::Registry;
///
/// let composer = Composer::new(|_config| Ok(Registry::new()));
/// let resolved = composer.resolve(&LoadOptions::new()).unwrap();
/// assert!(resolved.registry.is_empty());
/// ```
pub struct Composer {
    factory: Box<Factory>,
    factory_name: String,
    config_file: Option<PathBuf>,
    resolver: ConfigResolver,
    cache: RwLock<Option<(LoadOptions, Resolved)>>,
}

impl Composer {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&ResolvedConfig) -> anyhow::Result<Registry> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            factory_name: std::any::type_name::<F>().to_string(),
            config_file: None,
            resolver: ConfigResolver::new(),
            cache: RwLock::new(None),
        }
    }

    /// Name used for the factory in error messages.
    pub fn with_factory_name(mut self, name: impl Into<String>) -> Self {
        self.factory_name = name.into();
        self
    }

    /// Default configuration file, used when a load does not name one.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.resolver = self.resolver.with_schema(schema);
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resolver = self.resolver.with_working_dir(dir);
        self
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    pub fn factory_name(&self) -> &str {
        &self.factory_name
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Load options pointing at the default configuration file.
    pub fn default_options(&self) -> LoadOptions {
        LoadOptions {
            config_file: self.config_file.clone(),
            ..LoadOptions::default()
        }
    }

    /// Resolve configuration, falling back to the default file when
    /// `options` names none.
    pub fn load_config(&self, options: &LoadOptions) -> ComposerResult<ResolvedConfig> {
        if options.config_file.is_none() && self.config_file.is_some() {
            let options = LoadOptions {
                config_file: self.config_file.clone(),
                ..options.clone()
            };
            return Ok(self.resolver.load(&options)?);
        }
        Ok(self.resolver.load(options)?)
    }

    /// Invoke the factory for `config`.
    pub fn build_registry(&self, config: &ResolvedConfig) -> ComposerResult<Registry> {
        tracing::debug!(factory = %self.factory_name, "invoking pipeline factory");
        let registry = (self.factory)(config).map_err(|source| ComposerError::Registration {
            factory: self.factory_name.clone(),
            source,
        })?;
        tracing::debug!(pipelines = registry.len(), "pipeline factory finished");
        Ok(registry)
    }

    /// Resolve configuration and build a fresh registry. Never cached.
    pub fn resolve(&self, options: &LoadOptions) -> ComposerResult<Resolved> {
        let config = self.load_config(options)?;
        let registry = self.build_registry(&config)?;
        Ok(Resolved {
            config: Arc::new(config),
            registry: Arc::new(registry),
        })
    }

    /// Registry for `config`, or the cached default registry when `None`.
    ///
    /// An explicit configuration always re-invokes the factory and leaves
    /// the cache untouched.
    pub fn find_pipelines(&self, config: Option<&ResolvedConfig>) -> ComposerResult<Arc<Registry>> {
        match config {
            Some(config) => Ok(Arc::new(self.build_registry(config)?)),
            None => Ok(self.cached()?.registry),
        }
    }

    /// The cached default resolution, computing it on first use.
    ///
    /// Nothing is cached when resolution fails.
    pub fn cached(&self) -> ComposerResult<Resolved> {
        self.cached_for(&self.default_options())
    }

    /// The cached resolution for `options`.
    ///
    /// The cache holds a single entry; resolving different options
    /// replaces it.
    pub fn cached_for(&self, options: &LoadOptions) -> ComposerResult<Resolved> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some((cached_options, resolved)) = cache.as_ref() {
                if cached_options == options {
                    return Ok(resolved.clone());
                }
            }
        }
        let resolved = self.resolve(options)?;
        self.store(options, &resolved);
        Ok(resolved)
    }

    /// Re-resolve the default configuration and replace the cache.
    pub fn reload(&self) -> ComposerResult<Resolved> {
        let options = self.default_options();
        let resolved = self.resolve(&options)?;
        self.store(&options, &resolved);
        Ok(resolved)
    }

    fn store(&self, options: &LoadOptions, resolved: &Resolved) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *cache = Some((options.clone(), resolved.clone()));
    }

    pub fn clear_cache(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *cache = None;
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("factory_name", &self.factory_name)
            .field("config_file", &self.config_file)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
