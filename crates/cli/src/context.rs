//! Per-invocation application context.

use crate::error::CliError;
use dc_core::composer::Resolved;
use dc_core::config::LoadOptions;
use dc_core::{Composer, Registry, ResolvedConfig};
use std::sync::Arc;

/// State shared by built-in and plugin commands for one invocation.
#[derive(Debug, Clone)]
pub struct AppContext {
    name: String,
    composer: Arc<Composer>,
    options: LoadOptions,
    debug: bool,
}

impl AppContext {
    pub fn new(name: impl Into<String>, composer: Arc<Composer>, options: LoadOptions, debug: bool) -> Self {
        Self {
            name: name.into(),
            composer,
            options,
            debug,
        }
    }

    /// Application name, as shown in help and listings.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn composer(&self) -> &Arc<Composer> {
        &self.composer
    }

    /// Load options derived from the global flags.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Configuration and registry for the global flags, cached by the
    /// composer.
    pub fn resolve(&self) -> Result<Resolved, CliError> {
        Ok(self.composer.cached_for(&self.options)?)
    }

    /// Configuration for the global flags plus `overrides`.
    pub fn load_config<S: AsRef<str>>(&self, overrides: &[S]) -> Result<ResolvedConfig, CliError> {
        let options = self.options_with(overrides);
        Ok(self.composer.load_config(&options)?)
    }

    /// Registry for `config`, or the cached one for the global flags.
    pub fn find_pipelines(&self, config: Option<&ResolvedConfig>) -> Result<Arc<Registry>, CliError> {
        match config {
            Some(config) => Ok(self.composer.find_pipelines(Some(config))?),
            None => Ok(self.resolve()?.registry),
        }
    }

    /// Global-flag options with `overrides` appended.
    pub fn options_with<S: AsRef<str>>(&self, overrides: &[S]) -> LoadOptions {
        self.options
            .clone()
            .with_overrides(overrides.iter().map(|o| o.as_ref().to_string()))
    }
}
