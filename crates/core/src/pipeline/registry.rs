//! Named collections of pipelines.

use crate::pipeline::error::RegistryError;
use crate::pipeline::Pipeline;
use dc_protocol::pipeline_models::PipelineSummary;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Maps unique names to pipelines, ordered by name.
#[derive(Default)]
pub struct Registry {
    pipelines: BTreeMap<String, Pipeline>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pipeline` under `name`.
    ///
    /// # Errors
    ///
    /// Fails when the name is empty, contains whitespace, or is taken.
    pub fn register(&mut self, name: impl Into<String>, mut pipeline: Pipeline) -> Result<(), RegistryError> {
        let name = name.into();
        validate_name(&name)?;
        if self.pipelines.contains_key(&name) {
            return Err(RegistryError::DuplicatePipeline(name));
        }
        pipeline.set_name(&name);
        self.pipelines.insert(name, pipeline);
        Ok(())
    }

    /// Builder-style [`Registry::register`].
    pub fn with(mut self, name: impl Into<String>, pipeline: Pipeline) -> Result<Self, RegistryError> {
        self.register(name, pipeline)?;
        Ok(self)
    }

    pub fn from_pipelines<I, S>(pipelines: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, Pipeline)>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for (name, pipeline) in pipelines {
            registry.register(name, pipeline)?;
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pipelines.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pipelines.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Pipeline> {
        self.pipelines.iter()
    }

    /// Pipelines exposed on the command line.
    pub fn public(&self) -> impl Iterator<Item = (&str, &Pipeline)> {
        self.pipelines
            .iter()
            .filter(|(_, p)| p.is_public())
            .map(|(name, p)| (name.as_str(), p))
    }

    /// Listing records for every pipeline, or only the public ones.
    ///
    /// A pipeline whose inputs cannot be introspected is still listed, with
    /// no required inputs.
    pub fn summaries(&self, public_only: bool) -> Vec<PipelineSummary> {
        self.pipelines
            .values()
            .filter(|p| !public_only || p.is_public())
            .map(|p| {
                p.summary().unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "listing pipeline without its inputs");
                    p.listing()
                })
            })
            .collect()
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.chars().any(char::is_whitespace) {
        "name contains whitespace"
    } else {
        return Ok(());
    };
    Err(RegistryError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.pipelines.keys()).finish()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = (&'a String, &'a Pipeline);
    type IntoIter = btree_map::Iter<'a, String, Pipeline>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
