//! Pipelines and pipeline registries.
//!
//! A [`Pipeline`] pairs one engine with the variables it should compute and
//! some descriptive metadata. Pipelines are immutable once built; a new
//! configuration produces a new [`Registry`] of new pipelines.

pub mod error;
pub mod registry;

pub use error::{PipelineError, PipelineResult, RegistryError};
pub use registry::Registry;

use crate::config::ValueMap;
use crate::engine::{Engine, ExecutionReport, GraphBuilder};
use dc_protocol::execution_models::ExecutionSummary;
use dc_protocol::pipeline_models::PipelineSummary;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

const UNNAMED: &str = "<unnamed>";

/// A reusable, configured execution unit.
///
/// # Example
///
/// ```rust
/// use dc_core::engine::{GraphBuilder, Node};
/// use dc_core::pipeline::Pipeline;
/// use serde_json::json;
///
/// let builder = GraphBuilder::new().with_node(Node::new("count_words", &["raw_text"], |inputs| {
///     Ok(json!(inputs.str("raw_text")?.split_whitespace().count()))
/// }));
/// let pipeline = Pipeline::from_builder(&builder, ["count_words"])
///     .unwrap()
///     .with_description("Counts words");
///
/// let mut inputs = serde_json::Map::new();
/// inputs.insert("raw_text".to_string(), json!("hello world"));
/// let values = pipeline.execute(&inputs).unwrap();
/// assert_eq!(values["count_words"], json!(2));
/// ```
pub struct Pipeline {
    name: Option<String>,
    engine: Box<dyn Engine>,
    final_vars: Vec<String>,
    description: Option<String>,
    tags: BTreeSet<String>,
    public: bool,
}

impl Pipeline {
    /// Wrap an engine, requesting `final_vars` in order.
    ///
    /// # Errors
    ///
    /// `final_vars` must be non-empty and free of duplicates.
    pub fn new<E, I, S>(engine: E, final_vars: I) -> PipelineResult<Self>
    where
        E: Engine + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let final_vars: Vec<String> = final_vars.into_iter().map(Into::into).collect();
        if final_vars.is_empty() {
            return Err(PipelineError::EmptyFinalVars);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = final_vars.iter().find(|v| !seen.insert(v.as_str())) {
            return Err(PipelineError::DuplicateFinalVar(dup.clone()));
        }

        Ok(Self {
            name: None,
            engine: Box::new(engine),
            final_vars,
            description: None,
            tags: BTreeSet::new(),
            public: true,
        })
    }

    /// Build a graph from `builder` and wrap it.
    pub fn from_builder<I, S>(builder: &GraphBuilder, final_vars: I) -> PipelineResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let graph = builder.build().map_err(PipelineError::Build)?;
        Self::new(graph, final_vars)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Hide the pipeline from the command line.
    pub fn private(self) -> Self {
        self.with_public(false)
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    /// Registry name, once registered.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn final_vars(&self) -> &[String] {
        &self.final_vars
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Configuration baked into the engine.
    pub fn config(&self) -> &ValueMap {
        self.engine.config()
    }

    fn display_name(&self) -> String {
        self.name.as_deref().unwrap_or(UNNAMED).to_string()
    }

    /// Inputs needed at execution time, excluding names bound by the baked
    /// configuration.
    pub fn required_inputs(&self) -> PipelineResult<BTreeSet<String>> {
        self.required_inputs_with(&ValueMap::new())
    }

    fn required_inputs_with(&self, overrides: &ValueMap) -> PipelineResult<BTreeSet<String>> {
        let leaves = self
            .engine
            .required_inputs(&self.final_vars, overrides)
            .map_err(|source| PipelineError::Introspection {
                pipeline: self.display_name(),
                source,
            })?;
        let config = self.engine.config();
        Ok(leaves.into_iter().filter(|k| !config.contains_key(k)).collect())
    }

    /// Check that `inputs` bind every required input, without executing.
    ///
    /// Nodes named in `overrides` are not run, so the inputs only they need
    /// are not required.
    pub fn validate_execution(&self, inputs: &ValueMap, overrides: &ValueMap) -> PipelineResult<()> {
        let missing: Vec<String> = self
            .required_inputs_with(overrides)?
            .into_iter()
            .filter(|name| !inputs.contains_key(name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::MissingInputs {
                pipeline: self.display_name(),
                inputs: missing,
            })
        }
    }

    /// Execute and return every outcome, successful or not.
    ///
    /// Nodes named in `overrides` take the supplied value instead of running.
    pub fn execute_partial(&self, inputs: &ValueMap, overrides: &ValueMap) -> ExecutionReport {
        let mut bound = self.engine.config().clone();
        bound.extend(inputs.iter().map(|(k, v)| (k.clone(), v.clone())));

        tracing::info!(
            pipeline = %self.display_name(),
            vars = ?self.final_vars,
            overrides = overrides.len(),
            "executing pipeline"
        );
        let report = self.engine.execute(&self.final_vars, &bound, overrides);
        tracing::info!(
            pipeline = %self.display_name(),
            status = ?report.status(),
            "pipeline finished"
        );
        report
    }

    /// Execute and return exactly the requested variables.
    ///
    /// Runtime `inputs` take precedence over the baked configuration for
    /// this call only.
    ///
    /// # Errors
    ///
    /// The first requested variable (in request order) that failed is
    /// reported as [`PipelineError::Execution`].
    pub fn execute(&self, inputs: &ValueMap) -> PipelineResult<ValueMap> {
        self.execute_with_overrides(inputs, &ValueMap::new())
    }

    /// [`Pipeline::execute`] with some nodes replaced by fixed values.
    pub fn execute_with_overrides(&self, inputs: &ValueMap, overrides: &ValueMap) -> PipelineResult<ValueMap> {
        let mut report = self.execute_partial(inputs, overrides);
        for var in &self.final_vars {
            if let Some(source) = report.errors.remove(var) {
                return Err(PipelineError::Execution {
                    pipeline: self.display_name(),
                    variable: var.clone(),
                    source,
                });
            }
        }
        Ok(report.values)
    }

    /// Execute and return a serializable record of the outcome.
    ///
    /// Never fails: per-variable errors are carried in the summary.
    pub fn export_execution(&self, inputs: &ValueMap, overrides: &ValueMap) -> ExecutionSummary {
        self.execute_partial(inputs, overrides)
            .to_summary(&self.display_name())
    }

    /// DOT rendering of the execution path.
    pub fn visualize_execution(&self) -> PipelineResult<String> {
        self.engine
            .visualize(&self.final_vars)
            .map_err(|source| PipelineError::Introspection {
                pipeline: self.display_name(),
                source,
            })
    }

    /// Listing record built from metadata alone.
    ///
    /// `required_inputs` is left empty, so this never touches the engine.
    pub fn listing(&self) -> PipelineSummary {
        PipelineSummary {
            name: self.display_name(),
            description: self.description.clone(),
            final_vars: self.final_vars.clone(),
            tags: self.tags.iter().cloned().collect(),
            public: self.public,
            required_inputs: Vec::new(),
        }
    }

    /// Listing record for this pipeline, including its required inputs.
    pub fn summary(&self) -> PipelineResult<PipelineSummary> {
        let required_inputs = self.required_inputs()?.into_iter().collect();
        Ok(PipelineSummary {
            required_inputs,
            ..self.listing()
        })
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("final_vars", &self.final_vars)
            .field("description", &self.description)
            .field("tags", &self.tags)
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, Node};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn map(value: Value) -> ValueMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected mapping, got {other}"),
        }
    }

    fn abcd() -> GraphBuilder {
        GraphBuilder::new()
            .with_node(Node::new("A", &[], |_| Ok(json!(1))))
            .with_node(Node::new("B", &[], |_| Ok(json!(2))))
            .with_node(Node::new("C", &[], |_| Ok(json!(3))))
            .with_node(Node::new("D", &["A", "B", "C", "factor"], |inputs| {
                let sum = inputs.i64("A")? + inputs.i64("B")? + inputs.i64("C")?;
                Ok(json!(sum * inputs.i64("factor")?))
            }))
    }

    #[test]
    fn test_final_vars_validated() {
        assert!(matches!(
            Pipeline::from_builder(&abcd(), Vec::<String>::new()),
            Err(PipelineError::EmptyFinalVars)
        ));
        assert!(matches!(
            Pipeline::from_builder(&abcd(), ["D", "A", "D"]),
            Err(PipelineError::DuplicateFinalVar(name)) if name == "D"
        ));
    }

    #[test]
    fn test_validate_execution() {
        let pipeline = Pipeline::from_builder(&abcd(), ["D"]).expect("pipeline should build");
        assert!(pipeline
            .validate_execution(&map(json!({"factor": 2})), &ValueMap::new())
            .is_ok());

        match pipeline.validate_execution(&ValueMap::new(), &ValueMap::new()) {
            Err(PipelineError::MissingInputs { inputs, .. }) => assert_eq!(inputs, vec!["factor"]),
            other => panic!("Expected MissingInputs, got {other:?}"),
        }
    }

    #[test]
    fn test_inputs_override_baked_config() {
        let builder = abcd().with_config(map(json!({"factor": 10})));
        let pipeline = Pipeline::from_builder(&builder, ["D"]).expect("pipeline should build");

        assert!(pipeline.required_inputs().expect("known vars").is_empty());
        let values = pipeline.execute(&ValueMap::new()).expect("execution should succeed");
        assert_eq!(values["D"], json!(60));

        let values = pipeline
            .execute(&map(json!({"factor": 2})))
            .expect("execution should succeed");
        assert_eq!(values["D"], json!(12));
        assert_eq!(pipeline.config()["factor"], json!(10), "Baked config is unchanged");
    }

    #[test]
    fn test_execute_returns_exactly_final_vars() {
        let pipeline = Pipeline::from_builder(&abcd(), ["A", "D"]).expect("pipeline should build");
        let values = pipeline
            .execute(&map(json!({"factor": 1})))
            .expect("execution should succeed");
        assert_eq!(Value::Object(values), json!({"A": 1, "D": 6}));
    }

    #[test]
    fn test_execution_error_names_variable() {
        let mut registry = Registry::new();
        registry
            .register(
                "abcd",
                Pipeline::from_builder(&abcd(), ["A", "D"]).expect("pipeline should build"),
            )
            .expect("name is unique");
        let pipeline = registry.get("abcd").expect("pipeline registered");

        match pipeline.execute(&ValueMap::new()) {
            Err(PipelineError::Execution {
                pipeline,
                variable,
                source: EngineError::MissingInputs { .. },
            }) => {
                assert_eq!(pipeline, "abcd");
                assert_eq!(variable, "D");
            }
            other => panic!("Expected Execution error, got {other:?}"),
        }

        let report = pipeline.execute_partial(&ValueMap::new(), &ValueMap::new());
        assert_eq!(report.values.get("A"), Some(&json!(1)));
        assert_eq!(
            report.status(),
            dc_protocol::execution_models::ExecutionStatus::Partial
        );
    }

    #[test]
    fn test_overrides_replace_nodes() {
        let pipeline = Pipeline::from_builder(&abcd(), ["D"]).expect("pipeline should build");
        let overrides = map(json!({"D": 99}));

        assert!(pipeline.validate_execution(&ValueMap::new(), &overrides).is_ok());
        let values = pipeline
            .execute_with_overrides(&ValueMap::new(), &overrides)
            .expect("execution should succeed");
        assert_eq!(values["D"], json!(99));

        let values = pipeline
            .execute_with_overrides(&map(json!({"factor": 2})), &map(json!({"A": 10})))
            .expect("execution should succeed");
        assert_eq!(values["D"], json!(30));
    }

    #[test]
    fn test_export_execution() {
        let mut registry = Registry::new();
        registry
            .register(
                "abcd",
                Pipeline::from_builder(&abcd(), ["A", "D"]).expect("pipeline should build"),
            )
            .expect("name is unique");
        let pipeline = registry.get("abcd").expect("pipeline registered");

        let summary = pipeline.export_execution(&ValueMap::new(), &ValueMap::new());
        assert_eq!(summary.pipeline, "abcd");
        assert_eq!(summary.status, dc_protocol::execution_models::ExecutionStatus::Partial);
        assert_eq!(summary.values.get("A"), Some(&json!(1)));
        assert!(summary.errors.contains_key("D"));

        let summary = pipeline.export_execution(&ValueMap::new(), &map(json!({"D": 0})));
        assert_eq!(summary.status, dc_protocol::execution_models::ExecutionStatus::Complete);
        assert_eq!(summary.values.get("D"), Some(&json!(0)));
    }

    #[test]
    fn test_listing_skips_introspection() {
        let pipeline = Pipeline::from_builder(&abcd(), ["missing"])
            .expect("pipeline should build")
            .with_description("Broken");
        assert!(pipeline.summary().is_err());

        let listing = pipeline.listing();
        assert_eq!(listing.description.as_deref(), Some("Broken"));
        assert_eq!(listing.final_vars, vec!["missing"]);
        assert!(listing.required_inputs.is_empty());
    }

    #[test]
    fn test_summary_and_metadata() {
        let pipeline = Pipeline::from_builder(&abcd(), ["D"])
            .expect("pipeline should build")
            .with_description("Weighted sum")
            .with_tags(["math", "demo"])
            .with_tag("math")
            .private();

        let summary = pipeline.summary().expect("summary should build");
        assert_eq!(summary.name, "<unnamed>");
        assert_eq!(summary.tags, vec!["demo", "math"]);
        assert!(!summary.public);
        assert_eq!(summary.required_inputs, vec!["factor"]);
        assert!(pipeline
            .visualize_execution()
            .expect("visualize should succeed")
            .contains("\"factor\" -> \"D\";"));
    }
}
