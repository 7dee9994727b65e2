//! Splitting `run` parameters into runtime inputs and config overrides.
//!
//! Each `key=value` token is classified against the pipeline's declared
//! inputs and the resolved configuration's key namespace:
//! - a declared input only: passed to the execution
//! - a configuration key only: applied as an override
//! - both: rejected, unless prefixed with `input:` or `config:`
//! - neither: rejected, unless prefixed with `config:`

use crate::error::CliError;
use dc_core::config::dotlist::{parse_value, split_assignment};
use dc_core::config::{ConfigError, Schema};
use dc_core::{ResolvedConfig, Value, ValueMap};
use std::collections::BTreeSet;

const INPUT_PREFIX: &str = "input:";
const CONFIG_PREFIX: &str = "config:";

/// Where a parameter was explicitly directed, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Any,
    Input,
    Config,
}

/// One parsed `key=value` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    pub raw_value: String,
    pub scope: Scope,
}

impl Assignment {
    /// Parse a token, honouring the `input:` and `config:` prefixes.
    pub fn parse(token: &str) -> Result<Self, ConfigError> {
        let (scope, rest) = if let Some(rest) = token.strip_prefix(INPUT_PREFIX) {
            (Scope::Input, rest)
        } else if let Some(rest) = token.strip_prefix(CONFIG_PREFIX) {
            (Scope::Config, rest)
        } else {
            (Scope::Any, token)
        };

        let (key, raw_value) = split_assignment(rest).map_err(|err| match err {
            ConfigError::OverrideParse { reason, .. } => ConfigError::OverrideParse {
                token: token.to_string(),
                reason,
            },
            other => other,
        })?;

        Ok(Self {
            key: key.to_string(),
            raw_value: raw_value.to_string(),
            scope,
        })
    }

    /// The override token for this assignment, without any prefix.
    pub fn override_token(&self) -> String {
        format!("{}={}", self.key, self.raw_value)
    }
}

/// Parse every token, failing on the first malformed one.
pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Assignment>, ConfigError> {
    tokens.iter().map(|t| Assignment::parse(t.as_ref())).collect()
}

/// Parameters sorted into their two destinations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    /// Runtime inputs, in the order given.
    pub inputs: ValueMap,
    /// Override tokens for a fresh configuration resolution.
    pub config_overrides: Vec<String>,
}

impl Reconciled {
    pub fn needs_reresolution(&self) -> bool {
        !self.config_overrides.is_empty()
    }
}

/// Classify `assignments` for the pipeline named `pipeline`.
///
/// A key belongs to the configuration when it exists in `config` (as a leaf
/// or nested mapping) or is declared by `schema`.
pub fn reconcile(
    pipeline: &str,
    assignments: &[Assignment],
    required_inputs: &BTreeSet<String>,
    config: &ResolvedConfig,
    schema: Option<&Schema>,
) -> Result<Reconciled, CliError> {
    let mut reconciled = Reconciled::default();

    for assignment in assignments {
        let key = assignment.key.as_str();
        let is_input = required_inputs.contains(key);
        let is_config = config.contains_key(key) || schema.is_some_and(|s| s.declares(key));

        let to_input = match assignment.scope {
            Scope::Input if is_input => true,
            Scope::Config => false,
            Scope::Any if is_input && is_config => {
                return Err(CliError::AmbiguousParameter {
                    key: key.to_string(),
                    pipeline: pipeline.to_string(),
                });
            }
            Scope::Any if is_input => true,
            Scope::Any if is_config => false,
            Scope::Input | Scope::Any => {
                return Err(CliError::UnknownParameter {
                    key: key.to_string(),
                    pipeline: pipeline.to_string(),
                    inputs: required_inputs.iter().cloned().collect(),
                    config_keys: config.leaf_keys().into_iter().collect(),
                });
            }
        };

        if to_input {
            tracing::debug!(key, "parameter bound as runtime input");
            reconciled
                .inputs
                .insert(key.to_string(), parse_value(&assignment.raw_value));
        } else {
            tracing::debug!(key, "parameter applied as config override");
            reconciled.config_overrides.push(assignment.override_token());
        }
    }
    Ok(reconciled)
}

/// Runtime inputs for execution: top-level config values for required
/// inputs, with explicit inputs on top.
pub fn runtime_inputs(
    required_inputs: &BTreeSet<String>,
    config: &ResolvedConfig,
    explicit: &ValueMap,
) -> ValueMap {
    let mut inputs: ValueMap = required_inputs
        .iter()
        .filter_map(|name| {
            config
                .as_map()
                .get(name)
                .map(|value| (name.clone(), value.clone()))
        })
        .collect();
    for (key, value) in explicit {
        inputs.insert(key.clone(), value.clone());
    }
    inputs
}

/// Render a value for `name = value` output: strings bare, everything else
/// as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config() -> ResolvedConfig {
        let Value::Object(map) = json!({
            "analysis": {"min_word_length": 2},
            "processing": {"use_cache": true},
            "numbers": [1, 2]
        }) else {
            unreachable!()
        };
        ResolvedConfig::from_map(map)
    }

    fn inputs(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse_prefixes() {
        let parsed = parse_tokens(&["raw_text=hi", "input:numbers=[3]", "config:new.key=1"])
            .expect("tokens should parse");
        assert_eq!(parsed[0].scope, Scope::Any);
        assert_eq!(parsed[1].scope, Scope::Input);
        assert_eq!(parsed[1].key, "numbers");
        assert_eq!(parsed[2].scope, Scope::Config);
        assert_eq!(parsed[2].override_token(), "new.key=1");
    }

    #[test]
    fn test_parse_error_names_full_token() {
        match Assignment::parse("config:=1") {
            Err(ConfigError::OverrideParse { token, .. }) => assert_eq!(token, "config:=1"),
            other => panic!("Expected OverrideParse, got {other:?}"),
        }
    }

    #[test]
    fn test_reconcile_classifies_tokens() {
        let assignments = parse_tokens(&["raw_text=hello world", "analysis.min_word_length=5"])
            .expect("tokens should parse");
        let reconciled = reconcile(
            "word_counter",
            &assignments,
            &inputs(&["raw_text"]),
            &config(),
            None,
        )
        .expect("tokens should reconcile");

        assert_eq!(reconciled.inputs.get("raw_text"), Some(&json!("hello world")));
        assert_eq!(reconciled.config_overrides, vec!["analysis.min_word_length=5"]);
        assert!(reconciled.needs_reresolution());
    }

    #[test]
    fn test_unknown_parameter_lists_both_sets() {
        let assignments = parse_tokens(&["bogus=1"]).expect("tokens should parse");
        match reconcile("word_counter", &assignments, &inputs(&["raw_text"]), &config(), None) {
            Err(CliError::UnknownParameter {
                key,
                inputs,
                config_keys,
                ..
            }) => {
                assert_eq!(key, "bogus");
                assert_eq!(inputs, vec!["raw_text"]);
                assert_eq!(
                    config_keys,
                    vec!["analysis.min_word_length", "numbers", "processing.use_cache"]
                );
            }
            other => panic!("Expected UnknownParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_parameter_needs_prefix() {
        let required = inputs(&["numbers"]);
        let ambiguous = parse_tokens(&["numbers=[3]"]).expect("tokens should parse");
        assert!(matches!(
            reconcile("p", &ambiguous, &required, &config(), None),
            Err(CliError::AmbiguousParameter { .. })
        ));

        let explicit = parse_tokens(&["input:numbers=[3]"]).expect("tokens should parse");
        let reconciled =
            reconcile("p", &explicit, &required, &config(), None).expect("prefix resolves");
        assert_eq!(reconciled.inputs.get("numbers"), Some(&json!([3])));

        let explicit = parse_tokens(&["config:numbers=[3]"]).expect("tokens should parse");
        let reconciled =
            reconcile("p", &explicit, &required, &config(), None).expect("prefix resolves");
        assert_eq!(reconciled.config_overrides, vec!["numbers=[3]"]);
    }

    #[test]
    fn test_schema_declared_keys_are_config() {
        let schema = Schema::new().optional("method", dc_core::config::FieldKind::String);
        let assignments = parse_tokens(&["method=add"]).expect("tokens should parse");
        let reconciled = reconcile("p", &assignments, &inputs(&[]), &config(), Some(&schema))
            .expect("schema key is config");
        assert_eq!(reconciled.config_overrides, vec!["method=add"]);
    }

    #[test]
    fn test_runtime_inputs_layering() {
        let mut explicit = ValueMap::new();
        explicit.insert("raw_text".to_string(), json!("hi"));
        let merged = runtime_inputs(&inputs(&["numbers", "raw_text"]), &config(), &explicit);
        assert_eq!(Value::Object(merged), json!({"numbers": [1, 2], "raw_text": "hi"}));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("text")), "text");
        assert_eq!(display_value(&json!(2)), "2");
        assert_eq!(display_value(&json!(["A", "B"])), r#"["A","B"]"#);
    }
}
