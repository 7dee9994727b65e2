//! The resolved configuration object.
//!
//! [`ResolvedConfig`] is the immutable result of merging a configuration file
//! with its overrides. Values are addressable by dotted key
//! (`analysis.min_word_length`).

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A nested mapping of configuration or runtime values.
pub type ValueMap = serde_json::Map<String, Value>;

/// Immutable, fully merged configuration.
///
/// # Example
///
/// ```rust
/// use dc_core::config::{ConfigResolver, LoadOptions};
///
/// let options = LoadOptions::new().with_overrides(["processing.use_cache=false"]);
/// let config = ConfigResolver::new().load(&options).unwrap();
/// assert_eq!(config.get("processing.use_cache"), Some(&serde_json::json!(false)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    root: ValueMap,
    source: Option<PathBuf>,
}

impl ResolvedConfig {
    /// An empty configuration with no source file.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap an already merged mapping.
    pub fn from_map(root: ValueMap) -> Self {
        Self { root, source: None }
    }

    pub(crate) fn new(root: ValueMap, source: Option<PathBuf>) -> Self {
        Self { root, source }
    }

    /// The file this configuration was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn as_map(&self) -> &ValueMap {
        &self.root
    }

    pub fn into_map(self) -> ValueMap {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Look up a value by dotted key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        lookup(&self.root, key)
    }

    /// Whether a dotted key exists, either as a leaf or as a nested mapping.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Dotted paths of every leaf value (non-mapping or empty mapping).
    pub fn leaf_keys(&self) -> BTreeSet<String> {
        leaf_paths(&self.root)
    }

    /// Deserialize the whole configuration into a typed structure.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.root.clone()))
    }

    /// Render the configuration as YAML, for display.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.root)
    }
}

impl From<ValueMap> for ResolvedConfig {
    fn from(root: ValueMap) -> Self {
        Self::from_map(root)
    }
}

pub(crate) fn lookup<'a>(map: &'a ValueMap, key: &str) -> Option<&'a Value> {
    let mut segments = key.split('.');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set `value` at a dotted path, creating (or replacing non-mapping)
/// intermediate nodes as needed.
pub(crate) fn insert_path(map: &mut ValueMap, key: &str, value: Value) {
    let segments: Vec<&str> = key.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = map;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(ValueMap::new()));
        if !entry.is_object() {
            *entry = Value::Object(ValueMap::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(last.to_string(), value);
}

pub(crate) fn leaf_paths(map: &ValueMap) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    collect_leaves(map, None, &mut paths);
    paths
}

fn collect_leaves(map: &ValueMap, prefix: Option<&str>, paths: &mut BTreeSet<String>) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(child) if !child.is_empty() => collect_leaves(child, Some(&path), paths),
            _ => {
                paths.insert(path);
            }
        }
    }
}

/// Short name of a value's type, used in error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
