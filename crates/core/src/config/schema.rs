//! Declared configuration schemas.
//!
//! A [`Schema`] lists the fields a configuration must (or may) contain,
//! their kinds, and defaults. Validation coerces compatible scalars and
//! collects every problem instead of stopping at the first one.

use crate::config::models::{insert_path, leaf_paths, lookup, value_kind, ValueMap};
use serde_json::{Number, Value};
use std::fmt;

/// Expected kind of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Mapping,
    Any,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Mapping => "mapping",
            Self::Any => "any",
        }
    }

    /// Coerce `value` to this kind, or `None` if it is incompatible.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Any, v) => Some(v.clone()),
            (Self::String, Value::String(_)) => Some(value.clone()),
            (Self::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (Self::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Some(value.clone()),
            (Self::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (Self::Float, Value::Number(n)) => n.as_f64().and_then(Number::from_f64).map(Value::Number),
            (Self::Float, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            (Self::Boolean, Value::Bool(_)) => Some(value.clone()),
            (Self::Boolean, Value::String(s)) => parse_bool(s).map(Value::Bool),
            (Self::List, Value::Array(_)) => Some(value.clone()),
            (Self::Mapping, Value::Object(_)) => Some(value.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Dotted path of the field.
    pub path: String,
    pub kind: FieldKind,
    /// Missing required fields are validation errors.
    pub required: bool,
    /// Value used when the field is absent.
    pub default: Option<Value>,
}

/// A structured configuration schema.
///
/// # Example
///
/// ```rust
/// use dc_core::config::{FieldKind, Schema};
///
/// let schema = Schema::new()
///     .required("numbers", FieldKind::List)
///     .with_default("analysis.min_word_length", FieldKind::Integer, 1)
///     .optional("method", FieldKind::String);
/// assert!(schema.declares("analysis.min_word_length"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<SchemaField>,
    allow_unknown: bool,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field that must be present after merging.
    pub fn required(self, path: impl Into<String>, kind: FieldKind) -> Self {
        self.field(SchemaField {
            path: path.into(),
            kind,
            required: true,
            default: None,
        })
    }

    /// Declare a field that may be absent.
    pub fn optional(self, path: impl Into<String>, kind: FieldKind) -> Self {
        self.field(SchemaField {
            path: path.into(),
            kind,
            required: false,
            default: None,
        })
    }

    /// Declare a field filled with `default` when absent.
    pub fn with_default(
        self,
        path: impl Into<String>,
        kind: FieldKind,
        default: impl Into<Value>,
    ) -> Self {
        self.field(SchemaField {
            path: path.into(),
            kind,
            required: false,
            default: Some(default.into()),
        })
    }

    /// Add a field, replacing any earlier declaration of the same path.
    pub fn field(mut self, field: SchemaField) -> Self {
        self.fields.retain(|f| f.path != field.path);
        self.fields.push(field);
        self
    }

    /// Accept keys the schema does not declare instead of reporting them.
    pub fn allow_unknown(mut self) -> Self {
        self.allow_unknown = true;
        self
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Whether `key` is a declared field, lies inside one, or is a parent of one.
    pub fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|f| covers(&f.path, key) || is_parent(key, &f.path))
    }

    /// Validate and coerce `config`, returning the completed mapping.
    ///
    /// # Errors
    ///
    /// Returns every missing, mismatched and (unless allowed) unknown field,
    /// sorted by path.
    pub fn validate(&self, config: ValueMap) -> Result<ValueMap, SchemaErrors> {
        let mut root = config;
        let mut errors = Vec::new();

        for field in &self.fields {
            match lookup(&root, &field.path) {
                Some(Value::Null) | None => {
                    if let Some(default) = &field.default {
                        insert_path(&mut root, &field.path, default.clone());
                    } else if field.required {
                        errors.push(FieldError {
                            path: field.path.clone(),
                            issue: FieldIssue::Missing,
                        });
                    }
                }
                Some(value) => match field.kind.coerce(value) {
                    Some(coerced) => insert_path(&mut root, &field.path, coerced),
                    None => errors.push(FieldError {
                        path: field.path.clone(),
                        issue: FieldIssue::TypeMismatch {
                            expected: field.kind,
                            found: value_kind(value).to_string(),
                        },
                    }),
                },
            }
        }

        if !self.allow_unknown {
            for path in leaf_paths(&root) {
                let known = self
                    .fields
                    .iter()
                    .any(|f| covers(&f.path, &path) || is_parent(&path, &f.path));
                if !known {
                    errors.push(FieldError {
                        path,
                        issue: FieldIssue::Unknown,
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(root)
        } else {
            errors.sort_by(|a, b| a.path.cmp(&b.path));
            Err(SchemaErrors(errors))
        }
    }
}

/// `field` equals `key` or `key` lies inside the `field` subtree.
fn covers(field: &str, key: &str) -> bool {
    key == field
        || key
            .strip_prefix(field)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// `key` is a strict ancestor of `field`.
fn is_parent(key: &str, field: &str) -> bool {
    field
        .strip_prefix(key)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// What is wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    Missing,
    TypeMismatch { expected: FieldKind, found: String },
    Unknown,
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub issue: FieldIssue,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            FieldIssue::Missing => write!(f, "missing required field '{}'", self.path),
            FieldIssue::TypeMismatch { expected, found } => {
                write!(f, "field '{}' expected {expected}, found {found}", self.path)
            }
            FieldIssue::Unknown => write!(f, "unknown field '{}'", self.path),
        }
    }
}

/// Every violation found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaErrors(Vec<FieldError>);

impl SchemaErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.path.as_str())
    }
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

impl std::error::Error for SchemaErrors {}
