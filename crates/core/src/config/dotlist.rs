//! Dotlist overrides (`dotted.key=value`).
//!
//! Values are coerced with YAML scalar rules, so `true` becomes a boolean,
//! `2` an integer, `[1, 2]` a list and `{a: 1}` a mapping. Anything that does
//! not parse as YAML is kept as a plain string.

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::{insert_path, lookup, ValueMap};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A single parsed `key=value` override.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    key: String,
    value: Value,
    raw: String,
}

impl Override {
    /// Parse a `dotted.key=value` token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OverrideParse`] naming the token when it has no
    /// `=`, an empty key, or an invalid key segment.
    pub fn parse(token: &str) -> ConfigResult<Self> {
        let (key, raw_value) = split_assignment(token)?;
        Ok(Self {
            key: key.to_string(),
            value: parse_value(raw_value),
            raw: token.to_string(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The token exactly as it was given.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Apply this override to a mapping.
    ///
    /// Mapping values are deep-merged into an existing mapping at the same
    /// path; every other value replaces what was there.
    pub fn apply(&self, target: &mut ValueMap) {
        match (lookup(target, &self.key), &self.value) {
            (Some(Value::Object(existing)), Value::Object(_)) => {
                let mut merged = Value::Object(existing.clone());
                merge_value(&mut merged, self.value.clone());
                insert_path(target, &self.key, merged);
            }
            _ => insert_path(target, &self.key, self.value.clone()),
        }
    }
}

impl FromStr for Override {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse every token, failing on the first malformed one.
pub fn parse_dotlist<I, S>(tokens: I) -> ConfigResult<Vec<Override>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|token| Override::parse(token.as_ref()))
        .collect()
}

/// Apply overrides in order; later overrides for the same key win.
pub fn apply_overrides(target: &mut ValueMap, overrides: &[Override]) {
    for item in overrides {
        tracing::debug!(key = %item.key(), "applying override");
        item.apply(target);
    }
}

/// Split `key=value` at the first `=` and validate the key.
pub fn split_assignment(token: &str) -> ConfigResult<(&str, &str)> {
    let Some((key, value)) = token.split_once('=') else {
        return Err(ConfigError::override_parse(
            token,
            "expected the form 'key=value'",
        ));
    };
    validate_key(key.trim(), token)?;
    Ok((key.trim(), value))
}

/// Validate a dotted key: non-empty segments of letters, digits, `_` or `-`.
pub fn validate_key(key: &str, token: &str) -> ConfigResult<()> {
    if key.is_empty() {
        return Err(ConfigError::override_parse(token, "empty key"));
    }
    for segment in key.split('.') {
        if segment.is_empty() {
            return Err(ConfigError::override_parse(
                token,
                format!("empty segment in key '{key}'"),
            ));
        }
        if let Some(c) = segment
            .chars()
            .find(|c| !(c.is_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(ConfigError::override_parse(
                token,
                format!("invalid character '{c}' in key '{key}'"),
            ));
        }
    }
    Ok(())
}

/// Coerce a raw override value.
pub fn parse_value(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::String(raw.to_string());
    }
    match serde_yaml::from_str::<Value>(raw) {
        // A lone comment or other content YAML reads as null stays literal.
        Ok(Value::Null) if !matches!(raw.trim(), "null" | "Null" | "NULL" | "~") => {
            Value::String(raw.to_string())
        }
        Ok(value) => value,
        Err(_) => Value::String(raw.to_string()),
    }
}

/// Deep-merge `patch` into `base`: mappings merge key by key, everything
/// else replaces.
pub fn merge_value(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}
