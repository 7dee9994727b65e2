//! Assertion helpers over resolved configuration and execution results.

use dc_core::{ResolvedConfig, Value, ValueMap};

/// Assert that `config` holds `expected` at the dotted `key`.
#[allow(dead_code)]
pub fn assert_config_value(config: &ResolvedConfig, key: &str, expected: Value) {
    assert_eq!(
        config.get(key),
        Some(&expected),
        "config key '{key}' mismatch in {:?}",
        config.as_map()
    );
}

/// Assert that `values` has exactly the names in `expected`.
#[allow(dead_code)]
pub fn assert_value_names(values: &ValueMap, expected: &[&str]) {
    let names: Vec<&str> = values.keys().map(String::as_str).collect();
    assert_eq!(names, expected, "unexpected result names");
}
