//! Integration tests for configuration resolution.
//!
//! These cover the ordering guarantees of [`ConfigResolver::load`]:
//! - file first, then overrides in the order given
//! - exactly one search strategy per resolution
//! - schema problems reported all at once

mod common;

use common::*;
use dc_core::config::{ConfigError, ConfigResolver, FieldKind, LoadOptions, Schema};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn test_overrides_applied_in_order_after_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_config(dir.path(), "config.yaml", SAMPLE_CONFIG);
    let resolver = ConfigResolver::new().with_working_dir(dir.path());

    let options = LoadOptions::new()
        .with_config_file("config.yaml")
        .with_overrides(["processing.use_cache=false"]);
    let config = resolver.load(&options).expect("Failed to load config");
    assert_config_value(&config, "processing.use_cache", json!(false));
    assert_config_value(&config, "analysis.min_word_length", json!(3));

    let options = LoadOptions::new()
        .with_config_file("config.yaml")
        .with_overrides(["processing.use_cache=false", "processing.use_cache=true"]);
    let config = resolver.load(&options).expect("Failed to load config");
    assert_config_value(&config, "processing.use_cache", json!(true));
}

#[test]
fn test_override_associativity() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_config(dir.path(), "config.yaml", SAMPLE_CONFIG);
    let resolver = ConfigResolver::new().with_working_dir(dir.path());

    let a = ["numbers=[4,5]", "analysis.min_word_length=1"];
    let b = ["factor=10", "analysis.extra={x: 1}"];

    let combined = LoadOptions::new()
        .with_config_file("config.yaml")
        .with_overrides(a.iter().chain(b.iter()).copied());
    let combined = resolver.load(&combined).expect("Failed to load combined");

    // Applying `b` on top of the result of `a` gives the same mapping.
    let first = resolver
        .load(&LoadOptions::new().with_config_file("config.yaml").with_overrides(a))
        .expect("Failed to load first stage");
    let mut staged = first.into_map();
    let overrides = dc_core::config::dotlist::parse_dotlist(b).expect("valid overrides");
    dc_core::config::dotlist::apply_overrides(&mut staged, &overrides);

    assert_eq!(combined.as_map(), &staged);
}

#[test]
fn test_search_strategies_are_exclusive() {
    let dir = tempdir().expect("Failed to create temp dir");
    let resolver = ConfigResolver::new().with_working_dir(dir.path());

    let both = LoadOptions::new()
        .with_config_file("config.yaml")
        .search_git_root()
        .search_recursive();
    assert!(matches!(
        resolver.load(&both),
        Err(ConfigError::ConflictingSearchStrategies)
    ));

    let no_file = LoadOptions::new().search_git_root();
    assert!(matches!(
        resolver.load(&no_file),
        Err(ConfigError::SearchWithoutFile { strategy: "git-root" })
    ));
}

#[test]
fn test_git_root_and_recursive_search() {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path();
    std::fs::create_dir(root.join(".git")).expect("Failed to create .git");
    write_config(root, "conf/app.yaml", "factor: 3\n");
    let nested = root.join("conf/deeper/still");
    std::fs::create_dir_all(&nested).expect("Failed to create nested dirs");

    let resolver = ConfigResolver::new().with_working_dir(&nested);

    let git = LoadOptions::new()
        .with_config_file("conf/app.yaml")
        .search_git_root();
    let config = resolver.load(&git).expect("found at git root");
    assert_eq!(config.source(), Some(root.join("conf/app.yaml").as_path()));

    let recursive = LoadOptions::new()
        .with_config_file("app.yaml")
        .search_recursive();
    let config = resolver.load(&recursive).expect("found in ancestor");
    assert_config_value(&config, "factor", json!(3));

    let plain = LoadOptions::new().with_config_file("app.yaml");
    assert!(matches!(
        resolver.load(&plain),
        Err(ConfigError::NotFound { .. })
    ));
}

#[test]
fn test_schema_reports_every_field() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_config(
        dir.path(),
        "config.toml",
        "factor = \"many\"\nunexpected = 1\n[analysis]\nmin_word_length = \"4\"\n",
    );

    let schema = Schema::new()
        .required("numbers", FieldKind::List)
        .required("factor", FieldKind::Integer)
        .with_default("analysis.min_word_length", FieldKind::Integer, 1)
        .optional("method", FieldKind::String);
    let resolver = ConfigResolver::new()
        .with_working_dir(dir.path())
        .with_schema(schema);

    let options = LoadOptions::new().with_config_file("config.toml");
    match resolver.load(&options) {
        Err(ConfigError::SchemaValidation(errors)) => {
            assert_eq!(
                errors.paths().collect::<Vec<_>>(),
                vec!["factor", "numbers", "unexpected"]
            );
        }
        other => panic!("Expected SchemaValidation, got {other:?}"),
    }

    let options = LoadOptions::new()
        .with_config_file("config.toml")
        .with_overrides(["factor=2", "numbers=[1]", "unexpected={}"]);
    let result = resolver.load(&options);
    assert!(
        matches!(result, Err(ConfigError::SchemaValidation(ref e)) if e.len() == 1),
        "Empty mappings are still unknown leaves: {result:?}"
    );
}

#[test]
fn test_typed_access() {
    #[derive(serde::Deserialize)]
    struct Analysis {
        min_word_length: usize,
    }
    #[derive(serde::Deserialize)]
    struct Settings {
        analysis: Analysis,
        numbers: Vec<i64>,
    }

    let dir = tempdir().expect("Failed to create temp dir");
    write_config(dir.path(), "config.yml", SAMPLE_CONFIG);
    let config = ConfigResolver::new()
        .with_working_dir(dir.path())
        .load(&LoadOptions::new().with_config_file("config.yml"))
        .expect("Failed to load config");

    let settings: Settings = config.deserialize().expect("config matches struct");
    assert_eq!(settings.analysis.min_word_length, 3);
    assert_eq!(settings.numbers, vec![1, 2, 3]);
    assert!(map(json!({"k": 1})).contains_key("k"));
}
