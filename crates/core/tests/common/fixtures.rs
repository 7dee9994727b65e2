//! Test fixtures: sample modules, factories and configuration files.

use dc_core::engine::{GraphBuilder, Module, Node};
use dc_core::{Pipeline, Registry, ResolvedConfig, Value, ValueMap};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Text-processing nodes: `process_text` strips and uppercases `raw_text`,
/// `count_words` counts the words of the processed text and `long_words`
/// keeps words of at least `min_word_length` characters.
pub fn text_module() -> Module {
    Module::new("text")
        .node(
            Node::new("process_text", &["raw_text"], |inputs| {
                Ok(json!(inputs.str("raw_text")?.trim().to_uppercase()))
            })
            .with_doc("Strip and uppercase the raw text."),
        )
        .node(Node::new("count_words", &["process_text"], |inputs| {
            Ok(json!(inputs.str("process_text")?.split_whitespace().count()))
        }))
        .node(Node::new(
            "long_words",
            &["process_text", "min_word_length"],
            |inputs| {
                let min = inputs.i64("min_word_length")?;
                let words: Vec<&str> = inputs
                    .str("process_text")?
                    .split_whitespace()
                    .filter(|w| w.chars().count() as i64 >= min)
                    .collect();
                Ok(json!(words))
            },
        ))
}

/// Number nodes, with `transformed_sum` branching on the `method` config key.
pub fn math_module() -> Module {
    Module::new("math")
        .node(Node::new("doubled_numbers", &["numbers"], |inputs| {
            let numbers: Vec<i64> = inputs.parse("numbers")?;
            Ok(json!(numbers.iter().map(|n| n * 2).collect::<Vec<_>>()))
        }))
        .node(Node::new("sum_doubled", &["doubled_numbers"], |inputs| {
            let doubled: Vec<i64> = inputs.parse("doubled_numbers")?;
            Ok(json!(doubled.iter().sum::<i64>()))
        }))
        .node(
            Node::new("transformed_sum", &["sum_doubled", "factor"], |inputs| {
                Ok(json!(inputs.i64("sum_doubled")? + inputs.i64("factor")?))
            })
            .when("method", "add"),
        )
        .node(
            Node::new("transformed_sum", &["sum_doubled", "factor"], |inputs| {
                Ok(json!(inputs.i64("sum_doubled")? * inputs.i64("factor")?))
            })
            .when("method", "multiply"),
        )
}

/// Factory used across the suites.
///
/// `analysis.min_word_length` is baked into the text pipelines as
/// `min_word_length`; `method` selects the `transformed_sum` variant.
pub fn create_pipelines(config: &ResolvedConfig) -> anyhow::Result<Registry> {
    let mut text_config = ValueMap::new();
    if let Some(min) = config.get("analysis.min_word_length") {
        text_config.insert("min_word_length".to_string(), min.clone());
    }
    let text = GraphBuilder::new()
        .with_module(&text_module())
        .with_config(text_config);

    let mut math = GraphBuilder::new().with_module(&math_module());
    if let Some(method) = config.get("method") {
        let mut math_config = ValueMap::new();
        math_config.insert("method".to_string(), method.clone());
        math = math.with_config(math_config);
    }

    let mut registry = Registry::new()
        .with(
            "word_counter",
            Pipeline::from_builder(&text, ["count_words"])?
                .with_description("Counts words in a piece of text")
                .with_tag("text"),
        )?
        .with(
            "long_words",
            Pipeline::from_builder(&text, ["long_words"])?.with_tag("text"),
        )?
        .with(
            "simple_pipeline",
            Pipeline::from_builder(&math, ["sum_doubled"])?,
        )?
        .with(
            "internal_sum",
            Pipeline::from_builder(&math, ["doubled_numbers", "sum_doubled"])?.private(),
        )?;

    if config.get("method").is_some() {
        registry.register(
            "branched_pipeline",
            Pipeline::from_builder(&math, ["transformed_sum"])?,
        )?;
    }
    Ok(registry)
}

/// Convert a JSON object literal into a mapping.
pub fn map(value: Value) -> ValueMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected mapping, got {other}"),
    }
}

/// Write `content` to `dir/name`, creating parent directories.
#[allow(dead_code)]
pub fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create config dir");
    }
    std::fs::write(&path, content).expect("Failed to write config file");
    path
}

/// Sample configuration used by several suites.
#[allow(dead_code)]
pub const SAMPLE_CONFIG: &str = r#"
analysis:
  min_word_length: 3
processing:
  use_cache: true
numbers: [1, 2, 3]
factor: 2
"#;
