//! Pipelines shipped with the `dag-composer` binary.
//!
//! They double as a worked example of a factory: configuration values are
//! baked into the graphs at construction time, and `method` selects which
//! variant of `transformed_sum` is active.

use dc_core::config::FieldKind;
use dc_core::engine::{GraphBuilder, Module, Node};
use dc_core::{Composer, Pipeline, Registry, ResolvedConfig, Schema, ValueMap};
use serde_json::json;

fn text_module() -> Module {
    Module::new("text")
        .node(
            Node::new("process_text", &["raw_text"], |inputs| {
                Ok(json!(inputs.str("raw_text")?.trim().to_uppercase()))
            })
            .with_doc("Strip surrounding whitespace and uppercase."),
        )
        .node(Node::new("count_words", &["process_text"], |inputs| {
            Ok(json!(inputs.str("process_text")?.split_whitespace().count()))
        }))
        .node(Node::new(
            "long_words",
            &["process_text", "min_word_length"],
            |inputs| {
                let min = usize::try_from(inputs.i64("min_word_length")?)?;
                let words: Vec<&str> = inputs
                    .str("process_text")?
                    .split_whitespace()
                    .filter(|word| word.chars().count() >= min)
                    .collect();
                Ok(json!(words))
            },
        ))
}

fn math_module() -> Module {
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

/// Configuration accepted by the demo pipelines.
pub fn schema() -> Schema {
    Schema::new()
        .with_default("analysis.min_word_length", FieldKind::Integer, 3)
        .with_default("processing.use_cache", FieldKind::Boolean, false)
        .with_default("numbers", FieldKind::List, json!([1, 2, 3]))
        .with_default("factor", FieldKind::Integer, 2)
        .optional("method", FieldKind::String)
}

/// Build the demo registry for `config`.
///
/// `branched_pipeline` only exists when `method` is set.
pub fn create_pipelines(config: &ResolvedConfig) -> anyhow::Result<Registry> {
    let mut text_config = ValueMap::new();
    if let Some(min) = config.get("analysis.min_word_length") {
        text_config.insert("min_word_length".to_string(), min.clone());
    }
    let text = GraphBuilder::new()
        .with_module(&text_module())
        .with_config(text_config);

    let mut math_config = ValueMap::new();
    for key in ["method", "factor"] {
        if let Some(value) = config.get(key) {
            math_config.insert(key.to_string(), value.clone());
        }
    }
    let math = GraphBuilder::new()
        .with_module(&math_module())
        .with_config(math_config);

    let mut registry = Registry::new()
        .with(
            "word_counter",
            Pipeline::from_builder(&text, ["count_words"])?
                .with_description("Counts words in a piece of text")
                .with_tag("text"),
        )?
        .with(
            "long_words",
            Pipeline::from_builder(&text, ["long_words"])?
                .with_description("Words at least analysis.min_word_length long")
                .with_tag("text"),
        )?
        .with(
            "simple_pipeline",
            Pipeline::from_builder(&math, ["sum_doubled"])?
                .with_description("Sum of the doubled numbers")
                .with_tag("math"),
        )?
        .with(
            "internal_sum",
            Pipeline::from_builder(&math, ["doubled_numbers", "sum_doubled"])?.private(),
        )?;

    if config.get("method").is_some() {
        registry.register(
            "branched_pipeline",
            Pipeline::from_builder(&math, ["transformed_sum"])?
                .with_description("Sum of the doubled numbers, combined with factor")
                .with_tag("math"),
        )?;
    }
    Ok(registry)
}

/// Composer over the demo pipelines.
pub fn composer() -> Composer {
    Composer::new(create_pipelines)
        .with_factory_name("demo::create_pipelines")
        .with_schema(schema())
}
