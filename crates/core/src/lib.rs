//! # dc-core
//!
//! Configuration resolution and pipeline discovery for dag-composer.
//!
//! This crate provides:
//! - Layered configuration loading (file, search strategies, dotlist overrides, schema)
//! - An execution engine abstraction plus a built-in function graph
//! - Pipelines: named, reusable wrappers around one engine and a set of outputs
//! - The composer, which turns a factory function into a pipeline registry
//!
//! ## Modules
//!
//! - [`config`]: Configuration resolution and validation
//! - [`engine`]: Engine trait and the built-in function graph
//! - [`pipeline`]: Pipeline and registry types
//! - [`composer`]: Factory invocation and registry caching

pub mod composer;
pub mod config;
pub mod engine;
pub mod pipeline;

pub use composer::{Composer, ComposerError, Resolved};
pub use config::{ConfigError, ConfigResolver, LoadOptions, ResolvedConfig, Schema, ValueMap};
pub use engine::{Engine, EngineError, ExecutionReport, GraphBuilder, Module, Node};
pub use pipeline::{Pipeline, PipelineError, Registry, RegistryError};
pub use serde_json::Value;
