//! Configuration resolution and validation.
//!
//! A configuration is resolved in a fixed order:
//! 1. Locate the source file (explicit path, git-root search or recursive search)
//! 2. Load it (`.yaml`/`.yml`, `.toml` or `.json`)
//! 3. Apply dotlist overrides (`dotted.key=value`) in the order given
//! 4. Validate and coerce against a [`Schema`], if one was declared
//!
//! The result is an immutable [`ResolvedConfig`].

pub mod dotlist;
pub mod error;
pub mod loader;
pub mod models;
pub mod schema;
pub mod search;

pub use dotlist::Override;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigResolver, LoadOptions};
pub use models::{ResolvedConfig, ValueMap};
pub use schema::{FieldError, FieldIssue, FieldKind, Schema, SchemaErrors, SchemaField};
pub use search::{ConfigSource, SearchStrategy};
