//! # Sift SDK
//!
//! Public API of the sift validation engine. Re-exports the value and issue
//! model ([`sift_core`]), every schema, pipe action and entry point
//! ([`sift_schema`]) and the document loaders ([`parser`]).
//!
//! ## Example
//!
//! ```rust
//! use sift_sdk::prelude::*;
//! use serde_json::json;
//!
//! let signup = object([
//!     ("email", string().pipe([trim(), email()])),
//!     ("plan", picklist(["free", "pro"])),
//! ]);
//!
//! let input = Value::from(json!({"email": " ada@example.com ", "plan": "team"}));
//! let error = parse(&signup, input, None).unwrap_err();
//!
//! assert_eq!(error.issues.len(), 1);
//! assert_eq!(error.first().and_then(|issue| issue.dot_path()).as_deref(), Some("plan"));
//! ```

pub use sift_core;
pub use sift_parser as parser;
pub use sift_schema;

pub use sift_core::{
    Config, Dataset, FlatErrors, Issue, IssueKind, Message, MessageRegistry, Object, PathItem,
    PathKey, PathOrigin, ValidationError, Value, flatten,
};
pub use sift_schema::*;

use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Everything needed to build and run schemas.
///
/// Unlike a glob import of [`sift_core`], this does not shadow
/// `std::result::Result`.
pub mod prelude {
    pub use sift_core::{
        Config, Dataset, FlatErrors, Issue, IssueKind, Message, MessageRegistry, Object,
        PathItem, PathKey, PathOrigin, ValidationError, Value, flatten,
    };
    pub use sift_schema::*;
}

/// Loads a document and parses it with `schema`.
///
/// Loading and validation failures are reported with the file path as
/// context; the validation error stays reachable through
/// [`anyhow::Error::downcast_ref`].
pub fn validate_file(
    engine: &Engine,
    schema: &Schema,
    path: &Path,
    config: Option<&Config>,
) -> anyhow::Result<Value> {
    let document = parser::parse_file(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    debug!("Validating {} against {}", path.display(), schema.schema_type());
    engine.parse(schema, document, config).with_context(|| {
        format!(
            "{} does not match the {} schema",
            path.display(),
            schema.schema_type()
        )
    })
}

/// Async twin of [`validate_file`].
///
/// Only validation is awaited; the file itself is read synchronously.
pub async fn validate_file_async(
    engine: &Engine,
    schema: &Schema,
    path: &Path,
    config: Option<&Config>,
) -> anyhow::Result<Value> {
    let document = parser::parse_file(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    debug!("Validating {} against {}", path.display(), schema.schema_type());
    engine
        .parse_async(schema, document, config)
        .await
        .with_context(|| {
            format!(
                "{} does not match the {} schema",
                path.display(),
                schema.schema_type()
            )
        })
}
