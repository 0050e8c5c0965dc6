//! # Sift Core
//!
//! Data model shared by every part of the sift validation engine.
//!
//! Schemas never throw while validating: they return a [`Dataset`] holding the
//! (possibly transformed) value and every [`Issue`] found along the way.
//!
//! ## Key Concepts
//!
//! - **Value**: the untyped input every schema inspects
//! - **Dataset**: typed flag, value and optional issues produced by a run
//! - **Issue**: one schema, validation or transformation failure with its path
//! - **Config**: per-run options (language, message, abort modes)
//! - **MessageRegistry**: language specific messages, passed explicitly
//!
//! ## Example
//!
//! ```rust
//! use sift_core::{Config, Dataset, IssueContext, IssueInfo, Value};
//!
//! let mut dataset = Dataset::untyped(Value::from(42));
//! let context = IssueContext::schema("string", "string".to_string(), None);
//! dataset.add_issue(&context, "type", &Config::new(), IssueInfo::default());
//!
//! let issues = dataset.issues.unwrap();
//! assert_eq!(issues[0].message, "Invalid type: Expected string but received 42");
//! ```

pub mod codec;
pub mod config;
pub mod dataset;
pub mod error;
pub mod flatten;
pub mod issue;
pub mod message;
pub mod value;

pub use config::*;
pub use dataset::*;
pub use error::*;
pub use flatten::*;
pub use issue::*;
pub use message::*;
pub use value::*;
