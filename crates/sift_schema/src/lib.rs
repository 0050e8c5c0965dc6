//! # Sift Schema
//!
//! Composable runtime validation. A [`Schema`] performs a base type check and
//! then runs its pipe of validations and transformations over the typed
//! value. Container schemas recurse into nested values and report every
//! failure with its path.
//!
//! ## Key Concepts
//!
//! - **Schema**: immutable validator built by factory functions ([`string`], [`object`], [`union`], ...)
//! - **Pipe**: ordered [`PipeItem`]s appended with [`Schema::pipe`]
//! - **Engine**: entry points layering engine defaults, schema defaults and the caller's config
//! - **Async**: every entry point has an async twin for schemas with async steps
//!
//! ## Example
//!
//! ```rust
//! use sift_schema::{email, min_value, integer, number, object, optional, string, safe_parse};
//! use sift_core::Value;
//! use serde_json::json;
//!
//! let signup = object([
//!     ("email", string().pipe([email()])),
//!     ("age", optional(number().pipe([integer(), min_value(18)]))),
//! ]);
//!
//! let result = safe_parse(&signup, Value::from(json!({"email": "ada@example.com", "age": 16})), None);
//! assert!(!result.success);
//!
//! let issue = &result.issues.unwrap()[0];
//! assert_eq!(issue.dot_path().as_deref(), Some("age"));
//! assert_eq!(issue.message, "Invalid value: Expected >=18 but received 16");
//! ```

mod action;
mod engine;
mod pipe;
mod schema;

pub use action::*;
pub use engine::*;
pub use pipe::*;
pub use schema::*;
