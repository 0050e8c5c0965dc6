//! Wrapper schemas: optionality, defaults, fallbacks and laziness.

use super::{Schema, SchemaKind};
use sift_core::{Config, Dataset, Value};
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

type Factory = dyn Fn() -> Value + Send + Sync;

/// Value substituted for an accepted absent input.
#[derive(Clone)]
pub enum DefaultValue {
    /// Fixed value
    Value(Value),
    /// Computed on every use
    Factory(Arc<Factory>),
}

impl DefaultValue {
    /// Creates a default computed on every use.
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        DefaultValue::Factory(Arc::new(factory))
    }

    /// Produces the default value.
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Factory(factory) => factory(),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Value(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::Value(Value::from(value))
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::Value(Value::from(value))
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        DefaultValue::Value(Value::from(value))
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        DefaultValue::Value(Value::from(value))
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Value(Value::from(value))
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultValue::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Schema wrapped by `optional`, `nullable` or `nullish`.
#[derive(Debug, Clone)]
pub struct Wrapped {
    /// The wrapped schema
    pub schema: Schema,

    /// Default substituted for the accepted absent value
    pub default: Option<DefaultValue>,
}

impl Wrapped {
    /// Decides whether `input` is accepted as absent or handed to the
    /// wrapped schema.
    ///
    /// An absent input with a default is replaced by the default, which the
    /// wrapped schema then validates.
    pub(crate) fn admit(&self, kind: &SchemaKind, input: Value) -> ControlFlow<Dataset, Value> {
        let absent = match kind {
            SchemaKind::Optional(_) => input.is_undefined(),
            SchemaKind::Nullable(_) => input.is_null(),
            _ => input.is_nullish(),
        };
        if !absent {
            return ControlFlow::Continue(input);
        }
        match &self.default {
            Some(default) => match default.resolve() {
                value if value == input => ControlFlow::Break(Dataset::success(value)),
                value => ControlFlow::Continue(value),
            },
            None => ControlFlow::Break(Dataset::success(input)),
        }
    }
}

fn wrap(schema: Schema, default: Option<DefaultValue>) -> Wrapped {
    Wrapped { schema, default }
}

/// Accepts `undefined` or a value matching `schema`.
pub fn optional(schema: Schema) -> Schema {
    Schema::new(SchemaKind::Optional(wrap(schema, None)))
}

/// Like [`optional`], substituting `default` for `undefined`.
///
/// # Example
///
/// ```rust
/// use sift_schema::{number, optional_with_default, parse};
/// use sift_core::Value;
///
/// let port = optional_with_default(number(), 8080);
/// assert_eq!(parse(&port, Value::Undefined, None).unwrap(), Value::from(8080));
/// ```
pub fn optional_with_default(schema: Schema, default: impl Into<DefaultValue>) -> Schema {
    Schema::new(SchemaKind::Optional(wrap(schema, Some(default.into()))))
}

/// Accepts `null` or a value matching `schema`.
pub fn nullable(schema: Schema) -> Schema {
    Schema::new(SchemaKind::Nullable(wrap(schema, None)))
}

/// Like [`nullable`], substituting `default` for `null`.
pub fn nullable_with_default(schema: Schema, default: impl Into<DefaultValue>) -> Schema {
    Schema::new(SchemaKind::Nullable(wrap(schema, Some(default.into()))))
}

/// Accepts `null`, `undefined` or a value matching `schema`.
pub fn nullish(schema: Schema) -> Schema {
    Schema::new(SchemaKind::Nullish(wrap(schema, None)))
}

/// Like [`nullish`], substituting `default` for `null` and `undefined`.
pub fn nullish_with_default(schema: Schema, default: impl Into<DefaultValue>) -> Schema {
    Schema::new(SchemaKind::Nullish(wrap(schema, Some(default.into()))))
}

/// Rejects `undefined`, otherwise runs `schema`.
pub fn non_optional(schema: Schema) -> Schema {
    Schema::new(SchemaKind::NonOptional(schema))
}

/// Rejects `null`, otherwise runs `schema`.
pub fn non_nullable(schema: Schema) -> Schema {
    Schema::new(SchemaKind::NonNullable(schema))
}

/// Rejects `null` and `undefined`, otherwise runs `schema`.
pub fn non_nullish(schema: Schema) -> Schema {
    Schema::new(SchemaKind::NonNullish(schema))
}

/// Returns true if a `non_*` schema rejects `input` outright.
pub(crate) fn rejects_nullish(kind: &SchemaKind, input: &Value) -> bool {
    match kind {
        SchemaKind::NonOptional(_) => input.is_undefined(),
        SchemaKind::NonNullable(_) => input.is_null(),
        SchemaKind::NonNullish(_) => input.is_nullish(),
        _ => false,
    }
}

/// Builds the schema to run from the input, for recursive shapes.
///
/// # Example
///
/// ```rust
/// use sift_schema::{array, lazy, object, string, Schema, is};
/// use serde_json::json;
///
/// fn node() -> Schema {
///     object([("name", string()), ("children", array(lazy(|_| node())))])
/// }
///
/// let tree = json!({"name": "root", "children": [{"name": "leaf", "children": []}]});
/// assert!(is(&node(), tree.into()));
/// ```
pub fn lazy<F>(getter: F) -> Schema
where
    F: Fn(&Value) -> Schema + Send + Sync + 'static,
{
    Schema::new(SchemaKind::Lazy(Arc::new(getter)))
}

/// Replaces a failed run of `schema` with a success holding `fallback`.
pub fn fallback(schema: Schema, fallback: impl Into<Value>) -> Schema {
    schema.with_fallback(fallback)
}

/// Layers `defaults` under the config of every run of `schema`.
pub fn config(schema: Schema, defaults: Config) -> Schema {
    schema.with_config(defaults)
}
