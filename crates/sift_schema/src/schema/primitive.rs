//! Leaf schemas.

use super::{Schema, SchemaKind};
use futures::FutureExt;
use futures::future::BoxFuture;
use sift_core::{Config, Dataset, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type SyncPredicate = dyn Fn(&Value) -> bool + Send + Sync;
type AsyncPredicate = dyn Fn(Value) -> BoxFuture<'static, bool> + Send + Sync;

/// Predicate of a [`custom`] schema.
#[derive(Clone)]
pub enum CustomCheck {
    /// Synchronous predicate
    Sync(Arc<SyncPredicate>),
    /// Predicate that must be awaited
    Async(Arc<AsyncPredicate>),
}

impl CustomCheck {
    /// Returns true if the predicate must be awaited.
    pub fn is_async(&self) -> bool {
        matches!(self, CustomCheck::Async(_))
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomCheck::Sync(_) => f.write_str("Sync(..)"),
            CustomCheck::Async(_) => f.write_str("Async(..)"),
        }
    }
}

/// Accepts any value.
pub fn any() -> Schema {
    Schema::new(SchemaKind::Any)
}

/// Accepts any value.
pub fn unknown() -> Schema {
    Schema::new(SchemaKind::Unknown)
}

/// Rejects every value.
pub fn never() -> Schema {
    Schema::new(SchemaKind::Never)
}

/// Accepts `null`.
pub fn null() -> Schema {
    Schema::new(SchemaKind::Null)
}

/// Accepts `undefined`.
pub fn undefined() -> Schema {
    Schema::new(SchemaKind::Undefined)
}

/// Accepts booleans.
pub fn boolean() -> Schema {
    Schema::new(SchemaKind::Boolean)
}

/// Accepts numbers, excluding NaN.
pub fn number() -> Schema {
    Schema::new(SchemaKind::Number)
}

/// Accepts big integers.
pub fn bigint() -> Schema {
    Schema::new(SchemaKind::BigInt)
}

/// Accepts strings.
pub fn string() -> Schema {
    Schema::new(SchemaKind::String)
}

/// Accepts dates.
pub fn date() -> Schema {
    Schema::new(SchemaKind::Date)
}

/// Accepts exactly `literal`.
pub fn literal(literal: impl Into<Value>) -> Schema {
    Schema::new(SchemaKind::Literal(literal.into()))
}

/// Accepts any of `options`.
pub fn picklist<V: Into<Value>>(options: impl IntoIterator<Item = V>) -> Schema {
    Schema::new(SchemaKind::Picklist(
        options.into_iter().map(Into::into).collect(),
    ))
}

/// Accepts the value of any of the named `members`.
///
/// # Example
///
/// ```rust
/// use sift_schema::{enumeration, is};
/// use sift_core::Value;
///
/// let direction = enumeration([("Up", "UP"), ("Down", "DOWN")]);
/// assert!(is(&direction, Value::from("UP")));
/// assert!(!is(&direction, Value::from("Up")));
/// ```
pub fn enumeration<K, V>(members: impl IntoIterator<Item = (K, V)>) -> Schema
where
    K: Into<String>,
    V: Into<Value>,
{
    Schema::new(SchemaKind::Enum(
        members
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect(),
    ))
}

/// Accepts values for which `predicate` returns true.
pub fn custom<F>(predicate: F) -> Schema
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Schema::new(SchemaKind::Custom(CustomCheck::Sync(Arc::new(predicate))))
}

/// Accepts values for which the awaited `predicate` returns true.
pub fn custom_async<F, Fut>(predicate: F) -> Schema
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    let predicate = Arc::new(predicate);
    Schema::new(SchemaKind::Custom(CustomCheck::Async(Arc::new(
        move |value| {
            let predicate = predicate.clone();
            async move { predicate(value).await }.boxed()
        },
    ))))
}

fn accepts(kind: &SchemaKind, input: &Value) -> bool {
    match (kind, input) {
        (SchemaKind::Any | SchemaKind::Unknown, _) => true,
        (SchemaKind::Null, Value::Null) => true,
        (SchemaKind::Undefined, Value::Undefined) => true,
        (SchemaKind::Boolean, Value::Bool(_)) => true,
        (SchemaKind::Number, Value::Number(n)) => !n.is_nan(),
        (SchemaKind::BigInt, Value::BigInt(_)) => true,
        (SchemaKind::String, Value::String(_)) => true,
        (SchemaKind::Date, Value::Date(_)) => true,
        (SchemaKind::Literal(literal), input) => literal == input,
        (SchemaKind::Picklist(options), input) => options.contains(input),
        (SchemaKind::Enum(members), input) => members.iter().any(|(_, value)| value == input),
        _ => false,
    }
}

fn settle(schema: &Schema, accepted: bool, input: Value, config: &Config) -> Dataset {
    if accepted {
        Dataset::success(input)
    } else {
        schema.type_issue(input, config)
    }
}

/// Runs a leaf check.
///
/// # Panics
///
/// Panics on an asynchronous custom check.
pub(crate) fn run_leaf(schema: &Schema, kind: &SchemaKind, input: Value, config: &Config) -> Dataset {
    let accepted = match kind {
        SchemaKind::Custom(CustomCheck::Sync(predicate)) => predicate(&input),
        SchemaKind::Custom(CustomCheck::Async(_)) => {
            panic!("custom schema is asynchronous and cannot run synchronously")
        }
        kind => accepts(kind, &input),
    };
    settle(schema, accepted, input, config)
}

/// Runs a leaf check, awaiting asynchronous custom checks.
pub(crate) async fn run_leaf_async(
    schema: &Schema,
    kind: &SchemaKind,
    input: Value,
    config: &Config,
) -> Dataset {
    match kind {
        SchemaKind::Custom(CustomCheck::Async(predicate)) => {
            let accepted = predicate(input.clone()).await;
            settle(schema, accepted, input, config)
        }
        kind => run_leaf(schema, kind, input, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sift_core::IssueKind;

    fn passes(schema: &Schema, input: impl Into<Value>) -> bool {
        schema.run(input.into(), &Config::new()).is_success()
    }

    #[test]
    fn test_scalar_schemas() {
        assert!(passes(&string(), "x"));
        assert!(!passes(&string(), 1));
        assert!(passes(&number(), 1.5));
        assert!(!passes(&number(), f64::NAN));
        assert!(passes(&number(), f64::INFINITY));
        assert!(passes(&boolean(), false));
        assert!(passes(&bigint(), 5i128));
        assert!(!passes(&bigint(), 5));
        assert!(passes(&null(), Value::Null));
        assert!(!passes(&null(), Value::Undefined));
        assert!(passes(&undefined(), Value::Undefined));
        assert!(passes(&any(), Value::Null));
        assert!(passes(&unknown(), "x"));
        assert!(!passes(&never(), "x"));
    }

    #[test]
    fn test_type_issue_shape() {
        let dataset = number().run(Value::from("12"), &Config::new());
        assert!(!dataset.typed);
        let issue = &dataset.issues.expect("issue")[0];
        assert_eq!(issue.kind, IssueKind::Schema);
        assert_eq!(issue.issue_type, "number");
        assert_eq!(issue.expected.as_deref(), Some("number"));
        assert_eq!(issue.received, "\"12\"");
        assert_eq!(issue.message, "Invalid type: Expected number but received \"12\"");
        assert_eq!(issue.path, None);
    }

    #[test]
    fn test_literal_and_picklist() {
        assert!(passes(&literal("a"), "a"));
        assert!(!passes(&literal("a"), "b"));
        assert_eq!(literal("a").expects(), "\"a\"");

        let schema = picklist(["red", "green"]);
        assert!(passes(&schema, "green"));
        let dataset = schema.run(Value::from("blue"), &Config::new());
        assert_eq!(
            dataset.issues.expect("issue")[0].message,
            "Invalid type: Expected (\"red\" | \"green\") but received \"blue\""
        );
        assert_eq!(picklist(Vec::<Value>::new()).expects(), "never");
    }

    #[test]
    fn test_enumeration_expects_values() {
        let schema = enumeration([("One", 1), ("Two", 2)]);
        assert_eq!(schema.expects(), "(1 | 2)");
        assert!(passes(&schema, 2));
    }

    #[test]
    fn test_date() {
        assert!(passes(&date(), chrono::Utc::now()));
        let dataset = date().run(Value::from("2024-01-01"), &Config::new());
        assert_eq!(
            dataset.issues.expect("issue")[0].expected.as_deref(),
            Some("Date")
        );
    }

    #[test]
    fn test_custom() {
        let even = custom(|value| value.as_f64().is_some_and(|n| n % 2.0 == 0.0));
        assert!(passes(&even, 4));
        let dataset = even.run(Value::from(3), &Config::new());
        let issue = &dataset.issues.expect("issue")[0];
        assert_eq!(issue.issue_type, "custom");
        assert_eq!(issue.message, "Invalid type: Expected unknown but received 3");
    }

    #[tokio::test]
    async fn test_custom_async() {
        let schema = custom_async(|value| async move { value == Value::from("ok") });
        assert!(schema.is_async());
        let dataset = schema.run_async(Value::from("ok"), &Config::new()).await;
        assert!(dataset.is_success());
        let dataset = schema.run_async(Value::from("no"), &Config::new()).await;
        assert!(!dataset.is_success());
    }
}
