//! Entry points.
//!
//! An [`Engine`] holds the lowest config layer (its defaults) and the message
//! registry every run consults. The free functions run with a fresh default
//! engine.

use crate::Schema;
use sift_core::{Config, Dataset, Issue, MessageRegistry, Result, ValidationError, Value};
use std::sync::Arc;
use tracing::debug;

/// Outcome of [`Engine::safe_parse`].
#[derive(Debug, Clone, PartialEq)]
pub struct SafeParseResult {
    /// The output matched the schema's fundamental shape
    pub typed: bool,

    /// No issue was recorded
    pub success: bool,

    /// The (possibly transformed) output
    pub output: Value,

    /// Every issue of the run, absent on success
    pub issues: Option<Vec<Issue>>,
}

impl SafeParseResult {
    fn from_dataset(mut dataset: Dataset) -> Self {
        dataset.render_messages();
        Self {
            typed: dataset.typed,
            success: dataset.is_success(),
            output: dataset.value,
            issues: dataset.issues,
        }
    }

    /// Converts into the output or the error `parse` would return.
    pub fn into_result(self) -> Result<Value> {
        if self.success {
            Ok(self.output)
        } else {
            Err(ValidationError::new(self.issues.unwrap_or_default()))
        }
    }
}

/// Runs schemas with engine-wide defaults and a message registry.
///
/// # Example
///
/// ```rust
/// use sift_schema::{Engine, string, min_length};
/// use sift_core::{Config, Message, Value};
///
/// let engine = Engine::new().with_defaults(Config::new().with_lang("fr"));
/// engine
///     .registry()
///     .set_specific_message("min_length", Message::template("Trop court: {received}"), Some("fr"));
///
/// let name = string().pipe([min_length(3)]);
/// let error = engine.parse(&name, Value::from("ab"), None).unwrap_err();
/// assert_eq!(error.to_string(), "Trop court: 2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    defaults: Config,
    registry: Arc<MessageRegistry>,
}

impl Engine {
    /// Creates an engine with empty defaults and an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the engine-wide config defaults.
    pub fn with_defaults(mut self, defaults: Config) -> Self {
        self.defaults = defaults;
        self
    }

    /// Shares `registry` with this engine.
    pub fn with_registry(mut self, registry: Arc<MessageRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Returns the message registry.
    pub fn registry(&self) -> &Arc<MessageRegistry> {
        &self.registry
    }

    /// Returns the engine-wide config defaults.
    pub fn defaults(&self) -> &Config {
        &self.defaults
    }

    /// Layers the caller's config over the engine defaults.
    ///
    /// A registry set on either config wins over the engine's own.
    pub fn resolve_config(&self, config: Option<&Config>) -> Config {
        let global = self
            .defaults
            .layered_over(&Config::new().with_registry(self.registry.clone()));
        match config {
            Some(config) => config.layered_over(&global),
            None => global,
        }
    }

    fn report(schema: &Schema, dataset: &mut Dataset, config: &Config) {
        if dataset.has_issues() {
            debug!(
                "{} run finished with {} issue(s)",
                schema.schema_type(),
                dataset.issue_count()
            );
            if !config.is_defer_messages() {
                dataset.render_messages();
            }
        }
    }

    /// Runs `schema` and returns the raw dataset.
    ///
    /// Messages are rendered before returning unless the resolved config
    /// defers them.
    ///
    /// # Panics
    ///
    /// Panics if the schema needs the async entry points.
    pub fn run(&self, schema: &Schema, input: Value, config: Option<&Config>) -> Dataset {
        let config = self.resolve_config(config);
        let mut dataset = schema.run(input, &config);
        Self::report(schema, &mut dataset, &config);
        dataset
    }

    /// Returns the output, or an error carrying every issue.
    pub fn parse(&self, schema: &Schema, input: Value, config: Option<&Config>) -> Result<Value> {
        self.safe_parse(schema, input, config).into_result()
    }

    /// Returns the outcome without failing.
    pub fn safe_parse(&self, schema: &Schema, input: Value, config: Option<&Config>) -> SafeParseResult {
        SafeParseResult::from_dataset(self.run(schema, input, config))
    }

    /// Returns true if `input` matches `schema`, stopping at the first issue.
    ///
    /// No message is rendered.
    pub fn is(&self, schema: &Schema, input: Value) -> bool {
        let config = Config::new()
            .with_abort_early(true)
            .with_deferred_messages(true);
        self.run(schema, input, Some(&config)).is_success()
    }

    /// Async twin of [`Engine::run`].
    pub async fn run_async(&self, schema: &Schema, input: Value, config: Option<&Config>) -> Dataset {
        let config = self.resolve_config(config);
        let mut dataset = schema.run_async(input, &config).await;
        Self::report(schema, &mut dataset, &config);
        dataset
    }

    /// Async twin of [`Engine::parse`].
    pub async fn parse_async(
        &self,
        schema: &Schema,
        input: Value,
        config: Option<&Config>,
    ) -> Result<Value> {
        self.safe_parse_async(schema, input, config)
            .await
            .into_result()
    }

    /// Async twin of [`Engine::safe_parse`].
    pub async fn safe_parse_async(
        &self,
        schema: &Schema,
        input: Value,
        config: Option<&Config>,
    ) -> SafeParseResult {
        SafeParseResult::from_dataset(self.run_async(schema, input, config).await)
    }

    /// Async twin of [`Engine::is`].
    pub async fn is_async(&self, schema: &Schema, input: Value) -> bool {
        let config = Config::new()
            .with_abort_early(true)
            .with_deferred_messages(true);
        self.run_async(schema, input, Some(&config))
            .await
            .is_success()
    }
}

/// Parses `input` with a default [`Engine`].
pub fn parse(schema: &Schema, input: Value, config: Option<&Config>) -> Result<Value> {
    Engine::new().parse(schema, input, config)
}

/// Safely parses `input` with a default [`Engine`].
pub fn safe_parse(schema: &Schema, input: Value, config: Option<&Config>) -> SafeParseResult {
    Engine::new().safe_parse(schema, input, config)
}

/// Checks `input` with a default [`Engine`].
pub fn is(schema: &Schema, input: Value) -> bool {
    Engine::new().is(schema, input)
}

/// Parses `input` with a default [`Engine`], awaiting async steps.
pub async fn parse_async(schema: &Schema, input: Value, config: Option<&Config>) -> Result<Value> {
    Engine::new().parse_async(schema, input, config).await
}

/// Safely parses `input` with a default [`Engine`], awaiting async steps.
pub async fn safe_parse_async(
    schema: &Schema,
    input: Value,
    config: Option<&Config>,
) -> SafeParseResult {
    Engine::new().safe_parse_async(schema, input, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{check_async, fallback, min_length, number, object, string};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sift_core::Message;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parse_returns_output() {
        let output = parse(&string(), Value::from("x"), None).expect("valid");
        assert_eq!(output, Value::from("x"));
    }

    #[test]
    fn test_parse_error_carries_every_issue() {
        let schema = object([("a", string()), ("b", number())]);
        let error = parse(&schema, Value::from(json!({"a": 1, "b": "x"})), None).unwrap_err();
        assert_eq!(error.issues.len(), 2);
        assert_eq!(error.to_string(), "Invalid type: Expected string but received 1");
    }

    #[test]
    fn test_safe_parse() {
        let result = safe_parse(&string().pipe([min_length(2)]), Value::from("a"), None);
        assert!(!result.success);
        assert!(result.typed);
        assert_eq!(result.output, Value::from("a"));
        assert_eq!(result.issues.as_ref().map(Vec::len), Some(1));
        assert!(result.into_result().is_err());
    }

    #[test]
    fn test_is_stops_at_first_issue() {
        let schema = object([("a", string()), ("b", number())]);
        assert!(is(&schema, Value::from(json!({"a": "x", "b": 1}))));
        assert!(!is(&schema, Value::from(json!({}))));
    }

    #[test]
    fn test_discarded_issues_skip_resolvers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let short = string().pipe([min_length(3).message(Message::resolver(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            "too short".to_string()
        }))]);

        assert!(!is(&short, Value::from("ab")));
        let safe = safe_parse(&fallback(short.clone(), "n/a"), Value::from("ab"), None);
        assert_eq!(safe.output, Value::from("n/a"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let deferred = Config::new().with_deferred_messages(true);
        let dataset = Engine::new().run(&short, Value::from("ab"), Some(&deferred));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(dataset.issues.as_ref().expect("issue")[0].has_pending_message());

        let result = safe_parse(&short, Value::from("ab"), Some(&deferred));
        assert_eq!(result.issues.expect("issue")[0].message, "too short");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_engine_layers() {
        let engine = Engine::new().with_defaults(
            Config::new()
                .with_abort_early(true)
                .with_message("engine default"),
        );
        let schema = object([("a", string()), ("b", number())]);

        let result = engine.safe_parse(&schema, Value::from(json!({})), None);
        let issues = result.issues.expect("issues");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "engine default");

        let caller = Config::new().with_abort_early(false);
        let result = engine.safe_parse(&schema, Value::from(json!({})), Some(&caller));
        assert_eq!(result.issues.map(|issues| issues.len()), Some(2));
    }

    #[test]
    fn test_engine_registry() {
        let engine = Engine::new();
        engine
            .registry()
            .set_global_message(Message::text("nope"), None);
        let result = engine.safe_parse(&number(), Value::from("x"), None);
        assert_eq!(result.issues.expect("issue")[0].message, "nope");

        engine.registry().delete_global_message(None);
        let result = engine.safe_parse(&number(), Value::from("x"), None);
        assert_eq!(
            result.issues.expect("issue")[0].message,
            "Invalid type: Expected number but received \"x\""
        );
    }

    #[tokio::test]
    async fn test_async_entry_points() {
        let schema = string().pipe([check_async(|value| async move {
            value.as_str().is_some_and(|text| text != "taken")
        })]);
        assert!(schema.is_async());

        let output = parse_async(&schema, Value::from("free"), None).await;
        assert_eq!(output.expect("valid"), Value::from("free"));

        let result = safe_parse_async(&schema, Value::from("taken"), None).await;
        assert!(!result.success);
        assert!(!Engine::new().is_async(&schema, Value::from("taken")).await);
    }
}
