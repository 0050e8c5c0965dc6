//! Unions and discriminated unions.

use super::{ObjectSchema, Schema, SchemaKind, join_expects};
use sift_core::{Config, Dataset, Issue, IssueInfo, PathItem, Value};
use tracing::trace;

/// Accepts the output of the first option that succeeds.
///
/// Options are tried in order. If none succeeds, a single `union` issue is
/// reported whose nested issues are those of every option. Messages of
/// failed options are only rendered once that issue is reported.
pub fn union(options: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::new(SchemaKind::Union(options.into_iter().collect()))
}

/// Builds the `union` issue once every option has failed.
///
/// The value of the first structurally matching option is kept so callers
/// can still inspect a partial output.
fn settle_union(schema: &Schema, input: Value, attempts: Vec<Dataset>, config: &Config) -> Dataset {
    let value = attempts
        .iter()
        .find(|attempt| attempt.typed)
        .map(|attempt| attempt.value.clone())
        .unwrap_or_else(|| input.clone());
    let nested: Vec<Issue> = attempts
        .into_iter()
        .filter_map(|attempt| attempt.issues)
        .flatten()
        .collect();

    let mut dataset = Dataset::untyped(value);
    let info = IssueInfo {
        input: Some(input),
        issues: (!nested.is_empty()).then_some(nested),
        ..IssueInfo::default()
    };
    schema.report(&mut dataset, "type", config, info);
    dataset
}

pub(crate) fn run_union(schema: &Schema, options: &[Schema], input: Value, config: &Config) -> Dataset {
    let attempt_config = config.deferring();
    let mut attempts = Vec::with_capacity(options.len());
    for (index, option) in options.iter().enumerate() {
        let dataset = option.run(input.clone(), &attempt_config);
        if dataset.is_success() {
            trace!("union option {} ({}) matched", index, option.schema_type());
            return dataset;
        }
        trace!("union option {} ({}) failed", index, option.schema_type());
        attempts.push(dataset);
    }
    settle_union(schema, input, attempts, config)
}

pub(crate) async fn run_union_async(
    schema: &Schema,
    options: &[Schema],
    input: Value,
    config: &Config,
) -> Dataset {
    let attempt_config = config.deferring();
    let mut attempts = Vec::with_capacity(options.len());
    for (index, option) in options.iter().enumerate() {
        let dataset = option.run_async(input.clone(), &attempt_config).await;
        if dataset.is_success() {
            trace!("union option {} ({}) matched", index, option.schema_type());
            return dataset;
        }
        trace!("union option {} ({}) failed", index, option.schema_type());
        attempts.push(dataset);
    }
    settle_union(schema, input, attempts, config)
}

/// Discriminator key plus the object (or nested variant) options.
#[derive(Debug, Clone)]
pub struct VariantSchema {
    /// Key read from the input to pick an option
    pub key: String,

    /// Object schemas or nested variants
    pub options: Vec<Schema>,
}

/// Accepts objects matching the option selected by the value at `key`.
///
/// Options are object schemas or nested variants; a nested variant adds its
/// own key to the discriminators checked for its options. Only options whose
/// discriminators all match are run.
///
/// # Example
///
/// ```rust
/// use sift_schema::{literal, number, object, string, variant, is};
/// use serde_json::json;
///
/// let shape = variant("kind", [
///     object([("kind", literal("circle")), ("radius", number())]),
///     object([("kind", literal("label")), ("text", string())]),
/// ]);
/// assert!(is(&shape, json!({"kind": "circle", "radius": 2}).into()));
/// assert!(!is(&shape, json!({"kind": "square"}).into()));
/// ```
pub fn variant(key: impl Into<String>, options: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::new(SchemaKind::Variant(VariantSchema {
        key: key.into(),
        options: options.into_iter().collect(),
    }))
}

/// An object option with the discriminator keys it must satisfy.
struct Candidate<'a> {
    schema: &'a Schema,
    object: &'a ObjectSchema,
    keys: Vec<&'a str>,
}

/// The discriminator that explains the failure best.
///
/// Keys checked later in a candidate have a higher priority; at equal
/// priority a key present in the input wins over an absent one.
struct Mismatch {
    key: String,
    priority: usize,
    expected: Vec<String>,
}

impl Mismatch {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            priority: 0,
            expected: Vec::new(),
        }
    }

    fn record(&mut self, input: &Value, key: &str, priority: usize, expects: Option<String>) {
        let present = |key: &str| input.get(key).is_some();
        if self.key != key
            && (self.priority < priority
                || (self.priority == priority && present(key) && !present(&self.key)))
        {
            self.key = key.to_string();
            self.priority = priority;
            self.expected.clear();
        }
        if self.key == key {
            self.expected.extend(expects);
        }
    }
}

/// Keeps the first output, replacing it only by a typed one while it is
/// untyped.
fn prefer(output: Option<Dataset>, option: Dataset) -> Option<Dataset> {
    match output {
        Some(current) if current.typed || !option.typed => Some(current),
        _ => Some(option),
    }
}

/// Renders the messages of a kept candidate unless the caller defers them too.
fn surface(mut dataset: Dataset, config: &Config) -> Dataset {
    if !config.is_defer_messages() {
        dataset.render_messages();
    }
    dataset
}

impl VariantSchema {
    fn candidates<'a>(&'a self, keys: &[&'a str], out: &mut Vec<Candidate<'a>>) {
        for option in &self.options {
            match option.kind() {
                SchemaKind::Variant(nested) => {
                    let mut keys = keys.to_vec();
                    if !keys.contains(&nested.key.as_str()) {
                        keys.push(&nested.key);
                    }
                    nested.candidates(&keys, out);
                }
                SchemaKind::Object(object) => out.push(Candidate {
                    schema: option,
                    object,
                    keys: keys.to_vec(),
                }),
                _ => {}
            }
        }
    }

    fn flatten(&self) -> Vec<Candidate<'_>> {
        let mut out = Vec::new();
        self.candidates(&[self.key.as_str()], &mut out);
        out
    }

    fn unmatched(&self, schema: &Schema, input: Value, mismatch: Mismatch, config: &Config) -> Dataset {
        let value = input.get(&mismatch.key).cloned().unwrap_or_default();
        let mut dataset = Dataset::untyped(input.clone());
        let info = IssueInfo {
            input: Some(value.clone()),
            expected: Some(join_expects(mismatch.expected, "|")),
            path: Some(vec![PathItem::object(input, mismatch.key, value)]),
            ..IssueInfo::default()
        };
        schema.report(&mut dataset, "type", config, info);
        dataset
    }

    fn discriminates(candidate: &Candidate<'_>, input: &Value, probe: &Config, mismatch: &mut Mismatch) -> bool {
        for (priority, key) in candidate.keys.iter().enumerate() {
            let entry = candidate.object.entry(key);
            let matched = match (input.get(key), entry) {
                (_, None) => false,
                (Some(value), Some(entry)) => !entry.run(value.clone(), probe).has_issues(),
                (None, Some(entry)) => entry.accepts_absent(),
            };
            if !matched {
                mismatch.record(input, key, priority, entry.map(Schema::expects));
                return false;
            }
        }
        true
    }

    async fn discriminates_async(
        candidate: &Candidate<'_>,
        input: &Value,
        probe: &Config,
        mismatch: &mut Mismatch,
    ) -> bool {
        for (priority, key) in candidate.keys.iter().enumerate() {
            let entry = candidate.object.entry(key);
            let matched = match (input.get(key), entry) {
                (_, None) => false,
                (Some(value), Some(entry)) => {
                    !entry.run_async(value.clone(), probe).await.has_issues()
                }
                (None, Some(entry)) => entry.accepts_absent(),
            };
            if !matched {
                mismatch.record(input, key, priority, entry.map(Schema::expects));
                return false;
            }
        }
        true
    }

    pub(crate) fn run(&self, schema: &Schema, input: Value, config: &Config) -> Dataset {
        if input.as_object().is_none() {
            return schema.type_issue(input, config);
        }
        let attempt_config = config.deferring();
        let probe = Config::clone(&attempt_config).with_abort_early(true);
        let mut mismatch = Mismatch::new(&self.key);
        let mut output: Option<Dataset> = None;

        for candidate in self.flatten() {
            if Self::discriminates(&candidate, &input, &probe, &mut mismatch) {
                trace!("variant option {} selected", candidate.schema.schema_type());
                let option = candidate.schema.run(input.clone(), &attempt_config);
                output = prefer(output, option);
            }
            if output.as_ref().is_some_and(|dataset| !dataset.has_issues()) {
                break;
            }
        }

        match output {
            Some(dataset) => surface(dataset, config),
            None => self.unmatched(schema, input, mismatch, config),
        }
    }

    pub(crate) async fn run_async(&self, schema: &Schema, input: Value, config: &Config) -> Dataset {
        if input.as_object().is_none() {
            return schema.type_issue(input, config);
        }
        let attempt_config = config.deferring();
        let probe = Config::clone(&attempt_config).with_abort_early(true);
        let mut mismatch = Mismatch::new(&self.key);
        let mut output: Option<Dataset> = None;

        for candidate in self.flatten() {
            if Self::discriminates_async(&candidate, &input, &probe, &mut mismatch).await {
                trace!("variant option {} selected", candidate.schema.schema_type());
                let option = candidate.schema.run_async(input.clone(), &attempt_config).await;
                output = prefer(output, option);
            }
            if output.as_ref().is_some_and(|dataset| !dataset.has_issues()) {
                break;
            }
        }

        match output {
            Some(dataset) => surface(dataset, config),
            None => self.unmatched(schema, input, mismatch, config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{boolean, literal, min_length, number, object, optional, string};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sift_core::{IssueKind, Message};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(calls: &Arc<AtomicUsize>) -> Message {
        let calls = calls.clone();
        Message::resolver(move |issue: &Issue| {
            calls.fetch_add(1, Ordering::SeqCst);
            format!("not a {}", issue.expected.as_deref().unwrap_or("?"))
        })
    }

    fn run(schema: &Schema, input: serde_json::Value) -> Dataset {
        schema.run(Value::from(input), &Config::new())
    }

    #[test]
    fn test_union_first_success_wins() {
        let schema = union([string(), number()]);
        assert!(run(&schema, json!("x")).is_success());
        assert!(run(&schema, json!(1)).is_success());
    }

    #[test]
    fn test_union_aggregates_option_issues() {
        let schema = union([string(), number()]);
        let dataset = run(&schema, json!(true));
        let issues = dataset.issues.expect("issues");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, "union");
        assert_eq!(issues[0].kind, IssueKind::Schema);
        assert_eq!(
            issues[0].message,
            "Invalid type: Expected (string | number) but received true"
        );
        assert_eq!(issues[0].issues.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_union_keeps_typed_output() {
        let schema = union([string().pipe([min_length(5)]), number()]);
        let dataset = run(&schema, json!("abc"));
        assert!(!dataset.typed);
        assert_eq!(dataset.value, Value::from("abc"));
        let nested = dataset.issues.expect("issue")[0].issues.clone().expect("nested");
        assert_eq!(nested[0].issue_type, "min_length");
        assert_eq!(nested[1].issue_type, "number");
    }

    #[test]
    fn test_union_renders_messages_only_on_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let schema = union([string().message(counting(&calls)), number()]);

        assert!(run(&schema, json!(1)).is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let dataset = run(&schema, json!(true));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let nested = dataset.issues.expect("issue")[0].issues.clone().expect("nested");
        assert_eq!(nested[0].message, "not a string");
        assert!(!nested[0].has_pending_message());
    }

    fn shapes() -> Schema {
        variant(
            "kind",
            [
                object([("kind", literal("circle")), ("radius", number())]),
                object([("kind", literal("square")), ("side", number())]),
            ],
        )
    }

    #[test]
    fn test_variant_dispatch() {
        assert!(run(&shapes(), json!({"kind": "circle", "radius": 1})).is_success());

        let dataset = run(&shapes(), json!({"kind": "square", "side": "x"}));
        let issues = dataset.issues.expect("issues");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].dot_path().as_deref(), Some("side"));
    }

    #[test]
    fn test_variant_unknown_discriminator() {
        let dataset = run(&shapes(), json!({"kind": "star"}));
        let issue = &dataset.issues.expect("issue")[0];
        assert_eq!(issue.issue_type, "variant");
        assert_eq!(issue.input, Value::from("star"));
        assert_eq!(issue.expected.as_deref(), Some("(\"circle\" | \"square\")"));
        assert_eq!(issue.dot_path().as_deref(), Some("kind"));

        let dataset = run(&shapes(), json!({}));
        let issue = &dataset.issues.expect("issue")[0];
        assert_eq!(issue.input, Value::Undefined);
        assert_eq!(
            issue.message,
            "Invalid type: Expected (\"circle\" | \"square\") but received undefined"
        );
    }

    #[test]
    fn test_variant_renders_only_kept_messages() {
        let calls = Arc::new(AtomicUsize::new(0));
        let schema = variant(
            "kind",
            [
                object([
                    ("kind", literal("circle").message(counting(&calls))),
                    ("radius", number().message(counting(&calls))),
                ]),
                object([("kind", literal("square")), ("side", number())]),
            ],
        );

        assert!(run(&schema, json!({"kind": "square", "side": 2})).is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let dataset = run(&schema, json!({"kind": "circle", "radius": "x"}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(dataset.issues.expect("issue")[0].message, "not a number");
    }

    #[test]
    fn test_variant_rejects_non_object() {
        let dataset = run(&shapes(), json!([1]));
        let issue = &dataset.issues.expect("issue")[0];
        assert_eq!(issue.expected.as_deref(), Some("Object"));
        assert_eq!(issue.path, None);
    }

    #[test]
    fn test_nested_variant() {
        let schema = variant(
            "kind",
            [
                variant(
                    "shape",
                    [
                        object([("kind", literal("fixed")), ("shape", literal("dot"))]),
                        object([
                            ("kind", literal("fixed")),
                            ("shape", literal("line")),
                            ("length", number()),
                        ]),
                    ],
                ),
                object([("kind", literal("free")), ("closed", optional(boolean()))]),
            ],
        );
        assert!(run(&schema, json!({"kind": "fixed", "shape": "dot"})).is_success());
        assert!(run(&schema, json!({"kind": "free"})).is_success());

        let dataset = run(&schema, json!({"kind": "fixed", "shape": "blob"}));
        let issue = &dataset.issues.expect("issue")[0];
        assert_eq!(issue.dot_path().as_deref(), Some("shape"));
        assert_eq!(issue.expected.as_deref(), Some("(\"dot\" | \"line\")"));
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let config = Config::new();
        for input in [
            json!({"kind": "circle", "radius": 1}),
            json!({"kind": "star"}),
            json!("x"),
        ] {
            let input = Value::from(input);
            assert_eq!(
                shapes().run_async(input.clone(), &config).await,
                shapes().run(input.clone(), &config)
            );
            let schema = union([string(), number()]);
            assert_eq!(
                schema.run_async(input.clone(), &config).await,
                schema.run(input, &config)
            );
        }
    }
}
