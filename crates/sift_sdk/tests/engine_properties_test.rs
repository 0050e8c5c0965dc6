//! End-to-end checks of the engine's guarantees through the public API.

use pretty_assertions::assert_eq;
use serde_json::json;
use sift_sdk::prelude::*;
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn json(value: serde_json::Value) -> Value {
    Value::from(value)
}

#[test]
fn test_success_implies_typed() {
    init_tracing();
    let schemas = [
        string(),
        array(number()),
        object([("a", optional(string()))]),
        union([string(), number()]),
        tuple([boolean(), nullable(number())]),
    ];
    let inputs = [
        json(json!("x")),
        json(json!([1, 2])),
        json(json!({})),
        json(json!(3)),
        json(json!([true, null])),
        json(json!({"a": 1})),
    ];
    for schema in &schemas {
        for input in &inputs {
            let dataset = schema.run(input.clone(), &Config::new());
            if dataset.issues.is_none() {
                assert!(dataset.typed, "{schema:?} on {input}");
            }
        }
    }
}

#[test]
fn test_transformation_free_runs_are_idempotent() {
    init_tracing();
    let schema = object([
        ("name", string().pipe([min_length(1)])),
        ("scores", array(number())),
        ("meta", record(string(), boolean())),
    ]);
    let input = json(json!({"name": "Ada", "scores": [1, 2], "meta": {"x": true}, "drop": 1}));

    let first = schema.run(input, &Config::new());
    assert!(first.is_success());
    let second = schema.run(first.value.clone(), &Config::new());
    assert_eq!(second, first);
}

#[test]
fn test_object_entry_path() {
    init_tracing();
    let schema = object([("age", number())]);
    let input = json(json!({"age": "x"}));
    let result = safe_parse(&schema, input.clone(), None);

    let issues = result.issues.expect("issues");
    assert_eq!(issues.len(), 1);
    let path = issues[0].path.clone().expect("path");
    assert_eq!(path.len(), 1);
    assert_eq!(path[0], PathItem::object(input, "age", Value::from("x")));
    assert_eq!(path[0].origin, PathOrigin::Value);
}

#[test]
fn test_union_fallback_issue() {
    init_tracing();
    let result = safe_parse(&union([string(), number()]), Value::from(true), None);
    let issues = result.issues.expect("issues");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].issue_type, "union");
    assert_eq!(issues[0].issues.as_ref().map(Vec::len), Some(2));
}

#[test]
fn test_abort_early_across_fields() {
    init_tracing();
    let schema = object([("a", string()), ("b", string())]);
    let input = json(json!({"a": 1, "b": 2}));

    let all = safe_parse(&schema, input.clone(), None);
    assert_eq!(all.issues.map(|issues| issues.len()), Some(2));

    let config = Config::new().with_abort_early(true);
    let first = safe_parse(&schema, input, Some(&config));
    assert_eq!(first.issues.map(|issues| issues.len()), Some(1));
}

#[test]
fn test_object_modes() {
    init_tracing();
    let input = json(json!({"a": "x", "b": 1}));

    let strict = safe_parse(&strict_object([("a", string())]), input.clone(), None);
    let issue = &strict.issues.expect("issues")[0];
    assert_eq!(issue.kind, IssueKind::Schema);
    assert_eq!(issue.input, Value::from("b"));
    assert_eq!(issue.dot_path().as_deref(), Some("b"));

    let loose = safe_parse(&loose_object([("a", string())]), input.clone(), None);
    assert!(loose.success);
    assert_eq!(loose.output, input);

    let plain = safe_parse(&object([("a", string())]), input, None);
    assert!(plain.success);
    assert_eq!(plain.output, json(json!({"a": "x"})));
}

#[test]
fn test_message_precedence() {
    init_tracing();
    let registry = Arc::new(MessageRegistry::new());
    registry.set_global_message("global en", Some("en"));
    registry.set_specific_message("min_length", "specific en", Some("en"));
    let engine = Engine::new()
        .with_registry(registry.clone())
        .with_defaults(Config::new().with_lang("en"));

    let call_site = string().pipe([min_length(3).message("call site")]);
    let plain = string().pipe([min_length(3)]);
    let input = Value::from("ab");

    let message = |schema: &Schema| {
        engine
            .safe_parse(schema, input.clone(), None)
            .issues
            .expect("issues")[0]
            .message
            .clone()
    };

    assert_eq!(message(&call_site), "call site");
    assert_eq!(message(&plain), "specific en");

    registry.delete_specific_message("min_length", Some("en"));
    assert_eq!(message(&plain), "global en");

    registry.delete_global_message(Some("en"));
    assert_eq!(message(&plain), "Invalid length: Expected >=3 but received 2");
}

#[test]
fn test_schema_message_between_instance_and_global() {
    init_tracing();
    let registry = Arc::new(MessageRegistry::new());
    registry.set_global_message("global", None);
    registry.set_schema_message("schema", None);
    let engine = Engine::new().with_registry(registry);

    let type_issue = engine.safe_parse(&number(), Value::from("x"), None);
    assert_eq!(type_issue.issues.expect("issues")[0].message, "schema");

    let pipe_issue = engine.safe_parse(&number().pipe([integer()]), Value::from(1.5), None);
    assert_eq!(pipe_issue.issues.expect("issues")[0].message, "global");

    let instance = engine.safe_parse(&number().message("instance"), Value::from("x"), None);
    assert_eq!(instance.issues.expect("issues")[0].message, "instance");
}

#[test]
fn test_message_resolver_sees_issue() {
    init_tracing();
    let schema = number().message(Message::resolver(|issue: &Issue| {
        format!("{} is not a {}", issue.received, issue.expected.as_deref().unwrap_or("?"))
    }));
    let result = safe_parse(&schema, Value::from("7"), None);
    assert_eq!(result.issues.expect("issues")[0].message, "\"7\" is not a number");
}

#[tokio::test]
async fn test_async_runs_in_declared_order() {
    init_tracing();
    let schema = string().pipe([
        transform_async(|value| async move {
            Value::from(format!("{}-a", value.as_str().unwrap_or_default()))
        }),
        transform(|value| Value::from(format!("{}-b", value.as_str().unwrap_or_default()))),
        check_async(|value| async move { value.as_str().is_some_and(|text| text.ends_with("-a-b")) }),
    ]);

    let output = parse_async(&schema, Value::from("x"), None).await.expect("valid");
    assert_eq!(output, Value::from("x-a-b"));
}

#[tokio::test]
async fn test_async_containers_match_sync() {
    init_tracing();
    let schema = object([
        ("tags", set(string())),
        ("limits", map(string(), number().pipe([min_value(0)]))),
        ("shape", intersect([loose_object([("w", number())]), object([("h", number())])])),
    ]);
    let input = {
        let mut object = Object::new();
        object.insert("tags", Value::Set(vec![Value::from("a"), Value::from(1)]));
        object.insert(
            "limits",
            Value::Map(vec![(Value::from("rows"), Value::from(-1))]),
        );
        object.insert("shape", json(json!({"w": 1, "h": "x"})));
        Value::Object(object)
    };

    let sync = safe_parse(&schema, input.clone(), None);
    let async_result = safe_parse_async(&schema, input, None).await;
    assert_eq!(async_result, sync);
    assert_eq!(sync.issues.map(|issues| issues.len()), Some(3));
}

#[test]
#[should_panic(expected = "asynchronous")]
fn test_async_item_in_sync_run_panics() {
    let schema = string().pipe([check_async(|_| async { true })]);
    let _ = safe_parse(&schema, Value::from("x"), None);
}
