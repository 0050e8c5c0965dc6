//! Intersections.

use super::{Schema, SchemaKind};
use sift_core::{Config, Dataset, IssueInfo, Object, Value};

/// Accepts values matching every option.
///
/// Object outputs are merged key by key, later options overriding earlier
/// ones on conflicting non-object values. For any other output the last
/// option's value is kept.
pub fn intersect(options: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::new(SchemaKind::Intersect(options.into_iter().collect()))
}

/// Merges two option outputs.
pub fn merge_outputs(first: Value, second: Value) -> Value {
    match (first, second) {
        (Value::Object(first), Value::Object(second)) => Value::Object(merge_objects(first, second)),
        (_, second) => second,
    }
}

fn merge_objects(mut first: Object, second: Object) -> Object {
    for (key, value) in second {
        let merged = match first.get(&key) {
            Some(existing) => merge_outputs(existing.clone(), value),
            None => value,
        };
        first.insert(key, merged);
    }
    first
}

/// Folds one option's result into the intersection.
///
/// Returns true if the run must stop.
fn absorb(dataset: &mut Dataset, outputs: &mut Vec<Value>, child: Dataset, config: &Config) -> bool {
    if let Some(issues) = child.issues {
        for issue in issues {
            dataset.push_issue(issue);
        }
        if config.is_abort_early() {
            dataset.typed = false;
            return true;
        }
    }
    if !child.typed {
        dataset.typed = false;
    }
    outputs.push(child.value);
    false
}

fn settle(mut dataset: Dataset, outputs: Vec<Value>) -> Dataset {
    if dataset.typed {
        if let Some(merged) = outputs.into_iter().reduce(merge_outputs) {
            dataset.value = merged;
        }
    }
    dataset
}

fn no_options(schema: &Schema, input: Value, config: &Config) -> Dataset {
    let mut dataset = Dataset::untyped(input);
    schema.report(&mut dataset, "type", config, IssueInfo::default());
    dataset
}

pub(crate) fn run_intersect(schema: &Schema, options: &[Schema], input: Value, config: &Config) -> Dataset {
    if options.is_empty() {
        return no_options(schema, input, config);
    }
    let mut dataset = Dataset::success(input.clone());
    let mut outputs = Vec::with_capacity(options.len());
    for option in options {
        let child = option.run(input.clone(), config);
        if absorb(&mut dataset, &mut outputs, child, config) {
            break;
        }
    }
    settle(dataset, outputs)
}

pub(crate) async fn run_intersect_async(
    schema: &Schema,
    options: &[Schema],
    input: Value,
    config: &Config,
) -> Dataset {
    if options.is_empty() {
        return no_options(schema, input, config);
    }
    let mut dataset = Dataset::success(input.clone());
    let mut outputs = Vec::with_capacity(options.len());
    for option in options {
        let child = option.run_async(input.clone(), config).await;
        if absorb(&mut dataset, &mut outputs, child, config) {
            break;
        }
    }
    settle(dataset, outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{loose_object, max_value, min_value, number, object, string, transform};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(schema: &Schema, input: serde_json::Value) -> Dataset {
        schema.run(Value::from(input), &Config::new())
    }

    #[test]
    fn test_object_outputs_are_merged() {
        let schema = intersect([
            object([("name", string())]),
            object([("age", number())]),
        ]);
        let dataset = run(&schema, json!({"name": "Ada", "age": 36, "extra": true}));
        assert!(dataset.is_success());
        assert_eq!(dataset.value, Value::from(json!({"name": "Ada", "age": 36})));
    }

    #[test]
    fn test_later_options_override() {
        let schema = intersect([
            loose_object([("n", number())]),
            object([(
                "n",
                number().pipe([transform(|value| {
                    Value::from(value.as_f64().unwrap_or_default() * 2.0)
                })]),
            )]),
        ]);
        let dataset = run(&schema, json!({"n": 2, "keep": 1}));
        assert_eq!(dataset.value, Value::from(json!({"n": 4, "keep": 1})));
    }

    #[test]
    fn test_all_issues_surface() {
        let schema = intersect([
            number().pipe([min_value(10)]),
            number().pipe([max_value(0)]),
        ]);
        let dataset = run(&schema, json!(5));
        assert_eq!(dataset.issue_count(), 2);
        assert!(dataset.typed);

        let dataset = schema.run(Value::from(5), &Config::new().with_abort_early(true));
        assert_eq!(dataset.issue_count(), 1);
        assert!(!dataset.typed);
    }

    #[test]
    fn test_untyped_option() {
        let schema = intersect([string(), number()]);
        let dataset = run(&schema, json!("x"));
        assert!(!dataset.typed);
        assert_eq!(dataset.issues.expect("issue")[0].issue_type, "number");
        assert_eq!(schema.expects(), "(string & number)");
    }

    #[test]
    fn test_empty_intersect() {
        let dataset = run(&intersect(Vec::new()), json!(1));
        let issue = &dataset.issues.expect("issue")[0];
        assert_eq!(issue.issue_type, "intersect");
        assert_eq!(issue.expected.as_deref(), Some("never"));
    }
}
