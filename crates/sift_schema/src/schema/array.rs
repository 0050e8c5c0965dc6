//! Array and tuple schemas.

use super::{Schema, SchemaKind};
use sift_core::{Config, Dataset, IssueInfo, PathItem, Value};

/// Accepts arrays whose every element matches `item`.
pub fn array(item: Schema) -> Schema {
    Schema::new(SchemaKind::Array(item))
}

/// Accepts arrays with at least one element, every element matching `item`.
///
/// Expressed as a tuple with one fixed slot and `item` as rest, so an empty
/// array fails on its missing first element.
pub fn non_empty_array(item: Schema) -> Schema {
    tuple_with_rest([item.clone()], item)
}

/// Handling of elements beyond the fixed slots of a tuple.
#[derive(Debug, Clone)]
pub enum TupleMode {
    /// Extra elements are a schema issue
    Strict,
    /// Extra elements are copied to the output
    Loose,
    /// Extra elements are validated against the rest schema
    Rest(Schema),
}

impl TupleMode {
    /// Returns the schema type for this mode.
    pub fn type_name(&self) -> &'static str {
        match self {
            TupleMode::Strict => "tuple",
            TupleMode::Loose => "loose_tuple",
            TupleMode::Rest(_) => "tuple_with_rest",
        }
    }
}

/// Fixed slots plus the extra-element mode.
#[derive(Debug, Clone)]
pub struct TupleSchema {
    /// Schemas of the fixed slots
    pub items: Vec<Schema>,

    /// Handling of extra elements
    pub mode: TupleMode,
}

/// Accepts arrays matching `items` position by position, with no extra
/// elements.
pub fn tuple(items: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::new(SchemaKind::Tuple(TupleSchema {
        items: items.into_iter().collect(),
        mode: TupleMode::Strict,
    }))
}

/// Like [`tuple`], keeping extra elements unvalidated.
pub fn loose_tuple(items: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::new(SchemaKind::Tuple(TupleSchema {
        items: items.into_iter().collect(),
        mode: TupleMode::Loose,
    }))
}

/// Like [`tuple`], validating extra elements against `rest`.
pub fn tuple_with_rest(items: impl IntoIterator<Item = Schema>, rest: Schema) -> Schema {
    Schema::new(SchemaKind::Tuple(TupleSchema {
        items: items.into_iter().collect(),
        mode: TupleMode::Rest(rest),
    }))
}

/// Merges the result of one element into the array being built.
///
/// Returns true if the run must stop.
fn merge_item(
    dataset: &mut Dataset,
    output: &mut Vec<Value>,
    input: &Value,
    index: usize,
    child: Dataset,
    config: &Config,
) -> bool {
    if let Some(issues) = child.issues {
        let value = element(input, index);
        dataset.merge_issues(&PathItem::array(input.clone(), index, value), issues);
        if config.is_abort_early() {
            dataset.typed = false;
            return true;
        }
    }
    if !child.typed {
        dataset.typed = false;
    }
    output.push(child.value);
    false
}

/// Returns the element at `index`, `undefined` past the end.
fn element(input: &Value, index: usize) -> Value {
    input
        .as_array()
        .and_then(|items| items.get(index))
        .cloned()
        .unwrap_or_default()
}

pub(crate) fn run_array(schema: &Schema, item: &Schema, input: Value, config: &Config) -> Dataset {
    let Some(items) = input.as_array() else {
        return schema.type_issue(input, config);
    };
    let mut dataset = Dataset::success(Value::Undefined);
    let mut output = Vec::with_capacity(items.len());
    for (index, value) in items.iter().enumerate() {
        let child = item.run(value.clone(), config);
        if merge_item(&mut dataset, &mut output, &input, index, child, config) {
            break;
        }
    }
    dataset.value = Value::Array(output);
    dataset
}

pub(crate) async fn run_array_async(
    schema: &Schema,
    item: &Schema,
    input: Value,
    config: &Config,
) -> Dataset {
    let Some(items) = input.as_array() else {
        return schema.type_issue(input, config);
    };
    let mut dataset = Dataset::success(Value::Undefined);
    let mut output = Vec::with_capacity(items.len());
    for (index, value) in items.iter().enumerate() {
        let child = item.run_async(value.clone(), config).await;
        if merge_item(&mut dataset, &mut output, &input, index, child, config) {
            break;
        }
    }
    dataset.value = Value::Array(output);
    dataset
}

impl TupleSchema {
    pub(crate) fn is_async(&self) -> bool {
        self.items.iter().any(Schema::is_async)
            || matches!(&self.mode, TupleMode::Rest(rest) if rest.is_async())
    }

    fn reject_extra(&self, schema: &Schema, dataset: &mut Dataset, input: &Value, config: &Config) {
        let index = self.items.len();
        let value = element(input, index);
        let info = IssueInfo {
            input: Some(value.clone()),
            expected: Some("never".to_string()),
            path: Some(vec![PathItem::array(input.clone(), index, value)]),
            ..IssueInfo::default()
        };
        schema.report(dataset, "type", config, info);
    }

    pub(crate) fn run(&self, schema: &Schema, input: Value, config: &Config) -> Dataset {
        let Some(elements) = input.as_array() else {
            return schema.type_issue(input, config);
        };
        let mut dataset = Dataset::success(Value::Undefined);
        let mut output = Vec::with_capacity(elements.len().max(self.items.len()));
        let mut stopped = false;

        for (index, item) in self.items.iter().enumerate() {
            let child = item.run(element(&input, index), config);
            if merge_item(&mut dataset, &mut output, &input, index, child, config) {
                stopped = true;
                break;
            }
        }

        let extra = elements.len() > self.items.len();
        if !stopped && extra && !(dataset.has_issues() && config.is_abort_early()) {
            match &self.mode {
                TupleMode::Strict => self.reject_extra(schema, &mut dataset, &input, config),
                TupleMode::Loose => output.extend_from_slice(&elements[self.items.len()..]),
                TupleMode::Rest(rest) => {
                    for (index, value) in elements.iter().enumerate().skip(self.items.len()) {
                        let child = rest.run(value.clone(), config);
                        if merge_item(&mut dataset, &mut output, &input, index, child, config) {
                            break;
                        }
                    }
                }
            }
        }

        dataset.value = Value::Array(output);
        dataset
    }

    pub(crate) async fn run_async(&self, schema: &Schema, input: Value, config: &Config) -> Dataset {
        let Some(elements) = input.as_array() else {
            return schema.type_issue(input, config);
        };
        let mut dataset = Dataset::success(Value::Undefined);
        let mut output = Vec::with_capacity(elements.len().max(self.items.len()));
        let mut stopped = false;

        for (index, item) in self.items.iter().enumerate() {
            let child = item.run_async(element(&input, index), config).await;
            if merge_item(&mut dataset, &mut output, &input, index, child, config) {
                stopped = true;
                break;
            }
        }

        let extra = elements.len() > self.items.len();
        if !stopped && extra && !(dataset.has_issues() && config.is_abort_early()) {
            match &self.mode {
                TupleMode::Strict => self.reject_extra(schema, &mut dataset, &input, config),
                TupleMode::Loose => output.extend_from_slice(&elements[self.items.len()..]),
                TupleMode::Rest(rest) => {
                    for (index, value) in elements.iter().enumerate().skip(self.items.len()) {
                        let child = rest.run_async(value.clone(), config).await;
                        if merge_item(&mut dataset, &mut output, &input, index, child, config) {
                            break;
                        }
                    }
                }
            }
        }

        dataset.value = Value::Array(output);
        dataset
    }
}
