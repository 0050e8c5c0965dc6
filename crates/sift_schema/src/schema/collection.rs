//! Record, map and set schemas.
//!
//! Records are objects with arbitrary keys; maps and sets keep their input
//! order. Path items record whether a key or a value was at fault.

use super::{Schema, SchemaKind, is_valid_key};
use sift_core::{Config, Dataset, Object, PathItem, PathOrigin, Value};

/// Key and value schemas of a record or map.
#[derive(Debug, Clone)]
pub struct EntrySchemas {
    /// Schema every key must match
    pub key: Schema,

    /// Schema every value must match
    pub value: Schema,
}

/// Accepts objects whose keys match `key` and values match `value`.
pub fn record(key: Schema, value: Schema) -> Schema {
    Schema::new(SchemaKind::Record(EntrySchemas { key, value }))
}

/// Accepts maps whose keys match `key` and values match `value`.
pub fn map(key: Schema, value: Schema) -> Schema {
    Schema::new(SchemaKind::Map(EntrySchemas { key, value }))
}

/// Accepts sets whose members match `value`.
pub fn set(value: Schema) -> Schema {
    Schema::new(SchemaKind::Set(value))
}

/// Merges child issues under the path item built by `item`. Returns true if
/// the run must stop.
fn absorb<F>(dataset: &mut Dataset, child: &mut Dataset, item: F, config: &Config) -> bool
where
    F: FnOnce() -> PathItem,
{
    match child.issues.take() {
        Some(issues) => {
            dataset.merge_issues(&item(), issues);
            if config.is_abort_early() {
                dataset.typed = false;
                return true;
            }
            false
        }
        None => false,
    }
}

/// Output key of a record entry: the validated key if it is still a
/// string, the input key otherwise. `None` if the key failed validation or
/// is forbidden.
fn record_key(key: &str, key_dataset: &Dataset) -> Option<String> {
    if !key_dataset.typed {
        return None;
    }
    let key = key_dataset.value.as_str().unwrap_or(key);
    is_valid_key(key).then(|| key.to_string())
}

pub(crate) fn run_record(
    schema: &Schema,
    entry: &EntrySchemas,
    input: Value,
    config: &Config,
) -> Dataset {
    let Some(object) = input.as_object() else {
        return schema.type_issue(input, config);
    };
    let mut dataset = Dataset::success(Value::Undefined);
    let mut output = Object::with_capacity(object.len());

    for (key, value) in object.iter().filter(|(key, _)| is_valid_key(key)) {
        let mut key_dataset = entry.key.run(Value::from(key), config);
        let item = || PathItem::object_key(input.clone(), key, value.clone());
        if absorb(&mut dataset, &mut key_dataset, item, config) {
            break;
        }
        let mut value_dataset = entry.value.run(value.clone(), config);
        let item = || PathItem::object(input.clone(), key, value.clone());
        if absorb(&mut dataset, &mut value_dataset, item, config) {
            break;
        }
        if !key_dataset.typed || !value_dataset.typed {
            dataset.typed = false;
        }
        if let Some(key) = record_key(key, &key_dataset) {
            output.insert(key, value_dataset.value);
        }
    }

    dataset.value = Value::Object(output);
    dataset
}

pub(crate) async fn run_record_async(
    schema: &Schema,
    entry: &EntrySchemas,
    input: Value,
    config: &Config,
) -> Dataset {
    let Some(object) = input.as_object() else {
        return schema.type_issue(input, config);
    };
    let mut dataset = Dataset::success(Value::Undefined);
    let mut output = Object::with_capacity(object.len());

    for (key, value) in object.iter().filter(|(key, _)| is_valid_key(key)) {
        let mut key_dataset = entry.key.run_async(Value::from(key), config).await;
        let item = || PathItem::object_key(input.clone(), key, value.clone());
        if absorb(&mut dataset, &mut key_dataset, item, config) {
            break;
        }
        let mut value_dataset = entry.value.run_async(value.clone(), config).await;
        let item = || PathItem::object(input.clone(), key, value.clone());
        if absorb(&mut dataset, &mut value_dataset, item, config) {
            break;
        }
        if !key_dataset.typed || !value_dataset.typed {
            dataset.typed = false;
        }
        if let Some(key) = record_key(key, &key_dataset) {
            output.insert(key, value_dataset.value);
        }
    }

    dataset.value = Value::Object(output);
    dataset
}

pub(crate) fn run_map(schema: &Schema, entry: &EntrySchemas, input: Value, config: &Config) -> Dataset {
    let Value::Map(entries) = &input else {
        return schema.type_issue(input, config);
    };
    let mut dataset = Dataset::success(Value::Undefined);
    let mut output = Vec::with_capacity(entries.len());

    for (key, value) in entries {
        let mut key_dataset = entry.key.run(key.clone(), config);
        let item = || PathItem::map(input.clone(), PathOrigin::Key, key.clone(), value.clone());
        if absorb(&mut dataset, &mut key_dataset, item, config) {
            break;
        }
        let mut value_dataset = entry.value.run(value.clone(), config);
        let item = || PathItem::map(input.clone(), PathOrigin::Value, key.clone(), value.clone());
        if absorb(&mut dataset, &mut value_dataset, item, config) {
            break;
        }
        if !key_dataset.typed || !value_dataset.typed {
            dataset.typed = false;
        }
        output.push((key_dataset.value, value_dataset.value));
    }

    dataset.value = Value::Map(output);
    dataset
}

pub(crate) async fn run_map_async(
    schema: &Schema,
    entry: &EntrySchemas,
    input: Value,
    config: &Config,
) -> Dataset {
    let Value::Map(entries) = &input else {
        return schema.type_issue(input, config);
    };
    let mut dataset = Dataset::success(Value::Undefined);
    let mut output = Vec::with_capacity(entries.len());

    for (key, value) in entries {
        let mut key_dataset = entry.key.run_async(key.clone(), config).await;
        let item = || PathItem::map(input.clone(), PathOrigin::Key, key.clone(), value.clone());
        if absorb(&mut dataset, &mut key_dataset, item, config) {
            break;
        }
        let mut value_dataset = entry.value.run_async(value.clone(), config).await;
        let item = || PathItem::map(input.clone(), PathOrigin::Value, key.clone(), value.clone());
        if absorb(&mut dataset, &mut value_dataset, item, config) {
            break;
        }
        if !key_dataset.typed || !value_dataset.typed {
            dataset.typed = false;
        }
        output.push((key_dataset.value, value_dataset.value));
    }

    dataset.value = Value::Map(output);
    dataset
}

fn insert_member(output: &mut Vec<Value>, member: Value) {
    if !output.contains(&member) {
        output.push(member);
    }
}

pub(crate) fn run_set(schema: &Schema, member: &Schema, input: Value, config: &Config) -> Dataset {
    let Value::Set(members) = &input else {
        return schema.type_issue(input, config);
    };
    let mut dataset = Dataset::success(Value::Undefined);
    let mut output = Vec::with_capacity(members.len());

    for (position, value) in members.iter().enumerate() {
        let mut child = member.run(value.clone(), config);
        let item = || PathItem::set(input.clone(), position, value.clone());
        if absorb(&mut dataset, &mut child, item, config) {
            break;
        }
        if !child.typed {
            dataset.typed = false;
        }
        insert_member(&mut output, child.value);
    }

    dataset.value = Value::Set(output);
    dataset
}

pub(crate) async fn run_set_async(
    schema: &Schema,
    member: &Schema,
    input: Value,
    config: &Config,
) -> Dataset {
    let Value::Set(members) = &input else {
        return schema.type_issue(input, config);
    };
    let mut dataset = Dataset::success(Value::Undefined);
    let mut output = Vec::with_capacity(members.len());

    for (position, value) in members.iter().enumerate() {
        let mut child = member.run_async(value.clone(), config).await;
        let item = || PathItem::set(input.clone(), position, value.clone());
        if absorb(&mut dataset, &mut child, item, config) {
            break;
        }
        if !child.typed {
            dataset.typed = false;
        }
        insert_member(&mut output, child.value);
    }

    dataset.value = Value::Set(output);
    dataset
}
