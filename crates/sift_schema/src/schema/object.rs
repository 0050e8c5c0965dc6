//! Object schemas.
//!
//! Declared entries are validated in declaration order. What happens to keys
//! that are not declared depends on the [`ObjectMode`]. Keys that could
//! pollute a prototype (`__proto__`, `prototype`, `constructor`) are never
//! copied from the input into an output object.

use super::{Schema, SchemaKind};
use sift_core::{Config, Dataset, IssueInfo, Object, PathItem, Value};

/// Keys never treated as data keys.
pub const FORBIDDEN_KEYS: [&str; 3] = ["__proto__", "prototype", "constructor"];

/// Returns true if `key` may be copied from an input into an output object.
pub fn is_valid_key(key: &str) -> bool {
    !FORBIDDEN_KEYS.contains(&key)
}

/// Handling of keys that are not declared as entries.
#[derive(Debug, Clone)]
pub enum ObjectMode {
    /// Unknown keys are dropped
    Plain,
    /// Unknown keys are copied to the output
    Loose,
    /// Every unknown key is a schema issue
    Strict,
    /// Unknown keys are validated against the rest schema
    Rest(Schema),
}

impl ObjectMode {
    /// Returns the schema type for this mode.
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectMode::Plain => "object",
            ObjectMode::Loose => "loose_object",
            ObjectMode::Strict => "strict_object",
            ObjectMode::Rest(_) => "object_with_rest",
        }
    }
}

/// Declared entries plus the unknown-key mode.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    /// Declared entries, in declaration order
    pub entries: Vec<(String, Schema)>,

    /// Handling of undeclared keys
    pub mode: ObjectMode,
}

/// What to do with one declared entry.
enum Slot {
    /// Run the entry schema on this value
    Run(Value),
    /// Insert the entry's fallback without running it
    Fallback(Value),
    /// The entry is required but absent
    Missing,
    /// The entry is optional and absent
    Skip,
}

fn build<K: Into<String>>(entries: impl IntoIterator<Item = (K, Schema)>, mode: ObjectMode) -> Schema {
    Schema::new(SchemaKind::Object(ObjectSchema {
        entries: entries
            .into_iter()
            .map(|(key, schema)| (key.into(), schema))
            .collect(),
        mode,
    }))
}

/// Validates declared entries and drops unknown keys.
pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Schema)>) -> Schema {
    build(entries, ObjectMode::Plain)
}

/// Validates declared entries and keeps unknown keys.
pub fn loose_object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Schema)>) -> Schema {
    build(entries, ObjectMode::Loose)
}

/// Validates declared entries and rejects unknown keys.
pub fn strict_object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Schema)>) -> Schema {
    build(entries, ObjectMode::Strict)
}

/// Validates declared entries and every unknown key against `rest`.
pub fn object_with_rest<K: Into<String>>(
    entries: impl IntoIterator<Item = (K, Schema)>,
    rest: Schema,
) -> Schema {
    build(entries, ObjectMode::Rest(rest))
}

impl ObjectSchema {
    /// Returns the schema of a declared entry.
    pub fn entry(&self, key: &str) -> Option<&Schema> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, schema)| schema)
    }

    fn is_declared(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    pub(crate) fn is_async(&self) -> bool {
        self.entries.iter().any(|(_, schema)| schema.is_async())
            || matches!(&self.mode, ObjectMode::Rest(rest) if rest.is_async())
    }

    fn slot(object: &Object, key: &str, entry: &Schema) -> Slot {
        if let Some(value) = object.get(key) {
            return Slot::Run(value.clone());
        }
        if let Some(default) = entry.absent_default() {
            return Slot::Run(default);
        }
        if let Some(fallback) = entry.fallback() {
            return Slot::Fallback(fallback.clone());
        }
        if entry.accepts_absent() {
            Slot::Skip
        } else {
            Slot::Missing
        }
    }

    /// Keys to validate against the rest schema, with their values.
    fn rest_entries(&self, object: &Object) -> Vec<(String, Value)> {
        object
            .iter()
            .filter(|(key, _)| is_valid_key(key) && !self.is_declared(key))
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    pub(crate) fn run(&self, schema: &Schema, input: Value, config: &Config) -> Dataset {
        let Some(object) = input.as_object() else {
            return schema.type_issue(input, config);
        };
        let mut dataset = Dataset::success(Value::Undefined);
        let mut output = Object::with_capacity(object.len());

        for (key, entry) in &self.entries {
            let stop = match Self::slot(object, key, entry) {
                Slot::Run(value) => {
                    let child = entry.run(value, config);
                    merge_entry(&mut dataset, &mut output, &input, key, child, config)
                }
                Slot::Fallback(value) => {
                    output.insert(key.as_str(), value);
                    false
                }
                Slot::Missing => missing_key(schema, &mut dataset, &input, key, config),
                Slot::Skip => false,
            };
            if stop {
                break;
            }
        }

        if !(dataset.has_issues() && config.is_abort_early()) {
            match &self.mode {
                ObjectMode::Plain => {}
                ObjectMode::Loose => self.copy_unknown(object, &mut output),
                ObjectMode::Strict => self.reject_unknown(schema, &mut dataset, &input, config),
                ObjectMode::Rest(rest) => {
                    for (key, value) in self.rest_entries(object) {
                        let child = rest.run(value, config);
                        if merge_entry(&mut dataset, &mut output, &input, &key, child, config) {
                            break;
                        }
                    }
                }
            }
        }

        dataset.value = Value::Object(output);
        dataset
    }

    pub(crate) async fn run_async(&self, schema: &Schema, input: Value, config: &Config) -> Dataset {
        let Some(object) = input.as_object() else {
            return schema.type_issue(input, config);
        };
        let mut dataset = Dataset::success(Value::Undefined);
        let mut output = Object::with_capacity(object.len());

        for (key, entry) in &self.entries {
            let stop = match Self::slot(object, key, entry) {
                Slot::Run(value) => {
                    let child = entry.run_async(value, config).await;
                    merge_entry(&mut dataset, &mut output, &input, key, child, config)
                }
                Slot::Fallback(value) => {
                    output.insert(key.as_str(), value);
                    false
                }
                Slot::Missing => missing_key(schema, &mut dataset, &input, key, config),
                Slot::Skip => false,
            };
            if stop {
                break;
            }
        }

        if !(dataset.has_issues() && config.is_abort_early()) {
            match &self.mode {
                ObjectMode::Plain => {}
                ObjectMode::Loose => self.copy_unknown(object, &mut output),
                ObjectMode::Strict => self.reject_unknown(schema, &mut dataset, &input, config),
                ObjectMode::Rest(rest) => {
                    for (key, value) in self.rest_entries(object) {
                        let child = rest.run_async(value, config).await;
                        if merge_entry(&mut dataset, &mut output, &input, &key, child, config) {
                            break;
                        }
                    }
                }
            }
        }

        dataset.value = Value::Object(output);
        dataset
    }

    fn copy_unknown(&self, object: &Object, output: &mut Object) {
        for (key, value) in object.iter() {
            if is_valid_key(key) && !self.is_declared(key) {
                output.insert(key, value.clone());
            }
        }
    }

    fn reject_unknown(&self, schema: &Schema, dataset: &mut Dataset, input: &Value, config: &Config) {
        let Some(object) = input.as_object() else {
            return;
        };
        for (key, value) in object.iter() {
            if self.is_declared(key) {
                continue;
            }
            let info = IssueInfo {
                input: Some(Value::from(key)),
                expected: Some("never".to_string()),
                path: Some(vec![PathItem::object_key(input.clone(), key, value.clone())]),
                ..IssueInfo::default()
            };
            schema.report(dataset, "key", config, info);
            if config.is_abort_early() {
                break;
            }
        }
    }
}

/// Merges the result of one entry into the object being built.
///
/// Returns true if the run must stop.
fn merge_entry(
    dataset: &mut Dataset,
    output: &mut Object,
    input: &Value,
    key: &str,
    child: Dataset,
    config: &Config,
) -> bool {
    if let Some(issues) = child.issues {
        let value = input.get(key).cloned().unwrap_or_default();
        dataset.merge_issues(&PathItem::object(input.clone(), key, value), issues);
        if config.is_abort_early() {
            dataset.typed = false;
            return true;
        }
    }
    if !child.typed {
        dataset.typed = false;
    }
    output.insert(key, child.value);
    false
}

/// Reports a required entry that is absent. Returns true if the run must stop.
fn missing_key(
    schema: &Schema,
    dataset: &mut Dataset,
    input: &Value,
    key: &str,
    config: &Config,
) -> bool {
    let info = IssueInfo {
        input: Some(Value::Undefined),
        expected: Some(format!("\"{key}\"")),
        path: Some(vec![PathItem::object_key(input.clone(), key, Value::Undefined)]),
        ..IssueInfo::default()
    };
    schema.report(dataset, "key", config, info);
    config.is_abort_early()
}
