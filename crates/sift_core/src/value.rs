//! Dynamic values handed to schemas.
//!
//! This module provides the untyped value model every schema inspects, plus
//! the ordered [`Object`] map used for object-like input.

use chrono::{DateTime, SecondsFormat, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// A value in an untyped input.
///
/// Represents every shape an input can take before validation. `Undefined`
/// stands for an absent value (missing key, missing tuple slot) while `Null`
/// is an explicit null.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Undefined,
    /// Explicit null
    Null,
    /// Boolean value
    Bool(bool),
    /// Floating point number
    Number(f64),
    /// Arbitrary precision integer
    BigInt(i128),
    /// String value
    String(String),
    /// Point in time
    Date(DateTime<Utc>),
    /// List/array value
    Array(Vec<Value>),
    /// String-keyed object
    Object(Object),
    /// Map with arbitrary keys, in insertion order
    Map(Vec<(Value, Value)>),
    /// Set of unique values, in insertion order
    Set(Vec<Value>),
}

impl Value {
    /// Returns true if this value is undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value is null or undefined.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Date(_) => "Date",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::Map(_) => "Map",
            Value::Set(_) => "Set",
        }
    }

    /// Describes the value the way issues report what was received.
    ///
    /// Strings are quoted, scalars are printed verbatim and containers are
    /// named by their type.
    pub fn describe(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::BigInt(i) => i.to_string(),
            Value::String(s) => format!("\"{s}\""),
            other => other.type_name().to_string(),
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get this value as an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Attempts to get this value as an object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Attempts to get this value as a date.
    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(date) => Some(date),
            _ => None,
        }
    }

    /// Looks up a key when this value is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|object| object.get(key))
    }

    /// Returns the length of strings (in characters) and arrays.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Returns the number of entries of maps and sets.
    pub fn size(&self) -> Option<usize> {
        match self {
            Value::Map(entries) => Some(entries.len()),
            Value::Set(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Compares two values of a comparable kind.
    ///
    /// Numbers compare with big integers, dates with dates, strings
    /// lexicographically and booleans as `false < true`. Any other pairing is
    /// not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::BigInt(b)) => a.partial_cmp(&(*b as f64)),
            (Value::BigInt(a), Value::Number(b)) => (*a as f64).partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Date(date) => f.write_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true)),
            other => f.write_str(&other.describe()),
        }
    }
}

/// Formats a number without a trailing `.0` for integral values.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        n.to_string()
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::BigInt(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(date: DateTime<Utc>) -> Self {
        Value::Date(date)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// An insertion-ordered, string-keyed map.
///
/// Object schemas enumerate keys in input order, so issue lists stay
/// deterministic across runs. Equality ignores key order. Lookups and
/// inserts go through a key index into the entry list.
#[derive(Clone, Default)]
pub struct Object {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl Object {
    /// Creates a new empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty object with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the object has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    /// Returns true if `key` is present, even when its value is undefined.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts a value, replacing (in place) any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.index.get(&key).copied() {
            Some(position) => Some(std::mem::replace(&mut self.entries[position].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Removes the entry for `key`. Later entries keep their relative order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let position = self.index.remove(key)?;
        let (_, value) = self.entries.remove(position);
        for (entry_key, _) in &self.entries[position..] {
            if let Some(slot) = self.index.get_mut(entry_key) {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Returns an iterator over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Returns an iterator over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut object = Object::with_capacity(iter.size_hint().0);
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|other| other == value))
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_describe() {
        assert_eq!(Value::from("hello").describe(), "\"hello\"");
        assert_eq!(Value::from(42).describe(), "42");
        assert_eq!(Value::from(1.5).describe(), "1.5");
        assert_eq!(Value::Number(f64::INFINITY).describe(), "Infinity");
        assert_eq!(Value::from(true).describe(), "true");
        assert_eq!(Value::Null.describe(), "null");
        assert_eq!(Value::Undefined.describe(), "undefined");
        assert_eq!(Value::Array(vec![]).describe(), "Array");
        assert_eq!(Value::Object(Object::new()).describe(), "Object");
        assert_eq!(Value::BigInt(7).describe(), "7");
    }

    #[test]
    fn test_object_keeps_insertion_order() {
        let mut object = Object::new();
        object.insert("b", Value::from(1));
        object.insert("a", Value::from(2));
        object.insert("b", Value::from(3));

        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(object.get("b"), Some(&Value::from(3)));
        assert_eq!(object.remove("b"), Some(Value::from(3)));
        assert_eq!(object.len(), 1);
    }

    #[test]
    fn test_object_remove_keeps_lookups() {
        let mut object: Object = (0..5)
            .map(|i| (format!("k{i}"), Value::from(i)))
            .collect();
        assert_eq!(object.remove("k1"), Some(Value::from(1)));
        assert_eq!(object.remove("k1"), None);

        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["k0", "k2", "k3", "k4"]);
        assert_eq!(object.get("k3"), Some(&Value::from(3)));
        assert_eq!(object.insert("k4", Value::from(40)), Some(Value::from(4)));
        assert_eq!(object.get("k4"), Some(&Value::from(40)));
        assert!(!object.contains_key("k1"));
    }

    #[test]
    fn test_large_object_builds_in_order() {
        let object: Object = (0..50_000)
            .map(|i| (format!("k{i}"), Value::from(i)))
            .collect();
        assert_eq!(object.len(), 50_000);
        assert_eq!(object.keys().nth(49_999), Some("k49999"));
        assert_eq!(object.get("k25000"), Some(&Value::from(25_000)));
    }

    #[test]
    fn test_object_equality_ignores_order() {
        let first: Object = [("a", Value::from(1)), ("b", Value::from(2))]
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        let second: Object = [("b", Value::from(2)), ("a", Value::from(1))]
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        assert_eq!(first, second);
        assert_ne!(first, Object::new());
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({"name": "x", "tags": [1, null]}));
        assert_eq!(value.get("name"), Some(&Value::from("x")));
        assert_eq!(
            value.get("tags"),
            Some(&Value::Array(vec![Value::from(1), Value::Null]))
        );
    }

    #[test]
    fn test_length_and_size() {
        assert_eq!(Value::from("héllo").length(), Some(5));
        assert_eq!(Value::Array(vec![Value::Null]).length(), Some(1));
        assert_eq!(Value::from(3).length(), None);
        assert_eq!(Value::Set(vec![Value::from(1)]).size(), Some(1));
    }

    #[test]
    fn test_compare() {
        assert_eq!(
            Value::from(1).compare(&Value::BigInt(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::from("b").compare(&Value::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::from(1).compare(&Value::from("1")), None);
    }
}
