//! Serde support for [`Value`].
//!
//! Any self-describing serde format (JSON, YAML, TOML) can produce input
//! values, and issues can be serialized back for reporting.

use crate::{Object, Value};
use chrono::SecondsFormat;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Largest magnitude below which every integer is exactly representable as
/// an `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::BigInt(i) => serializer.serialize_i128(*i),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(date) => {
                serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Array(items) | Value::Set(items) => serializer.collect_seq(items),
            Value::Object(object) => object.serialize(serializer),
            Value::Map(entries) => serializer.collect_seq(entries),
        }
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Value, E> {
        Ok(Value::BigInt(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut object = Object::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_json_keeps_key_order() {
        let value: Value = serde_json::from_str(r#"{"z": 1, "a": [true, null], "m": "x"}"#)
            .expect("valid json");

        let object = value.as_object().expect("object");
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(
            object.get("a"),
            Some(&Value::Array(vec![Value::Bool(true), Value::Null]))
        );
    }

    #[test]
    fn test_serialize_undefined_as_null() {
        let mut object = Object::new();
        object.insert("missing", Value::Undefined);
        object.insert("count", Value::from(2));

        let json = serde_json::to_string(&Value::Object(object)).expect("serializable");
        assert_eq!(json, r#"{"missing":null,"count":2}"#);
    }

    #[test]
    fn test_serialize_numbers_as_they_came_in() {
        let value: Value = serde_json::from_str(r#"[2, -7, 1.5, 0.1, 3.0]"#)
            .expect("valid json");
        let json = serde_json::to_string(&value).expect("serializable");
        assert_eq!(json, "[2,-7,1.5,0.1,3]");
    }

    #[test]
    fn test_deserialize_large_object() {
        let source = format!(
            "{{{}}}",
            (0..40_000)
                .map(|i| format!("\"k{i}\":{i}"))
                .collect::<Vec<_>>()
                .join(",")
        );
        let value: Value = serde_json::from_str(&source).expect("valid json");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 40_000);
        assert_eq!(object.keys().next(), Some("k0"));
        assert_eq!(object.get("k39999"), Some(&Value::from(39_999)));
    }
}
