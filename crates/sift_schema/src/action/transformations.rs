//! Transformation actions.

use super::{ActionSpec, Operation, PipeItem, RawIssues, Rejection, Transformation};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::FutureExt;
use sift_core::Value;
use std::future::Future;
use std::sync::Arc;

fn transformation<F>(spec: ActionSpec, mapping: F) -> PipeItem
where
    F: Fn(Value) -> Result<Value, Rejection> + Send + Sync + 'static,
{
    PipeItem::Transformation(Transformation::new(spec, mapping))
}

fn map_string(value: Value, map: fn(&str) -> String) -> Result<Value, Rejection> {
    match value {
        Value::String(text) => Ok(Value::String(map(&text))),
        other => Ok(other),
    }
}

/// Replaces the value with the output of `mapping`.
///
/// # Example
///
/// ```rust
/// use sift_schema::{parse, string, transform};
/// use sift_core::Value;
///
/// let shout = string().pipe([transform(|value| Value::from(format!("{value}!")))]);
/// assert_eq!(parse(&shout, Value::from("hi"), None).unwrap(), Value::from("hi!"));
/// ```
pub fn transform<F>(mapping: F) -> PipeItem
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    transformation(ActionSpec::new("transform", "input"), move |value| {
        Ok(mapping(value))
    })
}

/// Replaces the value with the output of a mapping that may add issues.
///
/// When the mapping adds an issue its output is discarded and the dataset
/// becomes untyped.
pub fn raw_transform<F>(mapping: F) -> PipeItem
where
    F: Fn(Value, &mut RawIssues) -> Value + Send + Sync + 'static,
{
    PipeItem::Transformation(Transformation {
        spec: ActionSpec::new("raw_transform", "input"),
        operation: Operation::Raw(Arc::new(mapping)),
    })
}

/// Replaces the value with the awaited output of `mapping`.
pub fn transform_async<F, Fut>(mapping: F) -> PipeItem
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Value> + Send + 'static,
{
    let mapping = Arc::new(mapping);
    PipeItem::Transformation(Transformation {
        spec: ActionSpec::new("transform", "input"),
        operation: Operation::Async(Arc::new(move |value| {
            let mapping = mapping.clone();
            async move { mapping(value).await }.boxed()
        })),
    })
}

/// Removes leading and trailing whitespace from strings.
pub fn trim() -> PipeItem {
    transformation(ActionSpec::new("trim", "input"), |value| {
        map_string(value, |text| text.trim().to_string())
    })
}

/// Lowercases strings.
pub fn to_lower_case() -> PipeItem {
    transformation(ActionSpec::new("to_lower_case", "input"), |value| {
        map_string(value, str::to_lowercase)
    })
}

/// Uppercases strings.
pub fn to_upper_case() -> PipeItem {
    transformation(ActionSpec::new("to_upper_case", "input"), |value| {
        map_string(value, str::to_uppercase)
    })
}

/// Converts strings, booleans, big integers and dates to numbers.
///
/// Blank strings convert to `0`; unparsable input is a transformation issue.
pub fn to_number() -> PipeItem {
    transformation(ActionSpec::new("to_number", "number"), |value| {
        let number = match &value {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::BigInt(i) => Some(*i as f64),
            Value::Null => Some(0.0),
            Value::Date(date) => Some(date.timestamp_millis() as f64),
            Value::String(text) if text.trim().is_empty() => Some(0.0),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(n) if !n.is_nan() => Ok(Value::Number(n)),
            _ => Err(Rejection::new()),
        }
    })
}

/// Converts strings and numbers to dates.
///
/// Numbers are epoch milliseconds; strings are parsed with [`parse_date`].
pub fn to_date() -> PipeItem {
    transformation(ActionSpec::new("to_date", "date"), |value| {
        let date = match &value {
            Value::Date(date) => Some(*date),
            Value::Number(n) if n.is_finite() => DateTime::from_timestamp_millis(*n as i64),
            Value::String(text) => parse_date(text),
            _ => None,
        };
        date.map(Value::Date).ok_or_else(Rejection::new)
    })
}

/// Parses a date string.
///
/// Supports these formats:
/// - RFC 3339 (e.g., "2024-01-15T10:30:00Z")
/// - Epoch milliseconds (e.g., "1705318200000")
/// - Date and time without zone, taken as UTC (e.g., "2024-01-15 10:30:00")
/// - Date only, at midnight UTC (e.g., "2024-01-15")
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(millis) = text.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis);
    }

    if text.contains(' ') && text.len() >= 19 {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
            return Some(naive.and_utc());
        }
    }

    if text.len() == 10 && text.chars().filter(|c| *c == '-').count() == 2 {
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    text.parse::<DateTime<Utc>>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;
    use sift_core::{Config, Dataset, IssueKind};

    fn run(item: &PipeItem, value: impl Into<Value>) -> Dataset {
        let mut dataset = Dataset::success(value.into());
        match item {
            PipeItem::Transformation(transformation) => {
                transformation.run(&mut dataset, &Config::new())
            }
            _ => panic!("not a transformation"),
        }
        dataset
    }

    #[test]
    fn test_string_transformations() {
        assert_eq!(run(&trim(), "  hi  ").value, Value::from("hi"));
        assert_eq!(run(&to_lower_case(), "HeLLo").value, Value::from("hello"));
        assert_eq!(run(&to_upper_case(), "HeLLo").value, Value::from("HELLO"));
        assert_eq!(run(&trim(), 3).value, Value::from(3));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(run(&to_number(), " 42 ").value, Value::from(42));
        assert_eq!(run(&to_number(), true).value, Value::from(1));

        let dataset = run(&to_number(), "abc");
        assert!(!dataset.typed);
        assert_eq!(dataset.value, Value::from("abc"));
        let issue = &dataset.issues.expect("issue")[0];
        assert_eq!(issue.kind, IssueKind::Transformation);
        assert_eq!(issue.issue_type, "to_number");
        assert_eq!(issue.message, "Invalid number: Received \"abc\"");
    }

    #[test]
    fn test_to_date() {
        let dataset = run(&to_date(), "2024-01-15");
        let date = dataset.value.as_date().copied().expect("date");
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 15));

        let dataset = run(&to_date(), 0);
        assert_eq!(dataset.value, Value::Date(DateTime::UNIX_EPOCH));

        let dataset = run(&to_date(), "yesterday");
        assert!(!dataset.typed);
        assert_eq!(dataset.issues.expect("issue")[0].issue_type, "to_date");
    }

    #[test]
    fn test_parse_date_formats() {
        let date = parse_date("2024-01-15T10:30:00Z").expect("rfc3339");
        assert_eq!(date.hour(), 10);

        let date = parse_date("2024-01-15 10:30:00").expect("space separated");
        assert_eq!(date.minute(), 30);

        let date = parse_date("1705318200000").expect("epoch millis");
        assert_eq!(date.timestamp(), 1_705_318_200);

        assert!(parse_date("").is_none());
        assert!(parse_date("2024-13-45").is_none());
    }

    #[test]
    fn test_raw_transform_with_issue_keeps_value() {
        let item = raw_transform(|value, issues| {
            issues.add_message("cannot convert");
            Value::from(format!("{value}?"))
        });
        let dataset = run(&item, "x");
        assert!(!dataset.typed);
        assert_eq!(dataset.value, Value::from("x"));
        assert_eq!(dataset.issues.expect("issue")[0].message, "cannot convert");
    }

    #[test]
    fn test_raw_transform_without_issue() {
        let item = raw_transform(|value, _| Value::from(format!("{value}!")));
        let dataset = run(&item, "x");
        assert!(dataset.is_success());
        assert_eq!(dataset.value, Value::from("x!"));
    }
}
