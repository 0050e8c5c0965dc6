//! Validation actions.
//!
//! A validation never changes the value. Applied to a value of a type it
//! cannot inspect (e.g. `min_length` on a number) it fails and reports the
//! observed value as received.

use super::{ActionSpec, Check, PipeItem, RawIssues, Rejection, Validation};
use futures::FutureExt;
use regex::Regex;
use sift_core::Value;
use std::cmp::Ordering;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use validator::{ValidateEmail, ValidateIp, ValidateUrl};

static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\da-f]{8}(?:-[\da-f]{4}){3}-[\da-f]{12}$").expect("valid UUID pattern")
});

fn validation<F>(spec: ActionSpec, predicate: F) -> PipeItem
where
    F: Fn(&Value) -> Result<(), Rejection> + Send + Sync + 'static,
{
    PipeItem::Validation(Validation::new(spec, predicate))
}

fn ensure(condition: bool) -> Result<(), Rejection> {
    if condition { Ok(()) } else { Err(Rejection::new()) }
}

/// Formats bounds and dates the way issues print them.
fn render_bound(value: &Value) -> String {
    match value {
        Value::Date(_) => value.to_string(),
        other => other.describe(),
    }
}

fn length_check(
    action_type: &'static str,
    expects: String,
    requirement: usize,
    accepts: fn(usize, usize) -> bool,
) -> PipeItem {
    let spec = ActionSpec::new(action_type, "length")
        .expects(expects)
        .requirement(requirement);
    validation(spec, move |value| match value.length() {
        Some(length) if accepts(length, requirement) => Ok(()),
        Some(length) => Err(Rejection::received(length.to_string())),
        None => Err(Rejection::new()),
    })
}

/// Requires strings (in characters) or arrays to have at least
/// `requirement` elements.
pub fn min_length(requirement: usize) -> PipeItem {
    length_check(
        "min_length",
        format!(">={requirement}"),
        requirement,
        |length, requirement| length >= requirement,
    )
}

/// Requires strings or arrays to have at most `requirement` elements.
pub fn max_length(requirement: usize) -> PipeItem {
    length_check(
        "max_length",
        format!("<={requirement}"),
        requirement,
        |length, requirement| length <= requirement,
    )
}

/// Requires strings or arrays to have exactly `requirement` elements.
pub fn length(requirement: usize) -> PipeItem {
    length_check(
        "length",
        requirement.to_string(),
        requirement,
        |length, requirement| length == requirement,
    )
}

/// Requires strings or arrays to be non-empty.
pub fn non_empty() -> PipeItem {
    let spec = ActionSpec::new("non_empty", "length").expects("!0");
    validation(spec, |value| match value.length() {
        Some(0) => Err(Rejection::received("0")),
        Some(_) => Ok(()),
        None => Err(Rejection::new()),
    })
}

fn value_check(
    action_type: &'static str,
    operator: &str,
    requirement: Value,
    accepts: fn(Ordering) -> bool,
) -> PipeItem {
    let spec = ActionSpec::new(action_type, "value")
        .expects(format!("{operator}{}", render_bound(&requirement)))
        .requirement(requirement.clone());
    validation(spec, move |value| match value.compare(&requirement) {
        Some(ordering) if accepts(ordering) => Ok(()),
        _ => Err(Rejection::received(render_bound(value))),
    })
}

/// Requires numbers, big integers, dates or strings to be at least
/// `requirement`.
pub fn min_value(requirement: impl Into<Value>) -> PipeItem {
    value_check("min_value", ">=", requirement.into(), |ordering| {
        ordering != Ordering::Less
    })
}

/// Requires comparable values to be at most `requirement`.
pub fn max_value(requirement: impl Into<Value>) -> PipeItem {
    value_check("max_value", "<=", requirement.into(), |ordering| {
        ordering != Ordering::Greater
    })
}

/// Requires numbers to be a multiple of `requirement`.
pub fn multiple_of(requirement: f64) -> PipeItem {
    let spec = ActionSpec::new("multiple_of", "multiple")
        .expects(format!("%{}", Value::from(requirement).describe()))
        .requirement(requirement);
    validation(spec, move |value| match value {
        Value::Number(n) => ensure(requirement != 0.0 && (n % requirement) == 0.0),
        Value::BigInt(i) => ensure(
            requirement.fract() == 0.0 && requirement != 0.0 && i % (requirement as i128) == 0,
        ),
        _ => Err(Rejection::new()),
    })
}

/// Requires numbers to be integers.
pub fn integer() -> PipeItem {
    validation(ActionSpec::new("integer", "integer"), |value| match value {
        Value::Number(n) => ensure(n.is_finite() && n.fract() == 0.0),
        Value::BigInt(_) => Ok(()),
        _ => Err(Rejection::new()),
    })
}

/// Requires numbers to be finite.
pub fn finite() -> PipeItem {
    validation(ActionSpec::new("finite", "finite"), |value| match value {
        Value::Number(n) => ensure(n.is_finite()),
        Value::BigInt(_) => Ok(()),
        _ => Err(Rejection::new()),
    })
}

fn string_check<F>(spec: ActionSpec, accepts: F) -> PipeItem
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    validation(spec, move |value| match value.as_str() {
        Some(text) => ensure(accepts(text)),
        None => Err(Rejection::new()),
    })
}

/// Requires strings to match `pattern`.
pub fn regex(pattern: Regex) -> PipeItem {
    let spec = ActionSpec::new("regex", "format")
        .expects(format!("/{}/", pattern.as_str()))
        .requirement(pattern.as_str());
    string_check(spec, move |text| pattern.is_match(text))
}

/// Requires strings to be email addresses.
pub fn email() -> PipeItem {
    string_check(ActionSpec::new("email", "email"), |text| {
        text.validate_email()
    })
}

/// Requires strings to be URLs.
pub fn url() -> PipeItem {
    string_check(ActionSpec::new("url", "URL"), |text| {
        text.validate_url()
    })
}

/// Requires strings to be UUIDs.
pub fn uuid() -> PipeItem {
    string_check(ActionSpec::new("uuid", "UUID"), |text| UUID_REGEX.is_match(text))
}

/// Requires strings to be IPv4 addresses.
pub fn ipv4() -> PipeItem {
    string_check(ActionSpec::new("ipv4", "IPv4"), |text| {
        text.validate_ipv4()
    })
}

/// Requires strings to be IPv6 addresses.
pub fn ipv6() -> PipeItem {
    string_check(ActionSpec::new("ipv6", "IPv6"), |text| {
        text.validate_ipv6()
    })
}

/// Requires strings to be IPv4 or IPv6 addresses.
pub fn ip() -> PipeItem {
    string_check(ActionSpec::new("ip", "IP"), |text| {
        text.validate_ip()
    })
}

/// Requires strings to start with `requirement`.
pub fn starts_with(requirement: impl Into<String>) -> PipeItem {
    let requirement = requirement.into();
    let spec = ActionSpec::new("starts_with", "start")
        .expects(format!("\"{requirement}\""))
        .requirement(requirement.as_str());
    validation(spec, move |value| match value.as_str() {
        Some(text) if text.starts_with(&requirement) => Ok(()),
        Some(text) => {
            let head: String = text.chars().take(requirement.chars().count()).collect();
            Err(Rejection::received(format!("\"{head}\"")))
        }
        None => Err(Rejection::new()),
    })
}

/// Requires strings to end with `requirement`.
pub fn ends_with(requirement: impl Into<String>) -> PipeItem {
    let requirement = requirement.into();
    let spec = ActionSpec::new("ends_with", "end")
        .expects(format!("\"{requirement}\""))
        .requirement(requirement.as_str());
    validation(spec, move |value| match value.as_str() {
        Some(text) if text.ends_with(&requirement) => Ok(()),
        Some(text) => {
            let count = text.chars().count();
            let skip = count.saturating_sub(requirement.chars().count());
            let tail: String = text.chars().skip(skip).collect();
            Err(Rejection::received(format!("\"{tail}\"")))
        }
        None => Err(Rejection::new()),
    })
}

/// Requires strings to contain `requirement`, or arrays to contain an
/// element equal to it.
pub fn includes(requirement: impl Into<Value>) -> PipeItem {
    let requirement = requirement.into();
    let expects = requirement.describe();
    let spec = ActionSpec::new("includes", "content")
        .expects(expects.clone())
        .requirement(requirement.clone());
    validation(spec, move |value| {
        let found = match (value, &requirement) {
            (Value::String(text), Value::String(needle)) => text.contains(needle.as_str()),
            (Value::Array(items), needle) => items.contains(needle),
            _ => return Err(Rejection::new()),
        };
        if found {
            Ok(())
        } else {
            Err(Rejection::received(format!("!{expects}")))
        }
    })
}

fn size_check(
    action_type: &'static str,
    expects: String,
    requirement: usize,
    accepts: fn(usize, usize) -> bool,
) -> PipeItem {
    let spec = ActionSpec::new(action_type, "size")
        .expects(expects)
        .requirement(requirement);
    validation(spec, move |value| match value.size() {
        Some(size) if accepts(size, requirement) => Ok(()),
        Some(size) => Err(Rejection::received(size.to_string())),
        None => Err(Rejection::new()),
    })
}

/// Requires maps or sets to have at least `requirement` entries.
pub fn min_size(requirement: usize) -> PipeItem {
    size_check(
        "min_size",
        format!(">={requirement}"),
        requirement,
        |size, requirement| size >= requirement,
    )
}

/// Requires maps or sets to have at most `requirement` entries.
pub fn max_size(requirement: usize) -> PipeItem {
    size_check(
        "max_size",
        format!("<={requirement}"),
        requirement,
        |size, requirement| size <= requirement,
    )
}

/// Validates the value with a custom predicate.
///
/// # Example
///
/// ```rust
/// use sift_schema::{check, number, safe_parse};
/// use sift_core::Value;
///
/// let even = number().pipe([check(|value| value.as_f64().is_some_and(|n| n % 2.0 == 0.0))]);
/// assert!(safe_parse(&even, Value::from(4), None).success);
/// assert!(!safe_parse(&even, Value::from(3), None).success);
/// ```
pub fn check<F>(predicate: F) -> PipeItem
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    validation(ActionSpec::new("check", "input"), move |value| {
        ensure(predicate(value))
    })
}

/// Validates the value with a function that may add any number of issues.
pub fn raw_check<F>(check: F) -> PipeItem
where
    F: Fn(&Value, &mut RawIssues) + Send + Sync + 'static,
{
    PipeItem::Validation(Validation {
        spec: ActionSpec::new("raw_check", "input"),
        check: Check::Raw(Arc::new(check)),
    })
}

/// Validates the value with an asynchronous predicate.
///
/// Schemas using it must run through the async entry points.
pub fn check_async<F, Fut>(predicate: F) -> PipeItem
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    let predicate = Arc::new(predicate);
    PipeItem::Validation(Validation {
        spec: ActionSpec::new("check", "input"),
        check: Check::Async(Arc::new(move |value| {
            let predicate = predicate.clone();
            async move { ensure(predicate(value).await) }.boxed()
        })),
    })
}
