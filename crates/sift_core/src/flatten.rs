//! Flattening of issue lists for form-style reporting.

use crate::Issue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Issue messages grouped by where they occurred.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatErrors {
    /// Messages of issues without a path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<Vec<String>>,

    /// Messages keyed by dot path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<BTreeMap<String, Vec<String>>>,

    /// Messages whose path cannot be written as a dot path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<Vec<String>>,
}

/// Groups issue messages by their dot path.
///
/// # Example
///
/// ```rust
/// use sift_core::{flatten, FlatErrors};
///
/// let flat: FlatErrors = flatten(&[]);
/// assert!(flat.root.is_none());
/// ```
pub fn flatten(issues: &[Issue]) -> FlatErrors {
    let mut flat = FlatErrors::default();
    for issue in issues {
        let message = issue.message.clone();
        if issue.path.is_none() {
            flat.root.get_or_insert_with(Vec::new).push(message);
            continue;
        }
        match issue.dot_path() {
            Some(path) => flat
                .nested
                .get_or_insert_with(BTreeMap::new)
                .entry(path)
                .or_default()
                .push(message),
            None => flat.other.get_or_insert_with(Vec::new).push(message),
        }
    }
    flat
}
