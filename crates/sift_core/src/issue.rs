//! Issues and the paths that locate them.
//!
//! An [`Issue`] is one diagnostic produced while running a schema. Container
//! schemas prefix each child issue with a [`PathItem`] so the final path reads
//! from the root input down to the failing value.

use crate::{Message, Value};
use serde::Serialize;

/// Category of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// The input does not have the shape of the schema
    Schema,
    /// A pipe validation rejected a structurally valid input
    Validation,
    /// A transformation could not produce an output
    Transformation,
}

impl IssueKind {
    /// Returns the lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Schema => "schema",
            IssueKind::Validation => "validation",
            IssueKind::Transformation => "transformation",
        }
    }
}

/// Container that produced a path item.
///
/// Tuples report as arrays and records as objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathItemType {
    /// Array or tuple element
    Array,
    /// Object or record entry
    Object,
    /// Map entry
    Map,
    /// Set member
    Set,
}

/// Whether a path item addresses the key or the value of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathOrigin {
    /// The entry key is malformed
    Key,
    /// The entry value is malformed
    Value,
}

/// Address of one step inside a container.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PathKey {
    /// Position in an array, tuple or set
    Index(usize),
    /// Object or record key
    Key(String),
    /// Map key
    Entry(Value),
}

/// One step of an issue's location within a nested input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathItem {
    /// Container that produced this step
    #[serde(rename = "type")]
    pub item_type: PathItemType,

    /// Whether the key or the value is at fault
    pub origin: PathOrigin,

    /// The whole container being traversed
    pub input: Value,

    /// Address within the container
    pub key: PathKey,

    /// Value found at the address
    pub value: Value,
}

impl PathItem {
    /// Creates a path item for an array or tuple element.
    pub fn array(input: Value, index: usize, value: Value) -> Self {
        Self {
            item_type: PathItemType::Array,
            origin: PathOrigin::Value,
            input,
            key: PathKey::Index(index),
            value,
        }
    }

    /// Creates a path item for the value of an object or record entry.
    pub fn object(input: Value, key: impl Into<String>, value: Value) -> Self {
        Self {
            item_type: PathItemType::Object,
            origin: PathOrigin::Value,
            input,
            key: PathKey::Key(key.into()),
            value,
        }
    }

    /// Creates a path item for the key of an object or record entry.
    pub fn object_key(input: Value, key: impl Into<String>, value: Value) -> Self {
        Self {
            origin: PathOrigin::Key,
            ..Self::object(input, key, value)
        }
    }

    /// Creates a path item for a map entry.
    pub fn map(input: Value, origin: PathOrigin, key: Value, value: Value) -> Self {
        Self {
            item_type: PathItemType::Map,
            origin,
            input,
            key: PathKey::Entry(key),
            value,
        }
    }

    /// Creates a path item for a set member at `position`.
    pub fn set(input: Value, position: usize, value: Value) -> Self {
        Self {
            item_type: PathItemType::Set,
            origin: PathOrigin::Value,
            input,
            key: PathKey::Index(position),
            value,
        }
    }
}

/// One validation, type or transformation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Category of the issue
    pub kind: IssueKind,

    /// Identifier of the reporting schema or action (e.g. `min_length`)
    #[serde(rename = "type")]
    pub issue_type: &'static str,

    /// The offending value
    pub input: Value,

    /// What was wanted, when applicable
    pub expected: Option<String>,

    /// What was observed
    pub received: String,

    /// Resolved human readable message
    pub message: String,

    /// Parameter of the reporting action, if it has one
    pub requirement: Option<Value>,

    /// Location relative to the root input; absent for root issues
    pub path: Option<Vec<PathItem>>,

    /// Issues of every attempted option, for union-like schemas
    pub issues: Option<Vec<Issue>>,

    /// Language that was active when the issue was reported
    pub lang: Option<String>,

    /// Selected message, kept until the issue surfaces
    #[serde(skip)]
    pub(crate) pending: Option<Message>,
}

impl Issue {
    /// Returns true if the selected message has not been rendered yet.
    pub fn has_pending_message(&self) -> bool {
        self.pending.is_some()
            || self
                .issues
                .iter()
                .flatten()
                .any(Issue::has_pending_message)
    }

    /// Renders a deferred message into `message`, nested issues first.
    pub fn render_message(&mut self) {
        for issue in self.issues.iter_mut().flatten() {
            issue.render_message();
        }
        if let Some(message) = self.pending.take() {
            self.message = message.render(self);
        }
    }

    /// Prefixes the path with the item of an enclosing container.
    pub fn prepend_path(&mut self, item: PathItem) {
        match &mut self.path {
            Some(path) => path.insert(0, item),
            None => self.path = Some(vec![item]),
        }
    }

    /// Returns the dot-joined path (`users.0.email`), if every step is
    /// addressed by a string key or an index.
    pub fn dot_path(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        let mut segments = Vec::with_capacity(path.len());
        for item in path {
            match &item.key {
                PathKey::Index(index) => segments.push(index.to_string()),
                PathKey::Key(key) => segments.push(key.clone()),
                PathKey::Entry(Value::String(key)) => segments.push(key.clone()),
                PathKey::Entry(Value::Number(n)) => segments.push(crate::value::format_number(*n)),
                PathKey::Entry(_) => return None,
            }
        }
        Some(segments.join("."))
    }
}
