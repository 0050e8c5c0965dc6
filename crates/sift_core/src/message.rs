//! Message resolution for issues.
//!
//! A [`Message`] is either fixed text or a resolver invoked with the finished
//! [`Issue`]. Resolvers run only when an issue is actually reported; runs
//! whose issues may be discarded keep the selected message pending until
//! the issue surfaces.
//!
//! The [`MessageRegistry`] stores language specific messages keyed by issue
//! type. It is an explicit value: entry points hold an `Arc` to one, so tests
//! can build isolated registries and no state is process global.

use crate::Issue;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

type Resolver = dyn Fn(&Issue) -> String + Send + Sync;

/// An issue message: literal text or a function of the issue.
#[derive(Clone)]
pub enum Message {
    /// Fixed text
    Text(Arc<str>),
    /// Computed from the issue when it is reported
    Resolver(Arc<Resolver>),
}

impl Message {
    /// Creates a literal message.
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text(Arc::from(text.into()))
    }

    /// Creates a message computed from the issue.
    pub fn resolver<F>(resolver: F) -> Self
    where
        F: Fn(&Issue) -> String + Send + Sync + 'static,
    {
        Message::Resolver(Arc::new(resolver))
    }

    /// Creates a message from a template.
    ///
    /// The placeholders `{expected}`, `{received}`, `{input}`, `{requirement}`,
    /// `{type}`, `{kind}` and `{path}` are replaced with the issue's fields.
    pub fn template(template: impl Into<String>) -> Self {
        let template = template.into();
        Message::resolver(move |issue| render_template(&template, issue))
    }

    /// Produces the message text for `issue`.
    pub fn render(&self, issue: &Issue) -> String {
        match self {
            Message::Text(text) => text.to_string(),
            Message::Resolver(resolver) => resolver(issue),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Message::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Message::Text(a), Message::Text(b)) => a == b,
            (Message::Resolver(a), Message::Resolver(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::text(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::text(text)
    }
}

fn render_template(template: &str, issue: &Issue) -> String {
    let requirement = issue
        .requirement
        .as_ref()
        .map(|requirement| requirement.to_string())
        .unwrap_or_default();
    template
        .replace("{expected}", issue.expected.as_deref().unwrap_or(""))
        .replace("{received}", &issue.received)
        .replace("{input}", &issue.input.to_string())
        .replace("{requirement}", &requirement)
        .replace("{type}", issue.issue_type)
        .replace("{kind}", issue.kind.as_str())
        .replace("{path}", &issue.dot_path().unwrap_or_default())
}

/// Language key; `None` matches runs without a configured language.
type Lang = Option<String>;

/// Registry of language specific messages.
///
/// Three stores are consulted when an issue is reported: specific messages
/// keyed by issue type and language, schema messages (used for `schema` kind
/// issues) keyed by language, and global messages keyed by language.
/// Lookups clone the stored message under the read lock, so a run always sees
/// a whole message even while another thread registers a new one.
#[derive(Default)]
pub struct MessageRegistry {
    global: RwLock<HashMap<Lang, Message>>,
    schema: RwLock<HashMap<Lang, Message>>,
    specific: RwLock<HashMap<(String, Lang), Message>>,
}

impl MessageRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the global message for `lang`.
    pub fn set_global_message(&self, message: impl Into<Message>, lang: Option<&str>) {
        debug!(lang = ?lang, "registering global message");
        write(&self.global).insert(lang.map(str::to_string), message.into());
    }

    /// Gets the global message for `lang`.
    pub fn global_message(&self, lang: Option<&str>) -> Option<Message> {
        read(&self.global).get(&lang.map(str::to_string)).cloned()
    }

    /// Deletes the global message for `lang`.
    pub fn delete_global_message(&self, lang: Option<&str>) {
        debug!(lang = ?lang, "deleting global message");
        write(&self.global).remove(&lang.map(str::to_string));
    }

    /// Sets the message used for schema issues in `lang`.
    pub fn set_schema_message(&self, message: impl Into<Message>, lang: Option<&str>) {
        debug!(lang = ?lang, "registering schema message");
        write(&self.schema).insert(lang.map(str::to_string), message.into());
    }

    /// Gets the message used for schema issues in `lang`.
    pub fn schema_message(&self, lang: Option<&str>) -> Option<Message> {
        read(&self.schema).get(&lang.map(str::to_string)).cloned()
    }

    /// Deletes the message used for schema issues in `lang`.
    pub fn delete_schema_message(&self, lang: Option<&str>) {
        debug!(lang = ?lang, "deleting schema message");
        write(&self.schema).remove(&lang.map(str::to_string));
    }

    /// Sets the message for issues of type `issue_type` in `lang`.
    pub fn set_specific_message(
        &self,
        issue_type: &str,
        message: impl Into<Message>,
        lang: Option<&str>,
    ) {
        debug!(issue_type, lang = ?lang, "registering specific message");
        write(&self.specific).insert(
            (issue_type.to_string(), lang.map(str::to_string)),
            message.into(),
        );
    }

    /// Gets the message for issues of type `issue_type` in `lang`.
    pub fn specific_message(&self, issue_type: &str, lang: Option<&str>) -> Option<Message> {
        read(&self.specific)
            .get(&(issue_type.to_string(), lang.map(str::to_string)))
            .cloned()
    }

    /// Deletes the message for issues of type `issue_type` in `lang`.
    pub fn delete_specific_message(&self, issue_type: &str, lang: Option<&str>) {
        debug!(issue_type, lang = ?lang, "deleting specific message");
        write(&self.specific).remove(&(issue_type.to_string(), lang.map(str::to_string)));
    }
}

impl fmt::Debug for MessageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRegistry")
            .field("global", &read(&self.global).len())
            .field("schema", &read(&self.schema).len())
            .field("specific", &read(&self.specific).len())
            .finish()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!("message registry lock poisoned, recovering");
        poisoned.into_inner()
    })
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!("message registry lock poisoned, recovering");
        poisoned.into_inner()
    })
}
