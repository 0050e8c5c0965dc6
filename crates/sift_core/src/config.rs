//! Per-run configuration.
//!
//! A [`Config`] is read-only during a run. Entry points merge three layers
//! before descending: the caller's config, schema-instance defaults and the
//! engine-wide defaults, in that order of precedence.

use crate::{IssueKind, Message, MessageRegistry};
use std::borrow::Cow;
use std::sync::Arc;

/// Options for one run of a schema.
///
/// # Example
///
/// ```rust
/// use sift_core::Config;
///
/// let config = Config::new()
///     .with_lang("de")
///     .with_abort_pipe_early(true);
///
/// assert!(config.is_abort_pipe_early());
/// assert!(!config.is_abort_early());
/// ```
#[derive(Debug, Default, Clone)]
pub struct Config {
    /// Language used to look up registered messages
    pub lang: Option<String>,

    /// Message used for every issue of the run that has no more specific one
    pub message: Option<Message>,

    /// Stop the whole run at the first issue
    pub abort_early: Option<bool>,

    /// Stop the current pipe at its first issue
    pub abort_pipe_early: Option<bool>,

    /// Registry consulted for language specific messages
    pub registry: Option<Arc<MessageRegistry>>,

    /// Keep selected messages pending instead of rendering them as issues
    /// are reported
    pub defer_messages: Option<bool>,
}

impl Config {
    /// Creates a new config with every option unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message language.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Sets the run-wide message.
    pub fn with_message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets abort-early mode.
    pub fn with_abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = Some(abort_early);
        self
    }

    /// Sets abort-pipe-early mode.
    pub fn with_abort_pipe_early(mut self, abort_pipe_early: bool) -> Self {
        self.abort_pipe_early = Some(abort_pipe_early);
        self
    }

    /// Sets the message registry.
    pub fn with_registry(mut self, registry: Arc<MessageRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets deferred message rendering.
    pub fn with_deferred_messages(mut self, defer_messages: bool) -> Self {
        self.defer_messages = Some(defer_messages);
        self
    }

    /// Returns true if the run stops at the first issue.
    pub fn is_abort_early(&self) -> bool {
        self.abort_early.unwrap_or(false)
    }

    /// Returns true if pipes stop at their first issue.
    pub fn is_abort_pipe_early(&self) -> bool {
        self.abort_pipe_early.unwrap_or(false)
    }

    /// Returns true if issue messages are left pending.
    pub fn is_defer_messages(&self) -> bool {
        self.defer_messages.unwrap_or(false)
    }

    /// This config with deferred message rendering switched on.
    pub fn deferring(&self) -> Cow<'_, Config> {
        if self.is_defer_messages() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(self.clone().with_deferred_messages(true))
        }
    }

    /// Layers this config over `lower`: every option set here wins, unset
    /// options are taken from `lower`.
    pub fn layered_over(&self, lower: &Config) -> Config {
        Config {
            lang: self.lang.clone().or_else(|| lower.lang.clone()),
            message: self.message.clone().or_else(|| lower.message.clone()),
            abort_early: self.abort_early.or(lower.abort_early),
            abort_pipe_early: self.abort_pipe_early.or(lower.abort_pipe_early),
            registry: self.registry.clone().or_else(|| lower.registry.clone()),
            defer_messages: self.defer_messages.or(lower.defer_messages),
        }
    }

    /// Picks the message for a new issue.
    ///
    /// Precedence: a message passed for this one issue, the message of the
    /// reporting schema or action, the run-wide message, the registered
    /// message for the issue type, the registered schema message (schema
    /// issues only), then the registered global message. `None` means the
    /// default text is kept.
    pub fn select_message(
        &self,
        kind: IssueKind,
        issue_type: &str,
        instance: Option<&Message>,
        explicit: Option<&Message>,
    ) -> Option<Message> {
        let lang = self.lang.as_deref();
        explicit
            .or(instance)
            .or(self.message.as_ref())
            .cloned()
            .or_else(|| {
                let registry = self.registry.as_ref()?;
                registry
                    .specific_message(issue_type, lang)
                    .or_else(|| match kind {
                        IssueKind::Schema => registry.schema_message(lang),
                        _ => None,
                    })
                    .or_else(|| registry.global_message(lang))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Issue, Value};

    fn render(message: Option<Message>) -> Option<String> {
        let issue = Issue {
            kind: IssueKind::Schema,
            issue_type: "string",
            input: Value::Null,
            expected: None,
            received: "null".to_string(),
            message: String::new(),
            requirement: None,
            path: None,
            issues: None,
            lang: None,
            pending: None,
        };
        message.map(|message| message.render(&issue))
    }

    #[test]
    fn test_layered_over_prefers_upper() {
        let lower = Config::new()
            .with_lang("en")
            .with_abort_early(true)
            .with_abort_pipe_early(true);
        let upper = Config::new().with_lang("de").with_abort_early(false);

        let merged = upper.layered_over(&lower);
        assert_eq!(merged.lang.as_deref(), Some("de"));
        assert!(!merged.is_abort_early());
        assert!(merged.is_abort_pipe_early());
    }

    #[test]
    fn test_select_message_precedence() {
        let registry = Arc::new(MessageRegistry::new());
        registry.set_global_message("global", Some("en"));
        registry.set_schema_message("schema", Some("en"));
        registry.set_specific_message("string", "specific", Some("en"));

        let config = Config::new().with_lang("en").with_registry(registry.clone());
        let instance = Message::text("instance");

        assert_eq!(
            render(config.select_message(IssueKind::Schema, "string", Some(&instance), None)),
            Some("instance".to_string())
        );
        assert_eq!(
            render(config.select_message(IssueKind::Schema, "string", None, None)),
            Some("specific".to_string())
        );

        registry.delete_specific_message("string", Some("en"));
        assert_eq!(
            render(config.select_message(IssueKind::Schema, "string", None, None)),
            Some("schema".to_string())
        );
        assert_eq!(
            render(config.select_message(IssueKind::Validation, "email", None, None)),
            Some("global".to_string())
        );

        let call_site = config.clone().with_message("call site");
        assert_eq!(
            render(call_site.select_message(IssueKind::Validation, "email", None, None)),
            Some("call site".to_string())
        );
    }

    #[test]
    fn test_deferring_is_layered() {
        let config = Config::new().with_lang("en");
        let deferred = config.deferring();
        assert!(deferred.is_defer_messages());
        assert!(matches!(deferred.deferring(), Cow::Borrowed(_)));

        let merged = Config::new().layered_over(&deferred);
        assert!(merged.is_defer_messages());
        assert_eq!(merged.lang.as_deref(), Some("en"));
        assert!(!config.is_defer_messages());
    }

    #[test]
    fn test_select_message_without_registry() {
        let config = Config::new();
        assert!(config
            .select_message(IssueKind::Schema, "string", None, None)
            .is_none());
    }
}
