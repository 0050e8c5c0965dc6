//! Datasets: the outcome of running a schema or pipe step.

use crate::{Config, Issue, IssueKind, Message, PathItem, Value};

/// Result of running a schema or a pipe step over a value.
///
/// A dataset without issues is an unconditional success. A dataset may be
/// `typed` and still carry issues, e.g. an object whose shape matched but
/// whose fields failed; such a dataset counts as failed for short-circuiting.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// The value's fundamental shape matched the schema
    pub typed: bool,

    /// The (possibly transformed) value
    pub value: Value,

    /// Every problem recorded so far, in traversal order
    pub issues: Option<Vec<Issue>>,
}

impl Dataset {
    /// Creates a dataset for an input that has not been checked yet.
    pub fn untyped(value: Value) -> Self {
        Self {
            typed: false,
            value,
            issues: None,
        }
    }

    /// Creates a successful dataset.
    pub fn success(value: Value) -> Self {
        Self {
            typed: true,
            value,
            issues: None,
        }
    }

    /// Creates a dataset holding a single issue.
    pub fn failure(value: Value, typed: bool, issue: Issue) -> Self {
        Self {
            typed,
            value,
            issues: Some(vec![issue]),
        }
    }

    /// Returns true if the value is typed and no issue was recorded.
    pub fn is_success(&self) -> bool {
        self.typed && self.issues.is_none()
    }

    /// Returns true if any issue was recorded.
    pub fn has_issues(&self) -> bool {
        self.issues.is_some()
    }

    /// Returns the number of recorded issues.
    pub fn issue_count(&self) -> usize {
        self.issues.as_ref().map_or(0, Vec::len)
    }

    /// Renders every message left pending by a deferred run.
    pub fn render_messages(&mut self) {
        for issue in self.issues.iter_mut().flatten() {
            issue.render_message();
        }
    }

    /// Appends an already built issue.
    pub fn push_issue(&mut self, issue: Issue) {
        self.issues.get_or_insert_with(Vec::new).push(issue);
    }

    /// Appends child issues, prefixing each path with the container's item.
    pub fn merge_issues(&mut self, item: &PathItem, issues: Vec<Issue>) {
        let target = self.issues.get_or_insert_with(Vec::new);
        for mut issue in issues {
            issue.prepend_path(item.clone());
            target.push(issue);
        }
    }

    /// Reports a new issue on behalf of `context`.
    ///
    /// `label` names what was invalid in the default message
    /// (`Invalid <label>: Expected <expected> but received <received>`).
    /// Unless overridden by `info`, the issue's input is the current value,
    /// `expected` comes from the context and `received` describes the input.
    /// Schema issues also mark the dataset untyped. Under
    /// [`Config::defer_messages`] the selected message is kept on the issue
    /// and rendered by [`Dataset::render_messages`].
    pub fn add_issue(
        &mut self,
        context: &IssueContext<'_>,
        label: &str,
        config: &Config,
        info: IssueInfo,
    ) {
        let input = info.input.unwrap_or_else(|| self.value.clone());
        let expected = info.expected.or_else(|| context.expects.clone());
        let received = info.received.unwrap_or_else(|| input.describe());
        let message = match &expected {
            Some(expected) => {
                format!("Invalid {label}: Expected {expected} but received {received}")
            }
            None => format!("Invalid {label}: Received {received}"),
        };

        let mut issue = Issue {
            kind: context.kind,
            issue_type: context.issue_type,
            input,
            expected,
            received,
            message,
            requirement: context.requirement.clone(),
            path: info.path,
            issues: info.issues,
            lang: config.lang.clone(),
            pending: config.select_message(
                context.kind,
                context.issue_type,
                context.message,
                info.message.as_ref(),
            ),
        };
        if !config.is_defer_messages() {
            issue.render_message();
        }

        if context.kind == IssueKind::Schema {
            self.typed = false;
        }
        self.push_issue(issue);
    }
}

/// Identity of the schema or action reporting an issue.
#[derive(Debug, Clone)]
pub struct IssueContext<'a> {
    /// Issue category
    pub kind: IssueKind,

    /// Schema or action type
    pub issue_type: &'static str,

    /// Default `expected` text
    pub expects: Option<String>,

    /// Message given to the schema or action instance
    pub message: Option<&'a Message>,

    /// Parameter of the action
    pub requirement: Option<Value>,
}

impl<'a> IssueContext<'a> {
    /// Creates the context of a schema.
    pub fn schema(issue_type: &'static str, expects: String, message: Option<&'a Message>) -> Self {
        Self {
            kind: IssueKind::Schema,
            issue_type,
            expects: Some(expects),
            message,
            requirement: None,
        }
    }
}

/// Per-issue overrides for [`Dataset::add_issue`].
#[derive(Debug, Clone, Default)]
pub struct IssueInfo {
    /// Offending value, instead of the dataset's value
    pub input: Option<Value>,

    /// Expected text, instead of the context's
    pub expected: Option<String>,

    /// Received text, instead of describing the input
    pub received: Option<String>,

    /// Message for this one issue
    pub message: Option<Message>,

    /// Path of the issue
    pub path: Option<Vec<PathItem>>,

    /// Nested issues, for union-like schemas
    pub issues: Option<Vec<Issue>>,
}

impl IssueInfo {
    /// Creates overrides carrying only a message.
    pub fn with_message(message: impl Into<Message>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}
