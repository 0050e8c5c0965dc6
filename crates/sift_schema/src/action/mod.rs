//! Pipe items: validations, transformations and metadata.
//!
//! Every item is an immutable value built by a factory function
//! ([`min_length`], [`trim`], [`title`], ...). Items are appended to a schema
//! with [`Schema::pipe`](crate::Schema::pipe) and run in declared order by the
//! pipe engine once the schema's base check has typed the value.

mod transformations;
mod validations;

pub use transformations::*;
pub use validations::*;

use futures::future::BoxFuture;
use sift_core::{Config, Dataset, IssueContext, IssueInfo, IssueKind, Message, Value};
use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn(&Value) -> Result<(), Rejection> + Send + Sync;
type RawPredicate = dyn Fn(&Value, &mut RawIssues) + Send + Sync;
type AsyncPredicate = dyn Fn(Value) -> BoxFuture<'static, Result<(), Rejection>> + Send + Sync;
type Mapping = dyn Fn(Value) -> Result<Value, Rejection> + Send + Sync;
type RawMapping = dyn Fn(Value, &mut RawIssues) -> Value + Send + Sync;
type AsyncMapping = dyn Fn(Value) -> BoxFuture<'static, Value> + Send + Sync;

/// One step of a schema's pipe.
#[derive(Clone)]
pub enum PipeItem {
    /// Inspects the value and may report an issue
    Validation(Validation),
    /// Replaces the value
    Transformation(Transformation),
    /// Describes the schema; ignored when running
    Metadata(Metadata),
}

impl PipeItem {
    /// Sets the message reported by this item.
    ///
    /// Metadata items have no message and are returned unchanged.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        match &mut self {
            PipeItem::Validation(validation) => validation.spec.message = Some(message.into()),
            PipeItem::Transformation(transformation) => {
                transformation.spec.message = Some(message.into())
            }
            PipeItem::Metadata(_) => {}
        }
        self
    }

    /// Returns the item type (e.g. `min_length`, `trim`, `title`).
    pub fn item_type(&self) -> &'static str {
        match self {
            PipeItem::Validation(validation) => validation.spec.action_type,
            PipeItem::Transformation(transformation) => transformation.spec.action_type,
            PipeItem::Metadata(metadata) => metadata.metadata_type,
        }
    }

    /// Returns the item's expectation, if it has one.
    pub fn expects(&self) -> Option<&str> {
        match self {
            PipeItem::Validation(validation) => validation.spec.expects.as_deref(),
            PipeItem::Transformation(transformation) => transformation.spec.expects.as_deref(),
            PipeItem::Metadata(_) => None,
        }
    }

    /// Returns the item's parameter, if it has one.
    pub fn requirement(&self) -> Option<&Value> {
        match self {
            PipeItem::Validation(validation) => validation.spec.requirement.as_ref(),
            PipeItem::Transformation(transformation) => transformation.spec.requirement.as_ref(),
            PipeItem::Metadata(_) => None,
        }
    }

    /// Returns true if the item can only run asynchronously.
    pub fn is_async(&self) -> bool {
        match self {
            PipeItem::Validation(validation) => matches!(validation.check, Check::Async(_)),
            PipeItem::Transformation(transformation) => {
                matches!(transformation.operation, Operation::Async(_))
            }
            PipeItem::Metadata(_) => false,
        }
    }
}

impl fmt::Debug for PipeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipeItem::Validation(validation) => f
                .debug_tuple("Validation")
                .field(&validation.spec)
                .finish(),
            PipeItem::Transformation(transformation) => f
                .debug_tuple("Transformation")
                .field(&transformation.spec)
                .finish(),
            PipeItem::Metadata(metadata) => f.debug_tuple("Metadata").field(metadata).finish(),
        }
    }
}

/// Identity shared by validations and transformations.
#[derive(Debug, Clone)]
pub struct ActionSpec {
    /// Issue type (e.g. `min_length`)
    pub action_type: &'static str,

    /// Word used in the default message (`Invalid <label>: ...`)
    pub label: &'static str,

    /// Description of what the action accepts
    pub expects: Option<String>,

    /// Parameter of the action
    pub requirement: Option<Value>,

    /// Instance message
    pub message: Option<Message>,
}

impl ActionSpec {
    fn new(action_type: &'static str, label: &'static str) -> Self {
        Self {
            action_type,
            label,
            expects: None,
            requirement: None,
            message: None,
        }
    }

    fn expects(mut self, expects: impl Into<String>) -> Self {
        self.expects = Some(expects.into());
        self
    }

    fn requirement(mut self, requirement: impl Into<Value>) -> Self {
        self.requirement = Some(requirement.into());
        self
    }

    fn report(&self, kind: IssueKind, dataset: &mut Dataset, config: &Config, info: IssueInfo) {
        let context = IssueContext {
            kind,
            issue_type: self.action_type,
            expects: self.expects.clone(),
            message: self.message.as_ref(),
            requirement: self.requirement.clone(),
        };
        dataset.add_issue(&context, self.label, config, info);
    }
}

/// Reason a check or mapping rejected its input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rejection {
    /// Text reported as `received`; the input is described when absent
    pub received: Option<String>,
}

impl Rejection {
    /// Creates a rejection that describes the input as received.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rejection with a custom `received` text.
    pub fn received(received: impl Into<String>) -> Self {
        Self {
            received: Some(received.into()),
        }
    }

    fn into_info(self) -> IssueInfo {
        IssueInfo {
            received: self.received,
            ..IssueInfo::default()
        }
    }
}

/// Issues collected by raw checks and raw transformations.
#[derive(Debug, Default)]
pub struct RawIssues {
    issues: Vec<IssueInfo>,
}

impl RawIssues {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an issue with full control over its fields.
    pub fn add(&mut self, info: IssueInfo) {
        self.issues.push(info);
    }

    /// Adds an issue carrying only a message.
    pub fn add_message(&mut self, message: impl Into<Message>) {
        self.issues.push(IssueInfo::with_message(message));
    }

    /// Returns true if nothing was added.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns the number of added issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }
}

/// How a validation inspects the value.
#[derive(Clone)]
pub enum Check {
    /// Synchronous predicate
    Predicate(Arc<Predicate>),
    /// Synchronous check adding any number of issues
    Raw(Arc<RawPredicate>),
    /// Predicate that must be awaited
    Async(Arc<AsyncPredicate>),
}

/// A pipe step that may report issues but never changes the value.
#[derive(Clone)]
pub struct Validation {
    /// Identity of the validation
    pub spec: ActionSpec,
    check: Check,
}

impl Validation {
    /// Creates a validation from a predicate.
    pub fn new<F>(spec: ActionSpec, predicate: F) -> Self
    where
        F: Fn(&Value) -> Result<(), Rejection> + Send + Sync + 'static,
    {
        Self {
            spec,
            check: Check::Predicate(Arc::new(predicate)),
        }
    }

    /// Runs the validation.
    ///
    /// # Panics
    ///
    /// Panics if the validation is asynchronous.
    pub fn run(&self, dataset: &mut Dataset, config: &Config) {
        match &self.check {
            Check::Predicate(predicate) => {
                if let Err(rejection) = predicate(&dataset.value) {
                    self.spec
                        .report(IssueKind::Validation, dataset, config, rejection.into_info());
                }
            }
            Check::Raw(check) => {
                let mut raw = RawIssues::new();
                check(&dataset.value, &mut raw);
                for info in raw.issues {
                    self.spec.report(IssueKind::Validation, dataset, config, info);
                }
            }
            Check::Async(_) => panic!(
                "validation `{}` is asynchronous and cannot run synchronously",
                self.spec.action_type
            ),
        }
    }

    /// Runs the validation, awaiting asynchronous predicates.
    pub async fn run_async(&self, dataset: &mut Dataset, config: &Config) {
        match &self.check {
            Check::Async(predicate) => {
                if let Err(rejection) = predicate(dataset.value.clone()).await {
                    self.spec
                        .report(IssueKind::Validation, dataset, config, rejection.into_info());
                }
            }
            _ => self.run(dataset, config),
        }
    }
}

/// How a transformation computes the new value.
#[derive(Clone)]
pub enum Operation {
    /// Synchronous mapping; a rejection reports an issue
    Map(Arc<Mapping>),
    /// Synchronous mapping adding any number of issues
    Raw(Arc<RawMapping>),
    /// Mapping that must be awaited
    Async(Arc<AsyncMapping>),
}

/// A pipe step that replaces the value.
#[derive(Clone)]
pub struct Transformation {
    /// Identity of the transformation
    pub spec: ActionSpec,
    operation: Operation,
}

impl Transformation {
    /// Creates a transformation from a fallible mapping.
    pub fn new<F>(spec: ActionSpec, mapping: F) -> Self
    where
        F: Fn(Value) -> Result<Value, Rejection> + Send + Sync + 'static,
    {
        Self {
            spec,
            operation: Operation::Map(Arc::new(mapping)),
        }
    }

    /// Runs the transformation.
    ///
    /// A rejected mapping, or a raw mapping that adds issues, leaves the value
    /// unchanged and marks the dataset untyped.
    ///
    /// # Panics
    ///
    /// Panics if the transformation is asynchronous.
    pub fn run(&self, dataset: &mut Dataset, config: &Config) {
        match &self.operation {
            Operation::Map(mapping) => match mapping(dataset.value.clone()) {
                Ok(value) => dataset.value = value,
                Err(rejection) => {
                    self.spec.report(
                        IssueKind::Transformation,
                        dataset,
                        config,
                        rejection.into_info(),
                    );
                    dataset.typed = false;
                }
            },
            Operation::Raw(mapping) => {
                let mut raw = RawIssues::new();
                let output = mapping(dataset.value.clone(), &mut raw);
                if raw.is_empty() {
                    dataset.value = output;
                } else {
                    for info in raw.issues {
                        self.spec
                            .report(IssueKind::Transformation, dataset, config, info);
                    }
                    dataset.typed = false;
                }
            }
            Operation::Async(_) => panic!(
                "transformation `{}` is asynchronous and cannot run synchronously",
                self.spec.action_type
            ),
        }
    }

    /// Runs the transformation, awaiting asynchronous mappings.
    pub async fn run_async(&self, dataset: &mut Dataset, config: &Config) {
        match &self.operation {
            Operation::Async(mapping) => dataset.value = mapping(dataset.value.clone()).await,
            _ => self.run(dataset, config),
        }
    }
}

/// Descriptive information attached to a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Metadata type (`title` or `description`)
    pub metadata_type: &'static str,

    /// The attached text
    pub value: String,
}

/// Attaches a title to a schema.
pub fn title(title: impl Into<String>) -> PipeItem {
    PipeItem::Metadata(Metadata {
        metadata_type: "title",
        value: title.into(),
    })
}

/// Attaches a description to a schema.
pub fn description(description: impl Into<String>) -> PipeItem {
    PipeItem::Metadata(Metadata {
        metadata_type: "description",
        value: description.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_sets_instance_message() {
        let item = min_length(3).message("too short");
        let mut dataset = Dataset::success(Value::from("ab"));
        if let PipeItem::Validation(validation) = &item {
            validation.run(&mut dataset, &Config::new());
        }
        assert_eq!(dataset.issues.expect("issue")[0].message, "too short");
    }

    #[test]
    fn test_metadata_ignores_message() {
        let item = title("Name").message("ignored");
        assert_eq!(item.item_type(), "title");
        assert!(item.expects().is_none());
    }

    #[test]
    fn test_is_async() {
        assert!(!trim().is_async());
        assert!(check_async(|_| async { true }).is_async());
        assert!(transform_async(|value| async move { value }).is_async());
    }

    #[test]
    #[should_panic(expected = "asynchronous")]
    fn test_async_validation_panics_when_run_synchronously() {
        let item = check_async(|_| async { true });
        let mut dataset = Dataset::success(Value::Null);
        if let PipeItem::Validation(validation) = &item {
            validation.run(&mut dataset, &Config::new());
        }
    }
}
