//! Schemas and the contract they share.
//!
//! A [`Schema`] is an immutable value: a [`SchemaKind`] (the base check) plus
//! an optional instance message, pipe, fallback value and instance config.
//! Running a schema performs the base check, runs the pipe over a typed
//! result and finally substitutes the fallback if the run failed.
//!
//! Schemas are cheap to clone; kinds are shared behind an `Arc`.

mod array;
mod collection;
mod intersect;
mod object;
mod primitive;
mod union;
mod wrapper;

pub use array::*;
pub use collection::*;
pub use intersect::*;
pub use object::*;
pub use primitive::*;
pub use union::*;
pub use wrapper::*;

use array::{run_array, run_array_async};
use collection::{run_map, run_map_async, run_record, run_record_async, run_set, run_set_async};
use intersect::{run_intersect, run_intersect_async};
use primitive::{run_leaf, run_leaf_async};
use union::{run_union, run_union_async};
use wrapper::rejects_nullish;

use crate::{PipeItem, run_pipe, run_pipe_async};
use futures::FutureExt;
use futures::future::BoxFuture;
use sift_core::{Config, Dataset, IssueContext, IssueInfo, Message, Value};
use std::borrow::Cow;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

/// The base check of a schema.
///
/// A closed set: container schemas match on it exhaustively when they
/// recurse.
pub enum SchemaKind {
    /// Accepts anything
    Any,
    /// Accepts anything
    Unknown,
    /// Accepts nothing
    Never,
    /// Accepts `null`
    Null,
    /// Accepts `undefined`
    Undefined,
    /// Accepts booleans
    Boolean,
    /// Accepts numbers other than NaN
    Number,
    /// Accepts big integers
    BigInt,
    /// Accepts strings
    String,
    /// Accepts dates
    Date,
    /// Accepts one exact value
    Literal(Value),
    /// Accepts one of a list of values
    Picklist(Vec<Value>),
    /// Accepts the values of named members
    Enum(Vec<(String, Value)>),
    /// Accepts what a user predicate accepts
    Custom(CustomCheck),
    /// Accepts `undefined` or the wrapped schema
    Optional(Wrapped),
    /// Accepts `null` or the wrapped schema
    Nullable(Wrapped),
    /// Accepts `null`, `undefined` or the wrapped schema
    Nullish(Wrapped),
    /// Rejects `undefined`, otherwise runs the wrapped schema
    NonOptional(Schema),
    /// Rejects `null`, otherwise runs the wrapped schema
    NonNullable(Schema),
    /// Rejects `null` and `undefined`, otherwise runs the wrapped schema
    NonNullish(Schema),
    /// Builds the schema to run from the input, for recursive shapes
    Lazy(Arc<Getter>),
    /// Objects with declared entries
    Object(ObjectSchema),
    /// Arrays of one item type
    Array(Schema),
    /// Fixed position arrays
    Tuple(TupleSchema),
    /// Objects with arbitrary keys
    Record(EntrySchemas),
    /// Maps with arbitrary keys
    Map(EntrySchemas),
    /// Sets of one member type
    Set(Schema),
    /// First matching option
    Union(Vec<Schema>),
    /// Option selected by a discriminator key
    Variant(VariantSchema),
    /// Every option at once
    Intersect(Vec<Schema>),
}

type Getter = dyn Fn(&Value) -> Schema + Send + Sync;

impl SchemaKind {
    /// Returns the schema type used as issue type.
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaKind::Any => "any",
            SchemaKind::Unknown => "unknown",
            SchemaKind::Never => "never",
            SchemaKind::Null => "null",
            SchemaKind::Undefined => "undefined",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Number => "number",
            SchemaKind::BigInt => "bigint",
            SchemaKind::String => "string",
            SchemaKind::Date => "date",
            SchemaKind::Literal(_) => "literal",
            SchemaKind::Picklist(_) => "picklist",
            SchemaKind::Enum(_) => "enum",
            SchemaKind::Custom(_) => "custom",
            SchemaKind::Optional(_) => "optional",
            SchemaKind::Nullable(_) => "nullable",
            SchemaKind::Nullish(_) => "nullish",
            SchemaKind::NonOptional(_) => "non_optional",
            SchemaKind::NonNullable(_) => "non_nullable",
            SchemaKind::NonNullish(_) => "non_nullish",
            SchemaKind::Lazy(_) => "lazy",
            SchemaKind::Object(object) => object.mode.type_name(),
            SchemaKind::Array(_) => "array",
            SchemaKind::Tuple(tuple) => tuple.mode.type_name(),
            SchemaKind::Record(_) => "record",
            SchemaKind::Map(_) => "map",
            SchemaKind::Set(_) => "set",
            SchemaKind::Union(_) => "union",
            SchemaKind::Variant(_) => "variant",
            SchemaKind::Intersect(_) => "intersect",
        }
    }

    /// Describes the accepted shape.
    pub fn expects(&self) -> String {
        match self {
            SchemaKind::Any
            | SchemaKind::Unknown
            | SchemaKind::Never
            | SchemaKind::Null
            | SchemaKind::Undefined
            | SchemaKind::Boolean
            | SchemaKind::Number
            | SchemaKind::BigInt
            | SchemaKind::String => self.type_name().to_string(),
            SchemaKind::Date => "Date".to_string(),
            SchemaKind::Literal(literal) => literal.describe(),
            SchemaKind::Picklist(options) => {
                join_expects(options.iter().map(Value::describe), "|")
            }
            SchemaKind::Enum(members) => {
                join_expects(members.iter().map(|(_, value)| value.describe()), "|")
            }
            SchemaKind::Custom(_) | SchemaKind::Lazy(_) => "unknown".to_string(),
            SchemaKind::Optional(wrapped) => {
                join_expects([wrapped.schema.expects(), "undefined".to_string()], "|")
            }
            SchemaKind::Nullable(wrapped) => {
                join_expects([wrapped.schema.expects(), "null".to_string()], "|")
            }
            SchemaKind::Nullish(wrapped) => join_expects(
                [
                    wrapped.schema.expects(),
                    "null".to_string(),
                    "undefined".to_string(),
                ],
                "|",
            ),
            SchemaKind::NonOptional(_) => "!undefined".to_string(),
            SchemaKind::NonNullable(_) => "!null".to_string(),
            SchemaKind::NonNullish(_) => "(!null & !undefined)".to_string(),
            SchemaKind::Object(_) | SchemaKind::Record(_) | SchemaKind::Variant(_) => {
                "Object".to_string()
            }
            SchemaKind::Array(_) | SchemaKind::Tuple(_) => "Array".to_string(),
            SchemaKind::Map(_) => "Map".to_string(),
            SchemaKind::Set(_) => "Set".to_string(),
            SchemaKind::Union(options) => {
                join_expects(options.iter().map(Schema::expects), "|")
            }
            SchemaKind::Intersect(options) => {
                join_expects(options.iter().map(Schema::expects), "&")
            }
        }
    }
}

impl fmt::Debug for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.type_name(), self.expects())
    }
}

/// Joins the distinct expectations of several schemas.
///
/// One expectation is returned bare, several are parenthesized
/// (`(a | b)`), none yield `never`.
pub fn join_expects(values: impl IntoIterator<Item = String>, separator: &str) -> String {
    let mut distinct: Vec<String> = Vec::new();
    for value in values {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }
    match distinct.len() {
        0 => "never".to_string(),
        1 => distinct.remove(0),
        _ => format!("({})", distinct.join(&format!(" {separator} "))),
    }
}

/// An immutable, reusable validator.
///
/// # Example
///
/// ```rust
/// use sift_schema::{min_length, object, string, number, safe_parse};
/// use sift_core::Value;
/// use serde_json::json;
///
/// let user = object([
///     ("name", string().pipe([min_length(1)])),
///     ("age", number()),
/// ]);
///
/// let result = safe_parse(&user, Value::from(json!({"name": "Ada", "age": 36})), None);
/// assert!(result.success);
/// ```
#[derive(Clone)]
pub struct Schema {
    kind: Arc<SchemaKind>,
    message: Option<Message>,
    pipe: Vec<PipeItem>,
    fallback: Option<Value>,
    defaults: Option<Config>,
}

impl Schema {
    /// Creates a schema with the given base check.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind: Arc::new(kind),
            message: None,
            pipe: Vec::new(),
            fallback: None,
            defaults: None,
        }
    }

    /// Sets the message reported by the base check.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Appends items to the pipe.
    pub fn pipe(mut self, items: impl IntoIterator<Item = PipeItem>) -> Self {
        self.pipe.extend(items);
        self
    }

    /// Replaces a failed run with a successful one holding `fallback`.
    pub fn with_fallback(mut self, fallback: impl Into<Value>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Sets config defaults layered under the caller's config.
    pub fn with_config(mut self, defaults: Config) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Returns the base check.
    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    /// Returns the schema type (e.g. `string`, `strict_object`).
    pub fn schema_type(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Describes the accepted shape.
    pub fn expects(&self) -> String {
        self.kind.expects()
    }

    /// Returns the pipe items.
    pub fn pipe_items(&self) -> &[PipeItem] {
        &self.pipe
    }

    /// Returns the fallback value.
    pub fn fallback(&self) -> Option<&Value> {
        self.fallback.as_ref()
    }

    /// Returns the instance config defaults.
    pub fn defaults(&self) -> Option<&Config> {
        self.defaults.as_ref()
    }

    /// Returns the title attached through the pipe.
    pub fn title(&self) -> Option<&str> {
        self.metadata("title")
    }

    /// Returns the description attached through the pipe.
    pub fn description(&self) -> Option<&str> {
        self.metadata("description")
    }

    fn metadata(&self, metadata_type: &str) -> Option<&str> {
        self.pipe.iter().rev().find_map(|item| match item {
            PipeItem::Metadata(metadata) if metadata.metadata_type == metadata_type => {
                Some(metadata.value.as_str())
            }
            _ => None,
        })
    }

    /// Returns true if running this schema needs the async entry points.
    ///
    /// Lazy schemas are only known once they see their input and count as
    /// synchronous.
    pub fn is_async(&self) -> bool {
        self.pipe.iter().any(PipeItem::is_async) || self.kind_is_async()
    }

    fn kind_is_async(&self) -> bool {
        match self.kind.as_ref() {
            SchemaKind::Custom(check) => check.is_async(),
            SchemaKind::Optional(wrapped)
            | SchemaKind::Nullable(wrapped)
            | SchemaKind::Nullish(wrapped) => wrapped.schema.is_async(),
            SchemaKind::NonOptional(schema)
            | SchemaKind::NonNullable(schema)
            | SchemaKind::NonNullish(schema)
            | SchemaKind::Array(schema)
            | SchemaKind::Set(schema) => schema.is_async(),
            SchemaKind::Object(object) => object.is_async(),
            SchemaKind::Tuple(tuple) => tuple.is_async(),
            SchemaKind::Record(entry) | SchemaKind::Map(entry) => {
                entry.key.is_async() || entry.value.is_async()
            }
            SchemaKind::Union(options) | SchemaKind::Intersect(options) => {
                options.iter().any(Schema::is_async)
            }
            SchemaKind::Variant(variant) => variant.options.iter().any(Schema::is_async),
            _ => false,
        }
    }

    /// Returns true if object entries of this schema may be absent.
    pub(crate) fn accepts_absent(&self) -> bool {
        matches!(
            self.kind.as_ref(),
            SchemaKind::Optional(_) | SchemaKind::Nullish(_)
        )
    }

    /// Returns the default substituted for an absent object entry.
    pub(crate) fn absent_default(&self) -> Option<Value> {
        match self.kind.as_ref() {
            SchemaKind::Optional(wrapped) | SchemaKind::Nullish(wrapped) => {
                wrapped.default.as_ref().map(DefaultValue::resolve)
            }
            _ => None,
        }
    }

    /// Reports a schema issue on behalf of this schema.
    pub(crate) fn report(
        &self,
        dataset: &mut Dataset,
        label: &str,
        config: &Config,
        info: IssueInfo,
    ) {
        let context = IssueContext::schema(self.schema_type(), self.expects(), self.message.as_ref());
        dataset.add_issue(&context, label, config, info);
    }

    /// Reports a type mismatch of `input`.
    pub(crate) fn type_issue(&self, input: Value, config: &Config) -> Dataset {
        let mut dataset = Dataset::untyped(input);
        self.report(&mut dataset, "type", config, IssueInfo::default());
        dataset
    }

    fn scoped<'a>(&self, config: &'a Config) -> Cow<'a, Config> {
        let config = match &self.defaults {
            Some(defaults) => Cow::Owned(config.layered_over(defaults)),
            None => Cow::Borrowed(config),
        };
        // Issues of a schema with a fallback never surface.
        if self.fallback.is_some() && !config.is_defer_messages() {
            return Cow::Owned(config.into_owned().with_deferred_messages(true));
        }
        config
    }

    fn finish(&self, dataset: Dataset) -> Dataset {
        match &self.fallback {
            Some(fallback) if dataset.has_issues() => Dataset::success(fallback.clone()),
            _ => dataset,
        }
    }

    /// Runs the schema over `input`.
    ///
    /// # Panics
    ///
    /// Panics if the schema contains an asynchronous check or transformation;
    /// use [`Schema::run_async`] for those.
    pub fn run(&self, input: Value, config: &Config) -> Dataset {
        let config = self.scoped(config);
        let mut dataset = self.run_kind(input, &config);
        if dataset.typed && !self.pipe.is_empty() {
            dataset = run_pipe(&self.pipe, dataset, &config);
        }
        self.finish(dataset)
    }

    /// Runs the schema over `input`, awaiting asynchronous steps one at a
    /// time.
    pub fn run_async<'a>(&'a self, input: Value, config: &'a Config) -> BoxFuture<'a, Dataset> {
        async move {
            let config = self.scoped(config);
            let mut dataset = self.run_kind_async(input, &config).await;
            if dataset.typed && !self.pipe.is_empty() {
                dataset = run_pipe_async(&self.pipe, dataset, &config).await;
            }
            self.finish(dataset)
        }
        .boxed()
    }

    fn run_kind(&self, input: Value, config: &Config) -> Dataset {
        match self.kind.as_ref() {
            SchemaKind::Optional(wrapped)
            | SchemaKind::Nullable(wrapped)
            | SchemaKind::Nullish(wrapped) => match wrapped.admit(self.kind(), input) {
                ControlFlow::Break(dataset) => dataset,
                ControlFlow::Continue(input) => wrapped.schema.run(input, config),
            },
            SchemaKind::NonOptional(inner)
            | SchemaKind::NonNullable(inner)
            | SchemaKind::NonNullish(inner) => {
                if rejects_nullish(self.kind(), &input) {
                    self.type_issue(input, config)
                } else {
                    inner.run(input, config)
                }
            }
            SchemaKind::Lazy(getter) => getter(&input).run(input, config),
            SchemaKind::Object(object) => object.run(self, input, config),
            SchemaKind::Array(item) => run_array(self, item, input, config),
            SchemaKind::Tuple(tuple) => tuple.run(self, input, config),
            SchemaKind::Record(entry) => run_record(self, entry, input, config),
            SchemaKind::Map(entry) => run_map(self, entry, input, config),
            SchemaKind::Set(member) => run_set(self, member, input, config),
            SchemaKind::Union(options) => run_union(self, options, input, config),
            SchemaKind::Variant(variant) => variant.run(self, input, config),
            SchemaKind::Intersect(options) => run_intersect(self, options, input, config),
            leaf => run_leaf(self, leaf, input, config),
        }
    }

    async fn run_kind_async(&self, input: Value, config: &Config) -> Dataset {
        match self.kind.as_ref() {
            SchemaKind::Optional(wrapped)
            | SchemaKind::Nullable(wrapped)
            | SchemaKind::Nullish(wrapped) => match wrapped.admit(self.kind(), input) {
                ControlFlow::Break(dataset) => dataset,
                ControlFlow::Continue(input) => wrapped.schema.run_async(input, config).await,
            },
            SchemaKind::NonOptional(inner)
            | SchemaKind::NonNullable(inner)
            | SchemaKind::NonNullish(inner) => {
                if rejects_nullish(self.kind(), &input) {
                    self.type_issue(input, config)
                } else {
                    inner.run_async(input, config).await
                }
            }
            SchemaKind::Lazy(getter) => {
                let schema = getter(&input);
                schema.run_async(input, config).await
            }
            SchemaKind::Object(object) => object.run_async(self, input, config).await,
            SchemaKind::Array(item) => run_array_async(self, item, input, config).await,
            SchemaKind::Tuple(tuple) => tuple.run_async(self, input, config).await,
            SchemaKind::Record(entry) => run_record_async(self, entry, input, config).await,
            SchemaKind::Map(entry) => run_map_async(self, entry, input, config).await,
            SchemaKind::Set(member) => run_set_async(self, member, input, config).await,
            SchemaKind::Union(options) => run_union_async(self, options, input, config).await,
            SchemaKind::Variant(variant) => variant.run_async(self, input, config).await,
            SchemaKind::Intersect(options) => {
                run_intersect_async(self, options, input, config).await
            }
            leaf => run_leaf_async(self, leaf, input, config).await,
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type", &self.schema_type())
            .field("expects", &self.expects())
            .field("pipe", &self.pipe)
            .field("fallback", &self.fallback)
            .finish()
    }
}
