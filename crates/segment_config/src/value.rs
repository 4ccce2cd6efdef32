//! Dynamic option values.
//!
//! Hosts configure the client either through typed setters or through
//! loosely-typed records (an injected JSON config, for instance). Both paths
//! funnel into [`OptionValue`], which the validators inspect before anything
//! is committed.
//!
//! Two option kinds carry behaviour rather than data:
//!
//! - [`Condition`]: a predicate gating forwarded calls, either ready to call
//!   or in an injectable form that names the services it needs.
//! - [`LoggerRef`]: where debug statements are sent.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A resolved gate predicate, called with the method name and its arguments.
///
/// An `Err` means the predicate itself failed; callers surface it rather than
/// treating it as `false`.
pub type Predicate = Arc<dyn Fn(&str, &[Value]) -> anyhow::Result<bool> + Send + Sync>;

/// Builds a [`Predicate`] once its named dependencies are available.
pub type ConditionFactory = Arc<dyn Fn(&Dependencies) -> anyhow::Result<Predicate> + Send + Sync>;

/// A logging function, called as `(level, message, extra)`.
pub type LogFn = Arc<dyn Fn(&str, &str, &[Value]) + Send + Sync>;

/// A logger object exposing named methods (`log`, `info`, ...).
pub trait LogObject: Send + Sync {
    /// Returns `true` if `name` is a method this logger can be called with.
    fn has_method(&self, name: &str) -> bool;

    /// Invoke `method` with a message and any extra values.
    fn call(&self, method: &str, message: &str, extra: &[Value]);
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// Predicate deciding whether a tracked call reaches the analytics library.
#[derive(Clone)]
pub enum Condition {
    /// A predicate that can be called as-is.
    Predicate(Predicate),
    /// A predicate that must first be resolved against host services.
    Injectable(InjectableCondition),
}

impl Condition {
    /// Wrap a plain predicate.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &[Value]) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Build an injectable condition from dependency names and a factory
    /// that turns the resolved dependencies into a predicate.
    pub fn injectable<I, S, F>(dependencies: I, factory: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Dependencies) -> anyhow::Result<Predicate> + Send + Sync + 'static,
    {
        Self::Injectable(InjectableCondition {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            factory: Arc::new(factory),
        })
    }

    /// Returns `true` if this condition can be evaluated without resolution.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Predicate(_))
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("Condition::Predicate(..)"),
            Self::Injectable(inner) => f
                .debug_struct("Condition::Injectable")
                .field("dependencies", &inner.dependencies)
                .finish_non_exhaustive(),
        }
    }
}

/// The unresolved form of a [`Condition`]: service names plus a factory.
#[derive(Clone)]
pub struct InjectableCondition {
    /// Names of the host services the factory needs, in order.
    pub dependencies: Vec<String>,
    factory: ConditionFactory,
}

impl InjectableCondition {
    /// Run the factory against resolved dependencies.
    ///
    /// # Errors
    ///
    /// Propagates whatever the factory returns.
    pub fn resolve(&self, dependencies: &Dependencies) -> anyhow::Result<Predicate> {
        (self.factory)(dependencies)
    }
}

/// Named services handed to an [`InjectableCondition`] factory.
#[derive(Clone, Default)]
pub struct Dependencies {
    entries: Vec<(String, Arc<dyn Any + Send + Sync>)>,
}

impl Dependencies {
    /// Create an empty dependency set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named service.
    pub fn insert(&mut self, name: impl Into<String>, service: Arc<dyn Any + Send + Sync>) {
        self.entries.push((name.into(), service));
    }

    /// Fetch a service by name, downcast to `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, service)| Arc::clone(service).downcast::<T>().ok())
    }

    /// Number of resolved services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no services were resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Reference to the sink debug statements are written to.
#[derive(Clone, Default)]
pub enum LoggerRef {
    /// The built-in `tracing` logger.
    #[default]
    Default,
    /// A logger registered as a host service under this name.
    Named(String),
    /// A bare function.
    Callable(LogFn),
    /// An object with named methods; `debugLevel` selects the method.
    Object(Arc<dyn LogObject>),
}

impl LoggerRef {
    /// Wrap a logging function.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&str, &str, &[Value]) + Send + Sync + 'static,
    {
        Self::Callable(Arc::new(f))
    }

    /// Wrap a logger object.
    pub fn object<L: LogObject + 'static>(logger: L) -> Self {
        Self::Object(Arc::new(logger))
    }

    /// Short description used in snapshots and log fields.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Default => "default".to_string(),
            Self::Named(name) => format!("named:{name}"),
            Self::Callable(_) => "callable".to_string(),
            Self::Object(_) => "object".to_string(),
        }
    }
}

impl fmt::Debug for LoggerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("LoggerRef::Default"),
            Self::Named(name) => f.debug_tuple("LoggerRef::Named").field(name).finish(),
            Self::Callable(_) => f.write_str("LoggerRef::Callable(..)"),
            Self::Object(_) => f.write_str("LoggerRef::Object(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// OptionValue
// ---------------------------------------------------------------------------

/// A value supplied for a configuration option, before validation.
#[derive(Debug, Clone)]
pub enum OptionValue {
    /// An explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// Any number; integer options check the range on assignment.
    Number(f64),
    /// A string.
    String(String),
    /// An ordered list.
    List(Vec<OptionValue>),
    /// A plain data record (no callable members).
    Object(serde_json::Map<String, Value>),
    /// A gate predicate.
    Condition(Condition),
    /// A logger reference.
    Logger(LoggerRef),
}

impl OptionValue {
    /// Convert a JSON value. Records become [`OptionValue::Object`].
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Object(map.clone()),
        }
    }

    /// Short type name for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Object(_) => "object",
            Self::Condition(_) => "condition",
            Self::Logger(_) => "logger",
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u64> for OptionValue {
    fn from(value: u64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value.into_iter().map(Self::String).collect())
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(Self::from).collect())
    }
}

impl From<Condition> for OptionValue {
    fn from(value: Condition) -> Self {
        Self::Condition(value)
    }
}

impl From<LoggerRef> for OptionValue {
    fn from(value: LoggerRef) -> Self {
        Self::Logger(value)
    }
}

impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
