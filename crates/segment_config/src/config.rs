//! The typed configuration record.

use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::key::ConfigKey;
use crate::value::{Condition, LoggerRef, OptionValue};

/// The analytics.js methods stubs are generated for by default.
pub const DEFAULT_METHODS: [&str; 15] = [
    "trackSubmit",
    "trackClick",
    "trackLink",
    "trackForm",
    "pageview",
    "identify",
    "reset",
    "group",
    "track",
    "ready",
    "alias",
    "page",
    "once",
    "off",
    "on",
];

/// Prefix prepended to every debug statement.
pub const DEFAULT_TAG: &str = "[ngSegment] ";

/// Logger method used for debug statements.
pub const DEFAULT_DEBUG_LEVEL: &str = "log";

/// Configuration for the deferred Segment client.
///
/// Cloning produces an independent copy: the build-time and runtime handles
/// each own one and never observe each other's mutations.
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// Segment write key. Must be set before the library is loaded.
    pub api_key: Option<String>,
    /// Load the library on activation.
    pub autoload: bool,
    /// Milliseconds to defer script injection by.
    pub load_delay_ms: u64,
    /// Checked before every forwarded call.
    pub condition: Option<Condition>,
    /// Turns debug statements on.
    pub debug: bool,
    /// Where debug statements go.
    pub logger: LoggerRef,
    /// Logger method debug statements are sent to.
    pub debug_level: String,
    /// Tracked method names, in stub-creation order.
    pub methods: Vec<String>,
    /// Prefix for debug statements.
    pub tag: String,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            autoload: true,
            load_delay_ms: 0,
            condition: None,
            debug: false,
            logger: LoggerRef::Default,
            debug_level: DEFAULT_DEBUG_LEVEL.to_string(),
            methods: DEFAULT_METHODS.iter().map(ToString::to_string).collect(),
            tag: DEFAULT_TAG.to_string(),
        }
    }
}

impl SegmentConfig {
    /// Store `value` into the field for `key`.
    ///
    /// Only the shape of the value is checked here; semantic checks live in
    /// [`crate::validate`] and run after a whole patch has been assigned.
    pub(crate) fn assign(&mut self, key: ConfigKey, value: OptionValue) -> Result<(), ConfigError> {
        match (key, value) {
            (ConfigKey::ApiKey, OptionValue::String(s)) => self.api_key = Some(s),
            (ConfigKey::ApiKey, OptionValue::Null) => self.api_key = None,
            (ConfigKey::Autoload, OptionValue::Bool(b)) => self.autoload = b,
            (ConfigKey::LoadDelay, OptionValue::Number(n)) => {
                if !n.is_finite() || n < 0.0 {
                    return Err(ConfigError::invalid(
                        key,
                        format!("load delay must be a non-negative number, got {n}"),
                    ));
                }
                // Fractional milliseconds are dropped.
                self.load_delay_ms = n as u64;
            }
            (ConfigKey::Condition, OptionValue::Condition(c)) => self.condition = Some(c),
            (ConfigKey::Condition, OptionValue::Null) => self.condition = None,
            (ConfigKey::Debug, OptionValue::Bool(b)) => self.debug = b,
            (ConfigKey::Logger, OptionValue::Null) => self.logger = LoggerRef::Default,
            (ConfigKey::Logger, OptionValue::String(name)) => self.logger = LoggerRef::Named(name),
            (ConfigKey::Logger, OptionValue::Logger(logger)) => self.logger = logger,
            (ConfigKey::Logger, OptionValue::Object(_)) => {
                // A plain data record has no methods to log through.
                return Err(ConfigError::invalid(
                    key,
                    format!("logger object has no `{}` method", self.debug_level),
                ));
            }
            (ConfigKey::DebugLevel, OptionValue::String(s)) => self.debug_level = s,
            (ConfigKey::Methods, OptionValue::List(items)) => {
                let mut methods = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        OptionValue::String(s) => methods.push(s),
                        other => {
                            return Err(ConfigError::invalid(
                                key,
                                format!("method names must be strings, got {}", other.type_name()),
                            ));
                        }
                    }
                }
                self.methods = methods;
            }
            (ConfigKey::Tag, OptionValue::String(s)) => self.tag = s,
            (key, other) => {
                return Err(ConfigError::invalid(
                    key,
                    format!("unexpected {} value", other.type_name()),
                ));
            }
        }
        Ok(())
    }

    /// A JSON view of the configuration. Behavioural options are described
    /// rather than serialised.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Snapshot<'a> {
            api_key: Option<&'a str>,
            autoload: bool,
            load_delay: u64,
            condition: Option<String>,
            debug: bool,
            logger: String,
            debug_level: &'a str,
            methods: &'a [String],
            tag: &'a str,
        }

        let condition = self.condition.as_ref().map(|c| match c {
            Condition::Predicate(_) => "predicate".to_string(),
            Condition::Injectable(inner) => format!("injectable[{}]", inner.dependencies.join(",")),
        });

        serde_json::to_value(Snapshot {
            api_key: self.api_key.as_deref(),
            autoload: self.autoload,
            load_delay: self.load_delay_ms,
            condition,
            debug: self.debug,
            logger: self.logger.describe(),
            debug_level: &self.debug_level,
            methods: &self.methods,
            tag: &self.tag,
        })
        .unwrap_or(Value::Null)
    }
}
