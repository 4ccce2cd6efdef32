//! Debug statement sink.
//!
//! When `debug` is on, every statement is written as
//! `logger[debugLevel](tag + message, ...extra)`. The logger comes from the
//! `logger` option:
//!
//! | `logger` | resolves to |
//! |---|---|
//! | `Default` | [`TracingLogger`] |
//! | `Named(name)` | the [`LoggerRef`] registered under `name` |
//! | `Object(obj)` | `obj`, method chosen by `debugLevel` |
//! | `Callable(f)` | `f(debugLevel, message, extra)` |

use std::sync::Arc;

use parking_lot::RwLock;
use segment_config::{ConfigError, ConfigKey, LogFn, LogObject, LoggerRef, SegmentConfig};
use serde_json::Value;
use tracing::{debug, error, info, trace, warn};

use crate::error::SegmentError;
use crate::services::ServiceRegistry;

/// A logger object backed by `tracing`.
///
/// `log` and `info` map to `INFO`; `debug`, `warn` and `error` map to their
/// namesakes. Unknown levels fall back to `TRACE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl LogObject for TracingLogger {
    fn has_method(&self, name: &str) -> bool {
        matches!(name, "log" | "debug" | "info" | "warn" | "error")
    }

    fn call(&self, method: &str, message: &str, extra: &[Value]) {
        let extra = Value::Array(extra.to_vec());
        match method {
            "error" => error!(target: "segment", %extra, "{message}"),
            "warn" => warn!(target: "segment", %extra, "{message}"),
            "log" | "info" => info!(target: "segment", %extra, "{message}"),
            "debug" => debug!(target: "segment", %extra, "{message}"),
            _ => trace!(target: "segment", %extra, level = method, "{message}"),
        }
    }
}

/// A resolved logger.
#[derive(Clone)]
pub enum LogSink {
    /// Logger object; the method is picked per statement.
    Object(Arc<dyn LogObject>),
    /// Logging function, called with the level bound as its first argument.
    Callable(LogFn),
}

impl LogSink {
    /// Resolve a [`LoggerRef`] against the host services.
    ///
    /// An object logger, whether given directly or registered under a name,
    /// must have a method called `debug_level`.
    ///
    /// # Errors
    ///
    /// - [`SegmentError::UnknownService`] if a named logger is missing or is
    ///   not registered as a [`LoggerRef`].
    /// - [`SegmentError::Config`] if an object logger has no `debug_level`
    ///   method.
    pub fn resolve(
        logger: &LoggerRef,
        debug_level: &str,
        services: &ServiceRegistry,
    ) -> Result<Self, SegmentError> {
        match logger {
            LoggerRef::Default => Ok(Self::Object(Arc::new(TracingLogger))),
            LoggerRef::Object(obj) => {
                if !obj.has_method(debug_level) {
                    return Err(ConfigError::Invalid {
                        key: ConfigKey::Logger,
                        reason: format!("logger object has no `{debug_level}` method"),
                    }
                    .into());
                }
                Ok(Self::Object(Arc::clone(obj)))
            }
            LoggerRef::Callable(f) => Ok(Self::Callable(Arc::clone(f))),
            LoggerRef::Named(name) => {
                let registered = services
                    .get::<LoggerRef>(name)
                    .ok_or_else(|| SegmentError::UnknownService(name.clone()))?;
                match registered.as_ref() {
                    // A name pointing at another name is not followed.
                    LoggerRef::Named(_) => Err(SegmentError::UnknownService(name.clone())),
                    other => Self::resolve(other, debug_level, services),
                }
            }
        }
    }

    fn emit(&self, level: &str, message: &str, extra: &[Value]) {
        match self {
            Self::Object(obj) => obj.call(level, message, extra),
            Self::Callable(f) => f(level, message, extra),
        }
    }
}

/// The parts of the configuration a debug statement needs.
#[derive(Debug, Clone)]
pub struct DebugSettings {
    /// Whether statements are written at all.
    pub enabled: bool,
    /// Prefix for every statement.
    pub tag: String,
    /// Logger method to call.
    pub level: String,
}

impl From<&SegmentConfig> for DebugSettings {
    fn from(config: &SegmentConfig) -> Self {
        Self {
            enabled: config.debug,
            tag: config.tag.clone(),
            level: config.debug_level.clone(),
        }
    }
}

/// Writes debug statements to a resolved [`LogSink`].
pub struct DebugLogger {
    sink: RwLock<LogSink>,
}

impl DebugLogger {
    /// Wrap a resolved sink.
    #[must_use]
    pub fn new(sink: LogSink) -> Self {
        Self {
            sink: RwLock::new(sink),
        }
    }

    /// Swap the sink, e.g. after the `logger` option changed.
    pub fn replace(&self, sink: LogSink) {
        *self.sink.write() = sink;
    }

    /// Write `message` if debugging is enabled. Returns `true` if written.
    pub fn debug(&self, settings: &DebugSettings, message: &str, extra: &[Value]) -> bool {
        if !settings.enabled {
            return false;
        }
        let line = format!("{}{message}", settings.tag);
        let sink = self.sink.read().clone();
        sink.emit(&settings.level, &line, extra);
        true
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct Capture {
        lines: Mutex<Vec<(String, String, Vec<Value>)>>,
    }

    impl LogObject for Capture {
        fn has_method(&self, name: &str) -> bool {
            matches!(name, "log" | "info")
        }

        fn call(&self, method: &str, message: &str, extra: &[Value]) {
            self.lines
                .lock()
                .push((method.to_string(), message.to_string(), extra.to_vec()));
        }
    }

    fn settings(enabled: bool, level: &str) -> DebugSettings {
        DebugSettings {
            enabled,
            tag: "[ngSegment] ".into(),
            level: level.into(),
        }
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let capture = Arc::new(Capture::default());
        let logger = DebugLogger::new(LogSink::Object(capture.clone()));
        assert!(!logger.debug(&settings(false, "log"), "Test debug", &[]));
        assert!(capture.lines.lock().is_empty());
    }

    #[test]
    fn test_object_logger_uses_debug_level() {
        let capture = Arc::new(Capture::default());
        let logger = DebugLogger::new(LogSink::Object(capture.clone()));
        assert!(logger.debug(&settings(true, "info"), "Test debug", &[json!(1)]));
        let lines = capture.lines.lock();
        assert_eq!(lines[0].0, "info");
        assert_eq!(lines[0].1, "[ngSegment] Test debug");
        assert_eq!(lines[0].2, vec![json!(1)]);
    }

    #[test]
    fn test_callable_gets_level_first() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let logger_ref = LoggerRef::callable(move |level, message, _| {
            sink.lock().push(format!("{level}:{message}"));
        });
        let resolved = LogSink::resolve(&logger_ref, "warn", &ServiceRegistry::new()).unwrap();
        DebugLogger::new(resolved).debug(&settings(true, "warn"), "Test debug", &[]);
        assert_eq!(seen.lock().as_slice(), ["warn:[ngSegment] Test debug"]);
    }

    #[test]
    fn test_named_logger_lookup() {
        let services = ServiceRegistry::new();
        let capture = Arc::new(Capture::default());
        services.register_logger("testLogger", LoggerRef::Object(capture.clone()));

        let sink = LogSink::resolve(&LoggerRef::Named("testLogger".into()), "log", &services).unwrap();
        DebugLogger::new(sink).debug(&settings(true, "log"), "Test debug", &[]);
        assert_eq!(capture.lines.lock()[0].1, "[ngSegment] Test debug");
    }

    #[test]
    fn test_named_logger_missing_or_indirect() {
        let services = ServiceRegistry::new();
        assert!(matches!(
            LogSink::resolve(&LoggerRef::Named("nope".into()), "log", &services),
            Err(SegmentError::UnknownService(_))
        ));

        services.register_logger("alias", LoggerRef::Named("other".into()));
        assert!(LogSink::resolve(&LoggerRef::Named("alias".into()), "log", &services).is_err());

        // Registered under the name but not as a logger.
        services.register("plain", 5u8);
        assert!(LogSink::resolve(&LoggerRef::Named("plain".into()), "log", &services).is_err());
    }

    #[test]
    fn test_named_object_logger_needs_level_method() {
        let services = ServiceRegistry::new();
        services.register_logger("cap", LoggerRef::Object(Arc::new(Capture::default())));
        let named = LoggerRef::Named("cap".into());

        assert!(LogSink::resolve(&named, "info", &services).is_ok());
        let err = LogSink::resolve(&named, "table", &services).err().unwrap();
        assert!(matches!(
            err,
            SegmentError::Config(ConfigError::Invalid { key: ConfigKey::Logger, .. })
        ));
    }

    #[test]
    fn test_replace_sink() {
        let first = Arc::new(Capture::default());
        let second = Arc::new(Capture::default());
        let logger = DebugLogger::new(LogSink::Object(first.clone()));
        logger.replace(LogSink::Object(second.clone()));
        logger.debug(&settings(true, "log"), "x", &[]);
        assert!(first.lines.lock().is_empty());
        assert_eq!(second.lines.lock().len(), 1);
    }

    #[test]
    fn test_tracing_logger_methods() {
        assert!(TracingLogger.has_method("log"));
        assert!(TracingLogger.has_method("error"));
        assert!(!TracingLogger.has_method("table"));
        // Must not panic on any level.
        TracingLogger.call("table", "msg", &[]);
    }
}
