//! Test doubles shared by the unit tests.

use std::sync::Arc;

use parking_lot::Mutex;
use segment_config::LogObject;
use segment_loader::{Analytics, AnalyticsBackend, QueuedCall};
use serde_json::Value;

/// Records every call the analytics library receives.
#[derive(Default)]
pub(crate) struct RecordingBackend {
    calls: Mutex<Vec<QueuedCall>>,
}

impl RecordingBackend {
    /// Install a fresh recorder as the library behind `analytics`.
    pub(crate) fn install(analytics: &Analytics) -> Arc<Self> {
        let backend = Arc::new(Self::default());
        analytics.initialize(backend.clone());
        backend
    }

    pub(crate) fn calls(&self) -> Vec<QueuedCall> {
        self.calls.lock().clone()
    }
}

impl AnalyticsBackend for RecordingBackend {
    fn invoke(&self, method: &str, arguments: &[Value]) -> anyhow::Result<Value> {
        self.calls
            .lock()
            .push(QueuedCall::new(method, arguments.to_vec()));
        Ok(Value::String(method.to_string()))
    }
}

/// A logger object with `log` and `info` methods that keeps every line.
#[derive(Default)]
pub(crate) struct CaptureLogger {
    lines: Mutex<Vec<(String, String)>>,
}

impl CaptureLogger {
    /// `(method, message)` pairs, oldest first.
    pub(crate) fn lines(&self) -> Vec<(String, String)> {
        self.lines.lock().clone()
    }
}

impl LogObject for CaptureLogger {
    fn has_method(&self, name: &str) -> bool {
        matches!(name, "log" | "info")
    }

    fn call(&self, method: &str, message: &str, _extra: &[Value]) {
        self.lines
            .lock()
            .push((method.to_string(), message.to_string()));
    }
}
