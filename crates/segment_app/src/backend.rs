//! Stand-in for the analytics.js library.
//!
//! The fetched script cannot run outside a browser, so once it has been
//! downloaded the binary installs this backend, which logs every call it
//! receives.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use segment_loader::AnalyticsBackend;
use serde_json::Value;
use tracing::info;

#[derive(Default)]
pub struct LogBackend {
    calls: AtomicUsize,
}

impl LogBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl AnalyticsBackend for LogBackend {
    fn invoke(&self, method: &str, arguments: &[Value]) -> anyhow::Result<Value> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        let arguments = Value::Array(arguments.to_vec());
        info!(n, method, %arguments, "analytics call");
        Ok(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use segment_loader::Analytics;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_counts_replayed_and_live_calls() {
        let analytics = Analytics::new();
        analytics.register_stub("track");
        analytics.call("track", vec![json!("a")]).unwrap();

        let backend = LogBackend::new();
        analytics.initialize(backend.clone());
        assert_eq!(backend.call_count(), 1);

        analytics.call("page", vec![]).unwrap();
        assert_eq!(backend.call_count(), 2);
    }
}
