//! The global analytics object.
//!
//! Before analytics.js runs, the global object is a "snippet": a set of stub
//! methods that record each call into a buffer. When the library runs it
//! installs itself as the [`AnalyticsBackend`] and replays that buffer in
//! order. [`Analytics`] models both phases.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashSet;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::LoaderError;

/// A recorded method call: the method name and its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedCall {
    /// The analytics.js method name.
    pub method: String,
    /// Arguments in call order.
    #[serde(default)]
    pub arguments: Vec<Value>,
}

impl QueuedCall {
    /// Record a call.
    #[must_use]
    pub fn new(method: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// The loaded analytics library.
pub trait AnalyticsBackend: Send + Sync {
    /// Invoke `method` with `arguments`, returning the library's result.
    ///
    /// # Errors
    ///
    /// Any error the library raises.
    fn invoke(&self, method: &str, arguments: &[Value]) -> anyhow::Result<Value>;
}

/// The process-wide analytics object.
#[derive(Default)]
pub struct Analytics {
    invoked: AtomicBool,
    initialized: AtomicBool,
    stubs: DashSet<String>,
    buffer: Mutex<Vec<QueuedCall>>,
    backend: RwLock<Option<Arc<dyn AnalyticsBackend>>>,
}

impl Analytics {
    /// An empty snippet: no stubs, nothing buffered, no library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag the snippet as set up. Returns `false`, and logs an error, if it
    /// already was.
    pub fn mark_invoked(&self) -> bool {
        if self.invoked.swap(true, Ordering::AcqRel) {
            error!("Segment or ngSegment included twice.");
            false
        } else {
            true
        }
    }

    /// Whether [`Analytics::mark_invoked`] has been called.
    #[must_use]
    pub fn is_invoked(&self) -> bool {
        self.invoked.load(Ordering::Acquire)
    }

    /// Whether the library has installed itself.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Register a buffering stub for `method` unless one already exists.
    /// Returns `true` if a stub was added.
    pub fn register_stub(&self, method: &str) -> bool {
        if self.stubs.contains(method) {
            return false;
        }
        self.stubs.insert(method.to_string())
    }

    /// Whether `method` has a stub.
    #[must_use]
    pub fn has_stub(&self, method: &str) -> bool {
        self.stubs.contains(method)
    }

    /// Number of registered stubs.
    #[must_use]
    pub fn stub_count(&self) -> usize {
        self.stubs.len()
    }

    /// Call `method` on the global object.
    ///
    /// With the library installed the call goes straight to it; a library
    /// error is logged and swallowed. Otherwise the stub buffers the call.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::UnknownMethod`] if no library is installed and
    /// `method` has no stub.
    pub fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Option<Value>, LoaderError> {
        let backend = {
            let mut buffer = self.buffer.lock();
            match self.backend.read().clone() {
                Some(backend) => backend,
                None => {
                    if !self.has_stub(method) {
                        return Err(LoaderError::UnknownMethod(method.to_string()));
                    }
                    buffer.push(QueuedCall::new(method, arguments));
                    return Ok(None);
                }
            }
        };

        match backend.invoke(method, &arguments) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(method, error = %err, "analytics call failed");
                Ok(None)
            }
        }
    }

    /// Install the library and replay every buffered call into it, oldest
    /// first.
    pub fn initialize(&self, backend: Arc<dyn AnalyticsBackend>) {
        let pending = {
            let mut buffer = self.buffer.lock();
            *self.backend.write() = Some(Arc::clone(&backend));
            self.initialized.store(true, Ordering::Release);
            std::mem::take(&mut *buffer)
        };

        info!(replayed = pending.len(), "analytics library initialised");
        for call in pending {
            if let Err(err) = backend.invoke(&call.method, &call.arguments) {
                warn!(method = %call.method, error = %err, "replayed analytics call failed");
            }
        }
    }

    /// Calls buffered by the stubs and not yet replayed.
    #[must_use]
    pub fn buffered(&self) -> Vec<QueuedCall> {
        self.buffer.lock().clone()
    }
}
