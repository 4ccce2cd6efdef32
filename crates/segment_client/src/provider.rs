//! The build-time handle.

use std::sync::Arc;

use parking_lot::RwLock;
use segment_config::{ConfigModel, ConfigPatch, SegmentConfig};
use segment_loader::QueuedCall;
use serde_json::Value;
use tracing::warn;

use crate::dispatch::CommandQueue;
use crate::environment::Environment;
use crate::error::SegmentError;
use crate::handle::{Configure, TrackingHandle};
use crate::logger::{DebugLogger, DebugSettings, LogSink};
use crate::stub::{StubFactory, StubTable};

/// Collects configuration and queues tracked calls until
/// [`SegmentProvider::activate`] turns it into a [`crate::Segment`].
pub struct SegmentProvider {
    pub(crate) config: RwLock<ConfigModel>,
    pub(crate) queue: Arc<CommandQueue>,
    pub(crate) stubs: StubTable,
    pub(crate) events: RwLock<Option<Value>>,
    pub(crate) env: Arc<Environment>,
}

impl SegmentProvider {
    /// A provider with default options and an empty queue.
    ///
    /// Flags the global analytics snippet as set up; a second provider in
    /// the same environment logs an error but still works.
    #[must_use]
    pub fn new(env: Arc<Environment>) -> Self {
        env.analytics().mark_invoked();

        let model = ConfigModel::default();
        let queue = Arc::new(CommandQueue::new());
        let stubs = StubFactory::build(&model.config().methods, queue.clone(), env.analytics());
        Self {
            config: RwLock::new(model),
            queue,
            stubs,
            events: RwLock::new(None),
            env,
        }
    }

    /// A copy of the current options.
    #[must_use]
    pub fn config(&self) -> SegmentConfig {
        self.config.read().to_config()
    }

    /// Attach an application-defined events catalogue, handed on to the
    /// runtime handle.
    pub fn set_events(&self, events: Value) -> &Self {
        *self.events.write() = Some(events);
        self
    }

    #[must_use]
    pub fn events(&self) -> Option<Value> {
        self.events.read().clone()
    }

    /// Calls waiting for activation, oldest first.
    #[must_use]
    pub fn queued(&self) -> Vec<QueuedCall> {
        self.queue.snapshot()
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.env
    }

    /// Write a debug statement with the current options.
    ///
    /// The logger is resolved on each call; a logger that cannot be resolved
    /// yet is reported and the statement dropped.
    pub fn debug(&self, message: &str, extra: &[Value]) -> bool {
        let (logger, settings) = {
            let model = self.config.read();
            (model.config().logger.clone(), DebugSettings::from(model.config()))
        };
        if !settings.enabled {
            return false;
        }
        match LogSink::resolve(&logger, &settings.level, self.env.services()) {
            Ok(sink) => DebugLogger::new(sink).debug(&settings, message, extra),
            Err(err) => {
                warn!(error = %err, "debug logger unavailable");
                false
            }
        }
    }
}

impl TrackingHandle for SegmentProvider {
    fn stubs(&self) -> &StubTable {
        &self.stubs
    }
}

impl Configure for SegmentProvider {
    fn update(&self, patch: ConfigPatch) -> Result<(), SegmentError> {
        self.config.write().merge(&patch)?;
        Ok(())
    }
}
