//! Dispatch strategies behind the tracked-method stubs.
//!
//! Before activation every stub forwards into a [`CommandQueue`]; afterwards
//! into a [`LiveDispatch`], which gates the call and hands it to the global
//! analytics object.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use segment_config::ConfigModel;
use segment_loader::{Analytics, QueuedCall};
use serde_json::{Value, json};

use crate::error::SegmentError;
use crate::gate::ConditionGate;
use crate::logger::{DebugLogger, DebugSettings};

/// Where a stub sends its calls.
pub trait Dispatch: Send + Sync {
    /// Forward one call.
    ///
    /// # Errors
    ///
    /// Strategy-specific; see the implementors.
    fn forward(&self, method: &str, arguments: Vec<Value>) -> Result<Option<Value>, SegmentError>;
}

/// Buffers calls made before activation.
#[derive(Default)]
pub struct CommandQueue {
    calls: Mutex<Vec<QueuedCall>>,
}

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Take every buffered call, oldest first, leaving the queue empty.
    pub fn drain(&self) -> Vec<QueuedCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// A copy of the buffered calls.
    #[must_use]
    pub fn snapshot(&self) -> Vec<QueuedCall> {
        self.calls.lock().clone()
    }
}

impl Dispatch for CommandQueue {
    /// Never fails and never touches the library.
    fn forward(&self, method: &str, arguments: Vec<Value>) -> Result<Option<Value>, SegmentError> {
        self.calls.lock().push(QueuedCall::new(method, arguments));
        Ok(None)
    }
}

/// Gates calls and forwards them to the analytics object.
///
/// The configuration is read on every call, so a condition or debug setting
/// changed on the runtime handle applies to the next call.
pub struct LiveDispatch {
    config: Arc<RwLock<ConfigModel>>,
    analytics: Arc<Analytics>,
    logger: Arc<DebugLogger>,
}

impl LiveDispatch {
    #[must_use]
    pub fn new(
        config: Arc<RwLock<ConfigModel>>,
        analytics: Arc<Analytics>,
        logger: Arc<DebugLogger>,
    ) -> Self {
        Self {
            config,
            analytics,
            logger,
        }
    }
}

impl Dispatch for LiveDispatch {
    /// # Errors
    ///
    /// - [`SegmentError::GateEvaluation`] if the condition fails.
    /// - [`SegmentError::UnknownMethod`] if the analytics object has neither
    ///   the library nor a stub for `method`.
    fn forward(&self, method: &str, arguments: Vec<Value>) -> Result<Option<Value>, SegmentError> {
        let (condition, settings) = {
            let config = self.config.read();
            let config = config.config();
            (config.condition.clone(), DebugSettings::from(config))
        };

        let gate = ConditionGate::from_condition(condition.as_ref(), method)?;
        if !gate.allows(method, &arguments)? {
            self.logger.debug(
                &settings,
                "Not calling method, condition returned false.",
                &[json!({ "method": method, "arguments": arguments })],
            );
            return Ok(None);
        }

        self.logger.debug(
            &settings,
            &format!("Calling method {method} with arguments:"),
            &arguments,
        );
        Ok(self.analytics.call(method, arguments)?)
    }
}

#[cfg(test)]
mod tests {
    use segment_config::{Condition, ConfigKey};

    use super::*;
    use crate::logger::{LogSink, TracingLogger};
    use crate::testing::RecordingBackend;

    fn live(config: ConfigModel, analytics: &Arc<Analytics>) -> LiveDispatch {
        LiveDispatch::new(
            Arc::new(RwLock::new(config)),
            Arc::clone(analytics),
            Arc::new(DebugLogger::new(LogSink::Object(Arc::new(TracingLogger)))),
        )
    }

    #[test]
    fn test_queue_keeps_order() {
        let queue = CommandQueue::new();
        assert!(queue.forward("track", vec![json!("a")]).unwrap().is_none());
        queue.forward("page", vec![]).unwrap();
        queue.forward("track", vec![json!("b")]).unwrap();
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.snapshot().len(), 3);

        let drained = queue.drain();
        let methods: Vec<_> = drained.iter().map(|c| c.method.as_str()).collect();
        assert_eq!(methods, ["track", "page", "track"]);
        assert_eq!(drained[2].arguments, vec![json!("b")]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_live_forwards_to_backend() {
        let analytics = Arc::new(Analytics::new());
        let backend = RecordingBackend::install(&analytics);

        let result = live(ConfigModel::default(), &analytics)
            .forward("track", vec![json!("Purchase")])
            .unwrap();
        assert_eq!(result, Some(json!("track")));
        assert_eq!(backend.calls(), vec![QueuedCall::new("track", vec![json!("Purchase")])]);
    }

    #[test]
    fn test_false_condition_blocks_call() {
        let analytics = Arc::new(Analytics::new());
        let backend = RecordingBackend::install(&analytics);

        let mut config = ConfigModel::default();
        config
            .set(ConfigKey::Condition, Condition::predicate(|_, _| Ok(false)))
            .unwrap();
        config.set(ConfigKey::Debug, true).unwrap();

        let dispatch = live(config, &analytics);
        for method in ["track", "identify", "page"] {
            assert!(dispatch.forward(method, vec![json!(1)]).unwrap().is_none());
        }
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_condition_error_reaches_caller() {
        let analytics = Arc::new(Analytics::new());
        let backend = RecordingBackend::install(&analytics);

        let mut config = ConfigModel::default();
        config
            .set(
                ConfigKey::Condition,
                Condition::predicate(|_, _| anyhow::bail!("boom")),
            )
            .unwrap();

        let err = live(config, &analytics).forward("track", vec![]).unwrap_err();
        assert!(matches!(err, SegmentError::GateEvaluation { .. }));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_without_library_uses_global_stub() {
        let analytics = Arc::new(Analytics::new());
        analytics.register_stub("track");
        let dispatch = live(ConfigModel::default(), &analytics);

        assert!(dispatch.forward("track", vec![]).unwrap().is_none());
        assert_eq!(analytics.buffered().len(), 1);
        assert!(matches!(
            dispatch.forward("nope", vec![]),
            Err(SegmentError::UnknownMethod(_))
        ));
    }
}
