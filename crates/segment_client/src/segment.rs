//! The runtime handle.

use std::sync::Arc;

use parking_lot::RwLock;
use segment_config::{
    Condition, ConfigError, ConfigKey, ConfigModel, ConfigPatch, OptionValue, SegmentConfig,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dispatch::LiveDispatch;
use crate::environment::Environment;
use crate::error::SegmentError;
use crate::handle::{Configure, TrackingHandle};
use crate::logger::{DebugLogger, DebugSettings, LogSink};
use crate::stub::{StubFactory, StubTable};

/// Forwards tracked calls to analytics.js through the condition gate.
///
/// Owns its own copy of the options: changes made here are not seen by the
/// provider it came from, and vice versa.
pub struct Segment {
    instance_id: Uuid,
    config: Arc<RwLock<ConfigModel>>,
    stubs: StubTable,
    logger: Arc<DebugLogger>,
    env: Arc<Environment>,
    events: Option<Value>,
}

impl Segment {
    pub(crate) fn new(
        config: SegmentConfig,
        logger: Arc<DebugLogger>,
        env: Arc<Environment>,
        events: Option<Value>,
    ) -> Self {
        let methods = config.methods.clone();
        let config = Arc::new(RwLock::new(ConfigModel::new(config)));
        let dispatch = Arc::new(LiveDispatch::new(
            Arc::clone(&config),
            Arc::clone(env.analytics()),
            Arc::clone(&logger),
        ));
        let stubs = StubFactory::build(&methods, dispatch, env.analytics());
        let instance_id = Uuid::new_v4();
        debug!(%instance_id, methods = methods.len(), "runtime handle created");

        Self {
            instance_id,
            config,
            stubs,
            logger,
            env,
            events,
        }
    }

    #[must_use]
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// A copy of the current options.
    #[must_use]
    pub fn config(&self) -> SegmentConfig {
        self.config.read().to_config()
    }

    /// The events catalogue carried over from the provider.
    #[must_use]
    pub fn events(&self) -> Option<&Value> {
        self.events.as_ref()
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.env
    }

    /// Write a debug statement if `debug` is on.
    pub fn debug(&self, message: &str, extra: &[Value]) -> bool {
        let settings = DebugSettings::from(self.config.read().config());
        self.logger.debug(&settings, message, extra)
    }

    /// Report a completed navigation as a `pageview`.
    ///
    /// # Errors
    ///
    /// Whatever the `pageview` stub returns.
    pub fn on_route_change(&self, path: &str) -> Result<Option<Value>, SegmentError> {
        self.pageview(path)
    }

    /// Issue a `pageview` for every path received on `routes` until the
    /// sender is dropped.
    pub fn watch_routes(self: Arc<Self>, mut routes: mpsc::Receiver<String>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(path) = routes.recv().await {
                if let Err(err) = self.on_route_change(&path) {
                    warn!(instance_id = %self.instance_id, %path, error = %err, "pageview failed");
                }
            }
            debug!(instance_id = %self.instance_id, "route watcher stopped");
        })
    }
}

impl TrackingHandle for Segment {
    fn stubs(&self) -> &StubTable {
        &self.stubs
    }
}

impl Configure for Segment {
    /// An injectable condition is resolved against the host services before
    /// it is stored. A changed logger is resolved before anything is
    /// committed.
    ///
    /// `methods` is fixed once the handle exists: the stub table was built
    /// from it, so a change is rejected.
    fn update(&self, mut patch: ConfigPatch) -> Result<(), SegmentError> {
        if patch.get(ConfigKey::Methods).is_some() {
            return Err(ConfigError::Invalid {
                key: ConfigKey::Methods,
                reason: "methods cannot change after activation".to_string(),
            }
            .into());
        }

        let resolved = match patch.get(ConfigKey::Condition) {
            Some(OptionValue::Condition(Condition::Injectable(inner))) => {
                Some(self.env.services().resolve_condition(inner)?)
            }
            _ => None,
        };
        if let Some(predicate) = resolved {
            patch.insert(ConfigKey::Condition, Condition::Predicate(predicate));
        }

        let mut model = self.config.write();
        let mut candidate = model.clone();
        candidate.merge(&patch)?;

        let logger_changed = patch
            .keys()
            .any(|key| matches!(key, ConfigKey::Logger | ConfigKey::DebugLevel));
        if logger_changed {
            let config = candidate.config();
            let sink = LogSink::resolve(&config.logger, &config.debug_level, self.env.services())?;
            self.logger.replace(sink);
        }

        *model = candidate;
        Ok(())
    }
}
