//! Activation: the one-way hand-off from [`SegmentProvider`] to [`Segment`].
//!
//! 1. Merge the host-injected config, if any.
//! 2. Resolve the logger.
//! 3. Resolve an injectable condition into a plain predicate.
//! 4. Start loading analytics.js if `autoload` is on and a key is set.
//! 5. Build the runtime handle from a copy of the options.
//! 6. Replay every queued call through it, oldest first.
//!
//! Starting the load is the last step that can fail before the handle exists,
//! so a bad logger or condition never leaves a script scheduled.
//!
//! The provider is consumed, so activation happens at most once per provider.

use std::sync::Arc;

use segment_config::{Condition, ConfigKey};
use tracing::{debug, info, warn};

use crate::error::SegmentError;
use crate::handle::TrackingHandle;
use crate::logger::{DebugLogger, DebugSettings, LogSink};
use crate::provider::SegmentProvider;
use crate::segment::Segment;

impl SegmentProvider {
    /// Turn this build-time handle into the runtime handle.
    ///
    /// The returned [`Segment`] has already replayed every queued call.
    /// A queued call naming an unknown method is logged and skipped.
    ///
    /// # Errors
    ///
    /// - [`SegmentError::Config`] if the injected config is invalid, or the
    ///   resolved logger object has no `debug_level` method.
    /// - [`SegmentError::UnknownService`] if a named logger or a condition
    ///   dependency is not registered.
    /// - [`SegmentError::ConditionResolution`] if the condition factory fails.
    /// - [`SegmentError::Load`] if the load cannot be started.
    /// - [`SegmentError::GateEvaluation`] if the condition fails while a
    ///   queued call is replayed. Calls after it are not replayed.
    pub fn activate(self) -> Result<Segment, SegmentError> {
        let Self {
            config,
            queue,
            events,
            env,
            ..
        } = self;
        let mut model = config.into_inner();

        let injected = match env.injected_config() {
            Some(source) => {
                model.merge(&source.to_patch()?)?;
                true
            }
            None => false,
        };

        let sink = LogSink::resolve(
            &model.config().logger,
            &model.config().debug_level,
            env.services(),
        )?;
        let logger = Arc::new(DebugLogger::new(sink));
        let settings = DebugSettings::from(model.config());
        if injected {
            logger.debug(
                &settings,
                "Found segment config constant",
                &[model.config().snapshot()],
            );
        }

        let resolved = match &model.config().condition {
            Some(Condition::Injectable(inner)) => Some(env.services().resolve_condition(inner)?),
            _ => None,
        };
        if let Some(predicate) = resolved {
            model.set(ConfigKey::Condition, Condition::Predicate(predicate))?;
        }

        if model.config().autoload {
            match model.config().api_key.as_deref() {
                Some(api_key) => env.loader().load(api_key, model.config().load_delay_ms)?,
                None => {
                    warn!("autoload is enabled but no API key is set");
                    logger.debug(
                        &settings,
                        "Warning: API key is not set and autoload is not disabled.",
                        &[],
                    );
                }
            }
        }

        let segment = Segment::new(model.to_config(), logger, env, events.into_inner());

        let pending = queue.drain();
        let replayed = pending.len();
        for call in pending {
            match segment.call(&call.method, call.arguments) {
                Ok(_) => {}
                Err(SegmentError::UnknownMethod(method)) => {
                    warn!(instance_id = %segment.instance_id(), %method, "dropping queued call");
                }
                Err(err) => return Err(err),
            }
        }
        debug!(instance_id = %segment.instance_id(), replayed, "queued calls replayed");
        info!(instance_id = %segment.instance_id(), "segment activated");

        Ok(segment)
    }
}
