//! The capabilities shared by the build-time and runtime handles.

use segment_config::{Condition, ConfigKey, ConfigPatch, LoggerRef};
use serde_json::{Value, json};

use crate::error::SegmentError;
use crate::stub::StubTable;

/// The tracked-method surface.
///
/// Every call goes through the handle's stub for that method, so on a
/// [`crate::SegmentProvider`] it is queued and on a [`crate::Segment`] it is
/// gated and forwarded.
pub trait TrackingHandle {
    /// The handle's stubs.
    fn stubs(&self) -> &StubTable;

    /// Call any configured method by name.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::UnknownMethod`] if `method` is not configured,
    /// otherwise whatever the stub returns.
    fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Option<Value>, SegmentError> {
        self.stubs()
            .get(method)
            .ok_or_else(|| SegmentError::UnknownMethod(method.to_string()))?
            .call(arguments)
    }

    /// `track(event, properties)`
    fn track(&self, event: &str, properties: &Value) -> Result<Option<Value>, SegmentError> {
        self.call("track", vec![json!(event), properties.clone()])
    }

    /// `identify(userId, traits)`
    fn identify(&self, user_id: &str, traits: &Value) -> Result<Option<Value>, SegmentError> {
        self.call("identify", vec![json!(user_id), traits.clone()])
    }

    /// `page(name)`
    fn page(&self, name: &str) -> Result<Option<Value>, SegmentError> {
        self.call("page", vec![json!(name)])
    }

    /// `pageview(path)`
    fn pageview(&self, path: &str) -> Result<Option<Value>, SegmentError> {
        self.call("pageview", vec![json!(path)])
    }

    /// `group(groupId, traits)`
    fn group(&self, group_id: &str, traits: &Value) -> Result<Option<Value>, SegmentError> {
        self.call("group", vec![json!(group_id), traits.clone()])
    }

    /// `alias(userId)`
    fn alias(&self, user_id: &str) -> Result<Option<Value>, SegmentError> {
        self.call("alias", vec![json!(user_id)])
    }

    fn reset(&self) -> Result<Option<Value>, SegmentError> {
        self.call("reset", Vec::new())
    }
}

/// Option setters. Each one validates before committing and returns the
/// handle so calls can be chained with `?`.
pub trait Configure {
    /// Apply `patch` atomically.
    ///
    /// # Errors
    ///
    /// Returns the first failure; nothing is committed in that case.
    fn update(&self, patch: ConfigPatch) -> Result<(), SegmentError>;

    fn set_key(&self, api_key: &str) -> Result<&Self, SegmentError> {
        self.update(ConfigPatch::new().with(ConfigKey::ApiKey, api_key))?;
        Ok(self)
    }

    fn set_autoload(&self, autoload: bool) -> Result<&Self, SegmentError> {
        self.update(ConfigPatch::new().with(ConfigKey::Autoload, autoload))?;
        Ok(self)
    }

    fn set_load_delay(&self, delay_ms: u64) -> Result<&Self, SegmentError> {
        self.update(ConfigPatch::new().with(ConfigKey::LoadDelay, delay_ms))?;
        Ok(self)
    }

    fn set_condition(&self, condition: Condition) -> Result<&Self, SegmentError> {
        self.update(ConfigPatch::new().with(ConfigKey::Condition, condition))?;
        Ok(self)
    }

    fn set_debug(&self, debug: bool) -> Result<&Self, SegmentError> {
        self.update(ConfigPatch::new().with(ConfigKey::Debug, debug))?;
        Ok(self)
    }

    fn set_logger(&self, logger: LoggerRef) -> Result<&Self, SegmentError> {
        self.update(ConfigPatch::new().with(ConfigKey::Logger, logger))?;
        Ok(self)
    }

    fn set_debug_level(&self, level: &str) -> Result<&Self, SegmentError> {
        self.update(ConfigPatch::new().with(ConfigKey::DebugLevel, level))?;
        Ok(self)
    }

    /// Apply several options at once.
    fn set_config(&self, patch: ConfigPatch) -> Result<&Self, SegmentError> {
        self.update(patch)?;
        Ok(self)
    }

    /// Apply a JSON object of options. Unknown keys are skipped.
    fn set_config_json(&self, config: &Value) -> Result<&Self, SegmentError> {
        self.update(ConfigPatch::from_json(config)?)?;
        Ok(self)
    }
}
