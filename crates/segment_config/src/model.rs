//! The mutable configuration model and config patches.

use serde_json::Value;
use tracing::warn;

use crate::config::SegmentConfig;
use crate::error::ConfigError;
use crate::key::ConfigKey;
use crate::validate;
use crate::value::OptionValue;

/// An ordered set of option assignments.
///
/// Assigning the same key twice keeps the first position and the last value.
#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    entries: Vec<(ConfigKey, OptionValue)>,
}

impl ConfigPatch {
    /// Create an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment, builder style.
    #[must_use]
    pub fn with(mut self, key: ConfigKey, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add an assignment.
    pub fn insert(&mut self, key: ConfigKey, value: impl Into<OptionValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Build a patch from a JSON record.
    ///
    /// Unrecognised keys are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotAnObject`] if `value` is not a JSON object.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let Value::Object(map) = value else {
            return Err(ConfigError::NotAnObject(json_type_name(value)));
        };

        let mut patch = Self::new();
        for (name, value) in map {
            match name.parse::<ConfigKey>() {
                Ok(key) => patch.insert(key, OptionValue::from_json(value)),
                Err(_) => warn!(option = %name, "ignoring unknown config option"),
            }
        }
        Ok(patch)
    }

    /// Returns the value assigned to `key`, if any.
    #[must_use]
    pub fn get(&self, key: ConfigKey) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value assigned to `key`, if any.
    pub fn get_mut(&mut self, key: ConfigKey) -> Option<&mut OptionValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// The touched keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = ConfigKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// Iterate over assignments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(ConfigKey, OptionValue)> {
        self.entries.iter()
    }

    /// Number of assignments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Holds a [`SegmentConfig`] and applies changes to it atomically.
///
/// Every mutation is assigned onto a scratch copy and validated there; the
/// model only changes when the whole change is valid.
#[derive(Debug, Clone, Default)]
pub struct ConfigModel {
    config: SegmentConfig,
}

impl ConfigModel {
    /// Wrap an existing configuration.
    #[must_use]
    pub fn new(config: SegmentConfig) -> Self {
        Self { config }
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// An independent copy of the current configuration.
    #[must_use]
    pub fn to_config(&self) -> SegmentConfig {
        self.config.clone()
    }

    /// Assign a single option and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the value is rejected; the model is
    /// left unchanged.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<OptionValue>) -> Result<(), ConfigError> {
        self.merge(&ConfigPatch::new().with(key, value))
    }

    /// Assign every option in `patch`, then validate each touched key.
    ///
    /// # Errors
    ///
    /// Returns the first assignment or validation failure; the model is left
    /// unchanged.
    pub fn merge(&mut self, patch: &ConfigPatch) -> Result<(), ConfigError> {
        let mut candidate = self.config.clone();
        for (key, value) in patch.iter() {
            candidate.assign(*key, value.clone())?;
        }
        for key in patch.keys() {
            validate::validate(key, &candidate)?;
        }
        self.config = candidate;
        Ok(())
    }

    /// Validate the whole configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate_all(&self) -> Result<(), ConfigError> {
        validate::validate_all(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::value::Condition;

    #[test]
    fn test_set_valid_key() {
        let mut model = ConfigModel::default();
        model.set(ConfigKey::ApiKey, "abc").unwrap();
        assert_eq!(model.config().api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_failed_set_keeps_previous_value() {
        let mut model = ConfigModel::default();
        model.set(ConfigKey::ApiKey, "abc").unwrap();
        assert!(model.set(ConfigKey::ApiKey, "").is_err());
        assert!(model.set(ConfigKey::ApiKey, 5u64).is_err());
        assert_eq!(model.config().api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_merge_is_all_or_nothing() {
        let mut model = ConfigModel::default();
        let patch = ConfigPatch::new()
            .with(ConfigKey::ApiKey, "abc")
            .with(ConfigKey::LoadDelay, 100u64)
            .with(ConfigKey::Condition, "not a function");
        let err = model.merge(&patch).unwrap_err();
        assert_eq!(err.key(), Some(ConfigKey::Condition));
        assert!(model.config().api_key.is_none());
        assert_eq!(model.config().load_delay_ms, 0);
    }

    #[test]
    fn test_merge_validates_companion_keys_together() {
        struct Info;
        impl crate::value::LogObject for Info {
            fn has_method(&self, name: &str) -> bool {
                name == "info"
            }
            fn call(&self, _: &str, _: &str, _: &[Value]) {}
        }

        let mut model = ConfigModel::default();
        // Logger first, debugLevel second: still valid as a whole.
        let patch = ConfigPatch::new()
            .with(ConfigKey::Logger, crate::value::LoggerRef::object(Info))
            .with(ConfigKey::DebugLevel, "info");
        model.merge(&patch).unwrap();
        assert_eq!(model.config().debug_level, "info");

        // Switching debugLevel to something the object lacks fails.
        assert!(model.set(ConfigKey::DebugLevel, "log").is_err());
        assert_eq!(model.config().debug_level, "info");
    }

    #[test]
    fn test_set_condition() {
        let mut model = ConfigModel::default();
        model
            .set(ConfigKey::Condition, Condition::predicate(|_, _| Ok(false)))
            .unwrap();
        assert!(model.config().condition.is_some());
        assert!(model.set(ConfigKey::Condition, OptionValue::Null).is_err());
        assert!(model.config().condition.is_some());
    }

    #[test]
    fn test_patch_from_json() {
        let patch = ConfigPatch::from_json(&json!({
            "apiKey": "abc",
            "loadDelay": 250,
            "debug": true,
            "somethingElse": 1,
        }))
        .unwrap();
        assert_eq!(patch.len(), 3);
        let mut model = ConfigModel::default();
        model.merge(&patch).unwrap();
        assert_eq!(model.config().load_delay_ms, 250);
        assert!(model.config().debug);
    }

    #[test]
    fn test_patch_from_non_object() {
        let err = ConfigPatch::from_json(&json!("apiKey")).unwrap_err();
        assert!(matches!(err, ConfigError::NotAnObject("string")));
    }

    #[test]
    fn test_json_logger_false_is_rejected() {
        let patch = ConfigPatch::from_json(&json!({ "logger": false })).unwrap();
        let mut model = ConfigModel::default();
        assert!(model.merge(&patch).is_err());
    }

    #[test]
    fn test_json_logger_null_means_default() {
        let patch = ConfigPatch::from_json(&json!({ "logger": null })).unwrap();
        let mut model = ConfigModel::default();
        model.merge(&patch).unwrap();
        assert!(matches!(
            model.config().logger,
            crate::value::LoggerRef::Default
        ));
    }

    #[test]
    fn test_patch_insert_overwrites_in_place() {
        let mut patch = ConfigPatch::new().with(ConfigKey::Tag, "a");
        patch.insert(ConfigKey::Debug, true);
        patch.insert(ConfigKey::Tag, "b");
        let keys: Vec<_> = patch.keys().collect();
        assert_eq!(keys, vec![ConfigKey::Tag, ConfigKey::Debug]);
        assert!(matches!(patch.get(ConfigKey::Tag), Some(OptionValue::String(s)) if s == "b"));
    }

    #[test]
    fn test_validate_all_defaults() {
        ConfigModel::default().validate_all().unwrap();
    }
}
