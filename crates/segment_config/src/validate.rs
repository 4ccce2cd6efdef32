//! Per-option validators.
//!
//! Each validator is a pure check over a candidate [`SegmentConfig`]. They run
//! after a patch has been assigned so that companion options (`logger` and
//! `debugLevel`) can be checked against each other regardless of the order
//! they were supplied in.

use std::collections::HashSet;

use crate::config::SegmentConfig;
use crate::error::ConfigError;
use crate::key::ConfigKey;
use crate::value::{Condition, LoggerRef};

/// Validate one option of `config`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] naming `key` if the option is unusable.
pub fn validate(key: ConfigKey, config: &SegmentConfig) -> Result<(), ConfigError> {
    match key {
        ConfigKey::ApiKey => match config.api_key.as_deref() {
            Some(k) if !k.is_empty() => Ok(()),
            _ => Err(ConfigError::invalid(key, "API key must be a valid string")),
        },
        ConfigKey::Condition => match &config.condition {
            Some(Condition::Predicate(_)) => Ok(()),
            Some(Condition::Injectable(inner)) => {
                if inner.dependencies.iter().any(String::is_empty) {
                    Err(ConfigError::invalid(key, "dependency names must not be empty"))
                } else {
                    Ok(())
                }
            }
            None => Err(ConfigError::invalid(
                key,
                "condition callback must be a function",
            )),
        },
        ConfigKey::Logger | ConfigKey::DebugLevel => validate_logger(key, config),
        ConfigKey::Methods => validate_methods(config),
        ConfigKey::Autoload | ConfigKey::LoadDelay | ConfigKey::Debug | ConfigKey::Tag => Ok(()),
    }
}

/// Validate every option that currently holds a value.
///
/// Unset optional options (`apiKey`, `condition`) are not an error here; they
/// only fail when explicitly assigned an unusable value.
///
/// # Errors
///
/// Returns the first validation failure.
pub fn validate_all(config: &SegmentConfig) -> Result<(), ConfigError> {
    for key in ConfigKey::ALL {
        let unset = match key {
            ConfigKey::ApiKey => config.api_key.is_none(),
            ConfigKey::Condition => config.condition.is_none(),
            _ => false,
        };
        if !unset {
            validate(key, config)?;
        }
    }
    Ok(())
}

fn validate_logger(key: ConfigKey, config: &SegmentConfig) -> Result<(), ConfigError> {
    if config.debug_level.is_empty() {
        return Err(ConfigError::invalid(
            ConfigKey::DebugLevel,
            "debug level must be a non-empty string",
        ));
    }
    match &config.logger {
        LoggerRef::Named(name) if name.is_empty() => Err(ConfigError::invalid(
            key,
            "logger service name must not be empty",
        )),
        LoggerRef::Object(logger) if !logger.has_method(&config.debug_level) => {
            Err(ConfigError::invalid(
                key,
                format!(
                    "logger object has no `{}` method; set debugLevel to one of its methods",
                    config.debug_level
                ),
            ))
        }
        _ => Ok(()),
    }
}

fn validate_methods(config: &SegmentConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::with_capacity(config.methods.len());
    for method in &config.methods {
        if method.is_empty() {
            return Err(ConfigError::invalid(
                ConfigKey::Methods,
                "method names must not be empty",
            ));
        }
        if !seen.insert(method.as_str()) {
            return Err(ConfigError::invalid(
                ConfigKey::Methods,
                format!("duplicate method name `{method}`"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::value::LogObject;

    struct InfoOnly;

    impl LogObject for InfoOnly {
        fn has_method(&self, name: &str) -> bool {
            name == "info"
        }

        fn call(&self, _method: &str, _message: &str, _extra: &[Value]) {}
    }

    #[test]
    fn test_defaults_are_valid() {
        validate_all(&SegmentConfig::default()).unwrap();
    }

    #[test]
    fn test_api_key_must_be_non_empty() {
        let mut config = SegmentConfig::default();
        assert!(validate(ConfigKey::ApiKey, &config).is_err());
        config.api_key = Some(String::new());
        assert!(validate(ConfigKey::ApiKey, &config).is_err());
        config.api_key = Some("abc".into());
        assert!(validate(ConfigKey::ApiKey, &config).is_ok());
    }

    #[test]
    fn test_condition_must_be_set_when_touched() {
        let mut config = SegmentConfig::default();
        assert!(validate(ConfigKey::Condition, &config).is_err());
        config.condition = Some(Condition::predicate(|_, _| Ok(true)));
        assert!(validate(ConfigKey::Condition, &config).is_ok());
        config.condition = Some(Condition::injectable([""], |_| anyhow::bail!("unused")));
        assert!(validate(ConfigKey::Condition, &config).is_err());
    }

    #[test]
    fn test_logger_object_needs_matching_debug_level() {
        let mut config = SegmentConfig::default();
        config.logger = LoggerRef::object(InfoOnly);
        let err = validate(ConfigKey::Logger, &config).unwrap_err();
        assert_eq!(err.key(), Some(ConfigKey::Logger));

        config.debug_level = "info".into();
        assert!(validate(ConfigKey::Logger, &config).is_ok());
        assert!(validate(ConfigKey::DebugLevel, &config).is_ok());
    }

    #[test]
    fn test_named_and_callable_loggers() {
        let mut config = SegmentConfig::default();
        config.logger = LoggerRef::Named(String::new());
        assert!(validate(ConfigKey::Logger, &config).is_err());
        config.logger = LoggerRef::Named("$log".into());
        assert!(validate(ConfigKey::Logger, &config).is_ok());
        config.logger = LoggerRef::callable(|_, _, _| {});
        assert!(validate(ConfigKey::Logger, &config).is_ok());
    }

    #[test]
    fn test_duplicate_methods_rejected() {
        let mut config = SegmentConfig::default();
        config.methods = vec!["track".into(), "page".into(), "track".into()];
        let err = validate(ConfigKey::Methods, &config).unwrap_err();
        assert!(err.to_string().contains("duplicate method name `track`"));
    }
}
