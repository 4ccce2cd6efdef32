//! Configuration error types.

use crate::key::ConfigKey;

/// Errors raised while assigning or validating configuration.
///
/// Every variant is a misconfiguration: it fails the call that supplied the
/// offending value and leaves the previously valid configuration untouched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An option was given a value its validator rejects.
    #[error("invalid `{key}` option: {reason}")]
    Invalid {
        /// The option that failed validation.
        key: ConfigKey,
        /// Human-readable reason.
        reason: String,
    },

    /// A config record was expected but something else was supplied.
    #[error("config must be an object, got {0}")]
    NotAnObject(&'static str),

    /// The option name is not recognised.
    #[error("unknown config option `{0}`")]
    UnknownKey(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: ConfigKey, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }

    /// Returns the option this error refers to, if any.
    #[must_use]
    pub fn key(&self) -> Option<ConfigKey> {
        match self {
            Self::Invalid { key, .. } => Some(*key),
            Self::NotAnObject(_) | Self::UnknownKey(_) => None,
        }
    }
}
