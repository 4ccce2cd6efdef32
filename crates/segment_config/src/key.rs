//! Recognised option names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One recognised configuration option.
///
/// The wire spelling (used by injected config records) is camelCase, e.g.
/// `apiKey` or `debugLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigKey {
    /// The Segment write key used to build the script URL.
    ApiKey,
    /// Load the library automatically on activation.
    Autoload,
    /// Milliseconds to wait before injecting the script.
    #[serde(alias = "loadDelayMs")]
    LoadDelay,
    /// Predicate gating every forwarded call.
    Condition,
    /// Turns the debug sink on or off.
    Debug,
    /// Where debug statements go.
    Logger,
    /// The logger method debug statements are sent to.
    DebugLevel,
    /// The tracked method names.
    Methods,
    /// Prefix for debug statements.
    Tag,
}

impl ConfigKey {
    /// Every recognised option, in declaration order.
    pub const ALL: [ConfigKey; 9] = [
        Self::ApiKey,
        Self::Autoload,
        Self::LoadDelay,
        Self::Condition,
        Self::Debug,
        Self::Logger,
        Self::DebugLevel,
        Self::Methods,
        Self::Tag,
    ];

    /// The wire name of this option.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "apiKey",
            Self::Autoload => "autoload",
            Self::LoadDelay => "loadDelay",
            Self::Condition => "condition",
            Self::Debug => "debug",
            Self::Logger => "logger",
            Self::DebugLevel => "debugLevel",
            Self::Methods => "methods",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "loadDelayMs" {
            return Ok(Self::LoadDelay);
        }
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
