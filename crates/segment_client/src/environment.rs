//! The embedding environment.
//!
//! Everything the client shares process-wide lives here: the global analytics
//! object, the loader and its load state, the host services, and the config
//! record the host injects at activation. Tests build their own
//! [`Environment`]; applications usually go through [`global`].

use std::sync::{Arc, OnceLock};

use segment_config::{ConfigError, ConfigPatch};
use segment_loader::{Analytics, HttpScriptHost, MemoryHost, Scheme, ScriptHost, SegmentLoader};
use serde_json::Value;
use tracing::error;

use crate::provider::SegmentProvider;
use crate::services::ServiceRegistry;

/// A config record supplied by the host, merged at activation.
#[derive(Debug, Clone)]
pub enum InjectedConfig {
    /// Raw JSON, e.g. read from a file.
    Json(Value),
    /// Typed options, which may carry predicates and loggers.
    Patch(ConfigPatch),
}

impl InjectedConfig {
    /// The options to merge.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotAnObject`] if the JSON is not an object.
    pub fn to_patch(&self) -> Result<ConfigPatch, ConfigError> {
        match self {
            Self::Json(value) => ConfigPatch::from_json(value),
            Self::Patch(patch) => Ok(patch.clone()),
        }
    }
}

impl From<Value> for InjectedConfig {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<ConfigPatch> for InjectedConfig {
    fn from(patch: ConfigPatch) -> Self {
        Self::Patch(patch)
    }
}

/// Process-wide state shared by every handle.
pub struct Environment {
    analytics: Arc<Analytics>,
    loader: SegmentLoader,
    services: ServiceRegistry,
    injected: Option<InjectedConfig>,
}

impl Environment {
    /// A fresh environment whose loader injects scripts through `host`.
    #[must_use]
    pub fn new(host: Arc<dyn ScriptHost>) -> Self {
        Self::with_analytics(host, Arc::new(Analytics::new()))
    }

    /// Like [`Environment::new`], around an existing analytics object. Lets a
    /// host's load callback install the library into the same object.
    #[must_use]
    pub fn with_analytics(host: Arc<dyn ScriptHost>, analytics: Arc<Analytics>) -> Self {
        let loader = SegmentLoader::new(host, Arc::clone(&analytics));
        Self {
            analytics,
            loader,
            services: ServiceRegistry::new(),
            injected: None,
        }
    }

    /// Merge `config` into the provider's options at activation.
    #[must_use]
    pub fn with_injected_config(mut self, config: impl Into<InjectedConfig>) -> Self {
        self.injected = Some(config.into());
        self
    }

    /// Use `services` for named loggers and injectable conditions.
    #[must_use]
    pub fn with_services(mut self, services: ServiceRegistry) -> Self {
        self.services = services;
        self
    }

    pub fn analytics(&self) -> &Arc<Analytics> {
        &self.analytics
    }

    pub fn loader(&self) -> &SegmentLoader {
        &self.loader
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    pub fn injected_config(&self) -> Option<&InjectedConfig> {
        self.injected.as_ref()
    }

    /// Create the build-time handle.
    #[must_use]
    pub fn provider(self: &Arc<Self>) -> SegmentProvider {
        SegmentProvider::new(Arc::clone(self))
    }
}

static GLOBAL_ENVIRONMENT: OnceLock<Arc<Environment>> = OnceLock::new();

/// The process-wide environment, created on first use with an HTTPS script
/// host.
pub fn global() -> Arc<Environment> {
    GLOBAL_ENVIRONMENT.get_or_init(|| Arc::new(default_environment())).clone()
}

/// Install `environment` as the process-wide one.
///
/// Has no effect if the global environment was already created; the
/// environment actually in use is returned either way.
pub fn init_global(environment: Environment) -> Arc<Environment> {
    let _ = GLOBAL_ENVIRONMENT.set(Arc::new(environment));
    global()
}

fn default_environment() -> Environment {
    let host: Arc<dyn ScriptHost> = match HttpScriptHost::new(Scheme::Https) {
        Ok(host) => Arc::new(host),
        Err(err) => {
            error!(error = %err, "failed to build HTTP script host; scripts will not be fetched");
            Arc::new(MemoryHost::new(Scheme::Https))
        }
    };
    Environment::new(host)
}

#[cfg(test)]
mod tests {
    use segment_config::ConfigKey;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_injected_json_to_patch() {
        let injected = InjectedConfig::from(json!({ "apiKey": "abc", "debug": true }));
        let patch = injected.to_patch().unwrap();
        assert_eq!(patch.len(), 2);
        assert!(patch.get(ConfigKey::ApiKey).is_some());

        let err = InjectedConfig::from(json!([1, 2])).to_patch().unwrap_err();
        assert!(matches!(err, ConfigError::NotAnObject(_)));
    }

    #[test]
    fn test_environment_shares_analytics_with_loader() {
        let env = Environment::new(Arc::new(MemoryHost::new(Scheme::Https)))
            .with_injected_config(ConfigPatch::new().with(ConfigKey::Debug, true));
        assert!(env.injected_config().is_some());
        assert!(!env.loader().has_loaded());
        assert!(!env.analytics().is_invoked());
    }

    #[test]
    fn test_global_is_shared() {
        let first = global();
        let second = init_global(Environment::new(Arc::new(MemoryHost::new(Scheme::Http))));
        assert!(Arc::ptr_eq(&first, &second));
    }
}
