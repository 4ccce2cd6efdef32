//! Host service registry.
//!
//! The host registers named services (loggers, user state, feature flags)
//! that named loggers and injectable conditions are resolved against.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;
use segment_config::{Dependencies, InjectableCondition, LoggerRef, Predicate};

use crate::error::SegmentError;

/// Named services supplied by the host.
///
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: Arc<DashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` under `name`, replacing any previous entry.
    pub fn register<T: Any + Send + Sync>(&self, name: impl Into<String>, service: T) {
        self.services.insert(name.into(), Arc::new(service));
    }

    /// Register a logger so it can be referenced by name from config.
    pub fn register_logger(&self, name: impl Into<String>, logger: LoggerRef) {
        self.register(name, logger);
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Fetch a service by name, downcast to `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let service = self.services.get(name).map(|entry| Arc::clone(entry.value()))?;
        service.downcast::<T>().ok()
    }

    /// Look up every name in order.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::UnknownService`] for the first missing name.
    pub fn resolve(&self, names: &[String]) -> Result<Dependencies, SegmentError> {
        let mut dependencies = Dependencies::new();
        for name in names {
            let service = self
                .services
                .get(name)
                .map(|entry| Arc::clone(entry.value()))
                .ok_or_else(|| SegmentError::UnknownService(name.clone()))?;
            dependencies.insert(name.clone(), service);
        }
        Ok(dependencies)
    }

    /// Resolve an injectable condition into a plain predicate.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::UnknownService`] if a dependency is missing, or
    /// [`SegmentError::ConditionResolution`] if the factory fails.
    pub fn resolve_condition(&self, condition: &InjectableCondition) -> Result<Predicate, SegmentError> {
        let dependencies = self.resolve(&condition.dependencies)?;
        condition
            .resolve(&dependencies)
            .map_err(|err| SegmentError::ConditionResolution(err.into()))
    }
}
