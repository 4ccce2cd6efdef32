//! Client error types.

use segment_config::ConfigError;
use segment_loader::LoaderError;

/// A boxed error raised by host-supplied code (predicates, factories).
pub type HostError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the client handles.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    /// An option failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Loading the library failed synchronously (missing key, double load).
    #[error(transparent)]
    Load(LoaderError),

    /// The condition predicate itself failed.
    #[error("condition callback failed for `{method}`: {source}")]
    GateEvaluation {
        /// The tracked method being gated.
        method: String,
        /// What the predicate raised.
        #[source]
        source: HostError,
    },

    /// An injectable condition could not be turned into a predicate.
    #[error("failed to resolve condition: {0}")]
    ConditionResolution(#[source] HostError),

    /// The method is not part of the tracked surface.
    #[error("unknown tracked method `{0}`")]
    UnknownMethod(String),

    /// A named service was not registered with the host.
    #[error("unknown service `{0}`")]
    UnknownService(String),
}

impl From<LoaderError> for SegmentError {
    fn from(err: LoaderError) -> Self {
        match err {
            LoaderError::UnknownMethod(method) => Self::UnknownMethod(method),
            other => Self::Load(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_method_is_lifted() {
        let err = SegmentError::from(LoaderError::UnknownMethod("x".into()));
        assert!(matches!(err, SegmentError::UnknownMethod(ref m) if m == "x"));
    }

    #[test]
    fn test_load_errors_wrap() {
        let err = SegmentError::from(LoaderError::MissingKey);
        assert!(matches!(err, SegmentError::Load(LoaderError::MissingKey)));
        assert_eq!(err.to_string(), "cannot load analytics.js without an API key");
    }
}
