//! Loader error types.

use crate::state::LoadState;

/// Errors that can occur while loading the library or calling into it.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// `load` was called without an API key.
    #[error("cannot load analytics.js without an API key")]
    MissingKey,

    /// `load` was called while the script is already being injected.
    #[error("attempting to load Segment twice: script is already loading")]
    AlreadyLoading,

    /// `load` was called after the script was injected.
    #[error("attempting to load Segment twice: script is already loaded")]
    AlreadyLoaded,

    /// `load` needs a tokio runtime to schedule the delayed injection.
    #[error("no tokio runtime available to schedule the script load")]
    NoRuntime,

    /// The host failed to insert the script.
    #[error("failed to load analytics script: {0}")]
    Fetch(String),

    /// HTTP transport error while fetching the script.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The method has no stub on the analytics object.
    #[error("unknown analytics method `{0}`")]
    UnknownMethod(String),
}

impl LoaderError {
    /// The double-load error matching an observed state, if any.
    #[must_use]
    pub fn for_state(state: LoadState) -> Option<Self> {
        match state {
            LoadState::NotLoaded => None,
            LoadState::Loading => Some(Self::AlreadyLoading),
            LoadState::Loaded => Some(Self::AlreadyLoaded),
        }
    }
}
