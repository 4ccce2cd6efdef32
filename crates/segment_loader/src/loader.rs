//! Exactly-once, delayed script loading.
//!
//! [`SegmentLoader::load`] validates its preconditions and flips the shared
//! [`LoadStateCell`] to `Loading` before returning, so a second call made
//! during the delay window is rejected. The injection itself runs on a
//! detached tokio task: callers never observe its completion, and a failure
//! is logged and leaves the state at `Loading`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::analytics::Analytics;
use crate::error::LoaderError;
use crate::host::ScriptHost;
use crate::script::{ScriptTag, script_url};
use crate::state::{LoadState, LoadStateCell};

/// Loads analytics.js into the host at most once per process.
///
/// Clones share the same load state, host and analytics object.
#[derive(Clone)]
pub struct SegmentLoader {
    state: Arc<LoadStateCell>,
    host: Arc<dyn ScriptHost>,
    analytics: Arc<Analytics>,
}

impl SegmentLoader {
    /// Create a loader in [`LoadState::NotLoaded`].
    #[must_use]
    pub fn new(host: Arc<dyn ScriptHost>, analytics: Arc<Analytics>) -> Self {
        Self {
            state: Arc::new(LoadStateCell::new()),
            host,
            analytics,
        }
    }

    /// The current load state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state.get()
    }

    /// Whether a load has been started.
    #[must_use]
    pub fn has_loaded(&self) -> bool {
        self.state() != LoadState::NotLoaded
    }

    /// Schedule injection of the script for `api_key` after `delay_ms`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`LoaderError::AlreadyLoading`] / [`LoaderError::AlreadyLoaded`] if a
    ///   load was already started.
    /// - [`LoaderError::MissingKey`] if `api_key` is empty.
    /// - [`LoaderError::NoRuntime`] if no tokio runtime is current.
    ///
    /// The state is unchanged on error.
    pub fn load(&self, api_key: &str, delay_ms: u64) -> Result<(), LoaderError> {
        if self.analytics.is_initialized() {
            warn!("Segment analytics has already been initialized. Did you already load the library?");
        }

        if let Some(err) = LoaderError::for_state(self.state()) {
            return Err(err);
        }
        if api_key.is_empty() {
            return Err(LoaderError::MissingKey);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| LoaderError::NoRuntime)?;

        if let Err(observed) = self.state.begin_loading() {
            return Err(LoaderError::for_state(observed).unwrap_or(LoaderError::AlreadyLoading));
        }

        let url = script_url(api_key, self.host.scheme());
        info!(url, delay_ms, "scheduling analytics script load");

        let state = Arc::clone(&self.state);
        let host = Arc::clone(&self.host);
        runtime.spawn(async move {
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            let tag = ScriptTag::new(url);
            let src = tag.src.clone();
            match host.insert_script(tag).await {
                Ok(()) => {
                    state.finish_loading();
                    debug!(url = src, "Segment script loaded.");
                }
                Err(err) => {
                    warn!(url = src, error = %err, "Error loading Segment library.");
                }
            }
        });

        Ok(())
    }
}
