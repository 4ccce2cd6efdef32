//! The host-document seam.
//!
//! The loader never touches a document directly; it hands a [`ScriptTag`] to
//! a [`ScriptHost`], which inserts it next to the first existing script (in a
//! browser) or fetches it (everywhere else).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::LoaderError;
use crate::script::{Scheme, ScriptTag};

/// Called after a script was inserted, with the tag and the fetched body
/// (empty when the host does not fetch).
pub type OnLoad = Arc<dyn Fn(&ScriptTag, &[u8]) + Send + Sync>;

/// Inserts the analytics script into the host environment.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// The scheme the host document was served over.
    fn scheme(&self) -> Scheme;

    /// Insert `tag`. Resolves once the script is in place.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError`] if the script could not be loaded.
    async fn insert_script(&self, tag: ScriptTag) -> Result<(), LoaderError>;
}

// ---------------------------------------------------------------------------
// HTTP host
// ---------------------------------------------------------------------------

const SCRIPT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const SCRIPT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A host that fetches the script over HTTP.
pub struct HttpScriptHost {
    client: reqwest::Client,
    scheme: Scheme,
    on_load: Option<OnLoad>,
}

impl HttpScriptHost {
    /// Create a host fetching over `scheme`.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Http`] if the HTTP client cannot be built.
    pub fn new(scheme: Scheme) -> Result<Self, LoaderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(SCRIPT_CONNECT_TIMEOUT)
            .timeout(SCRIPT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            scheme,
            on_load: None,
        })
    }

    /// Run `on_load` with the script body once it has been fetched.
    #[must_use]
    pub fn with_on_load<F>(mut self, on_load: F) -> Self
    where
        F: Fn(&ScriptTag, &[u8]) + Send + Sync + 'static,
    {
        self.on_load = Some(Arc::new(on_load));
        self
    }
}

#[async_trait]
impl ScriptHost for HttpScriptHost {
    fn scheme(&self) -> Scheme {
        self.scheme
    }

    async fn insert_script(&self, tag: ScriptTag) -> Result<(), LoaderError> {
        info!(url = %tag.src, "fetching analytics script");
        let response = self
            .client
            .get(&tag.src)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        debug!(url = %tag.src, bytes = body.len(), "analytics script fetched");

        if let Some(on_load) = &self.on_load {
            on_load(&tag, &body);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory host
// ---------------------------------------------------------------------------

/// A host that records inserted tags without fetching anything.
///
/// Useful offline and as a test double. A failing host reports every
/// insertion as an error, like a script whose `onerror` fires.
#[derive(Default)]
pub struct MemoryHost {
    scheme: Scheme,
    fail: bool,
    inserted: Mutex<Vec<ScriptTag>>,
    on_load: Option<OnLoad>,
}

impl MemoryHost {
    /// A host that accepts every script.
    #[must_use]
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme,
            ..Self::default()
        }
    }

    /// A host that rejects every script.
    #[must_use]
    pub fn failing(scheme: Scheme) -> Self {
        Self {
            scheme,
            fail: true,
            ..Self::default()
        }
    }

    /// Run `on_load` after each successful insertion.
    #[must_use]
    pub fn with_on_load<F>(mut self, on_load: F) -> Self
    where
        F: Fn(&ScriptTag, &[u8]) + Send + Sync + 'static,
    {
        self.on_load = Some(Arc::new(on_load));
        self
    }

    /// Tags inserted so far, failed attempts included.
    #[must_use]
    pub fn inserted(&self) -> Vec<ScriptTag> {
        self.inserted.lock().clone()
    }

    /// Number of insertion attempts.
    #[must_use]
    pub fn insert_count(&self) -> usize {
        self.inserted.lock().len()
    }
}

#[async_trait]
impl ScriptHost for MemoryHost {
    fn scheme(&self) -> Scheme {
        self.scheme
    }

    async fn insert_script(&self, tag: ScriptTag) -> Result<(), LoaderError> {
        self.inserted.lock().push(tag.clone());
        if self.fail {
            return Err(LoaderError::Fetch(format!("{} failed to load", tag.src)));
        }
        if let Some(on_load) = &self.on_load {
            on_load(&tag, &[]);
        }
        Ok(())
    }
}
