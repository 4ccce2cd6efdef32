//! # segment_loader
//!
//! Loads the Segment analytics.js library exactly once and models the global
//! analytics object it populates.
//!
//! This crate provides:
//!
//! - [`state`]: the monotonic `NotLoaded → Loading → Loaded` machine.
//! - [`script`]: CDN URL and script tag construction.
//! - [`host`]: the [`ScriptHost`] seam plus HTTP and in-memory hosts.
//! - [`analytics`]: the global [`Analytics`] object and its backend seam.
//! - [`loader`]: [`SegmentLoader`], the delayed exactly-once loader.
//! - [`error`]: loader error types.

pub mod analytics;
pub mod error;
pub mod host;
pub mod loader;
pub mod script;
pub mod state;

pub use analytics::{Analytics, AnalyticsBackend, QueuedCall};
pub use error::LoaderError;
pub use host::{HttpScriptHost, MemoryHost, ScriptHost};
pub use loader::SegmentLoader;
pub use script::{Scheme, ScriptTag, script_url};
pub use state::{LoadState, LoadStateCell};
