//! # segment_client
//!
//! A deferred Segment client. Application code can make tracking calls
//! before analytics.js has loaded; they are queued and replayed, in order,
//! once the client is activated.
//!
//! The client has two phases:
//!
//! 1. [`SegmentProvider`], the build-time handle. It collects options and
//!    queues tracked calls.
//! 2. [`Segment`], the runtime handle returned by
//!    [`SegmentProvider::activate`]. Its calls pass the condition gate and go
//!    to the global analytics object.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use segment_client::{Configure, Environment, TrackingHandle};
//! use segment_loader::{MemoryHost, Scheme};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), segment_client::SegmentError> {
//!     let env = Arc::new(Environment::new(Arc::new(MemoryHost::new(Scheme::Https))));
//!
//!     let provider = env.provider();
//!     provider.set_key("write-key")?.set_load_delay(500)?;
//!     provider.track("Signed Up", &json!({ "plan": "pro" }))?;
//!
//!     let segment = provider.activate()?;
//!     segment.page("Home")?;
//!     Ok(())
//! }
//! ```

pub mod dispatch;
pub mod environment;
pub mod error;
pub mod gate;
pub mod handle;
mod lifecycle;
pub mod logger;
pub mod provider;
pub mod segment;
pub mod services;
pub mod stub;

#[cfg(test)]
mod testing;

pub use dispatch::{CommandQueue, Dispatch, LiveDispatch};
pub use environment::{Environment, InjectedConfig, global, init_global};
pub use error::{HostError, SegmentError};
pub use gate::ConditionGate;
pub use handle::{Configure, TrackingHandle};
pub use logger::{DebugLogger, DebugSettings, LogSink, TracingLogger};
pub use provider::SegmentProvider;
pub use segment::Segment;
pub use services::ServiceRegistry;
pub use stub::{MethodStub, StubFactory, StubTable};
