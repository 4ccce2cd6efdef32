//! # segment_app
//!
//! Drives the deferred Segment client from the command line.
//!
//! ## Sequence
//!
//! 1. Build a provider and apply the command-line options.
//! 2. Issue the calls from `--calls`; they are queued.
//! 3. Activate: the `--config` file is merged, the script load is scheduled
//!    and the queue is replayed.
//! 4. Stay alive for `--wait-ms` so the delayed load can finish. Once the
//!    script is fetched a logging backend stands in for the library and
//!    receives every buffered call.

mod backend;
mod input;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use segment_client::{Configure, Environment, TrackingHandle};
use segment_loader::{Analytics, HttpScriptHost, Scheme};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use backend::LogBackend;

#[derive(Parser)]
#[command(name = "segment_app", about = "Queue Segment calls and replay them once analytics.js loads")]
struct Args {
    /// JSON file of options merged at activation
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON array of calls issued before activation
    #[arg(long)]
    calls: Option<PathBuf>,

    /// Segment write key
    #[arg(short, long)]
    key: Option<String>,

    /// Milliseconds to defer the script load by
    #[arg(short, long)]
    delay_ms: Option<u64>,

    /// Turn on debug statements
    #[arg(long)]
    debug: bool,

    /// Fetch the script over plain HTTP instead of HTTPS
    #[arg(long)]
    http: bool,

    /// How long to wait for the delayed load before exiting
    #[arg(short, long, default_value_t = 3000)]
    wait_ms: u64,
}

fn env_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive("segment_app=info".parse()?)
        .add_directive("segment=info".parse()?)
        .add_directive("segment_client=info".parse()?)
        .add_directive("segment_loader=warn".parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(env_filter()?).init();

    let args = Args::parse();
    let scheme = if args.http { Scheme::Http } else { Scheme::Https };

    let analytics = Arc::new(Analytics::new());
    let backend = LogBackend::new();
    let host = {
        let analytics = Arc::clone(&analytics);
        let backend = Arc::clone(&backend);
        HttpScriptHost::new(scheme)?.with_on_load(move |tag, body| {
            info!(url = %tag.src, bytes = body.len(), "analytics.js fetched, installing logging backend");
            analytics.initialize(backend.clone());
        })
    };

    let mut env = Environment::with_analytics(Arc::new(host), analytics);
    if let Some(path) = &args.config {
        env = env.with_injected_config(input::load_config(path)?);
        info!(path = %path.display(), "config file loaded");
    }
    let env = Arc::new(env);

    let provider = env.provider();
    if let Some(key) = &args.key {
        provider.set_key(key)?;
    }
    if let Some(delay_ms) = args.delay_ms {
        provider.set_load_delay(delay_ms)?;
    }
    if args.debug {
        provider.set_debug(true)?;
    }

    if let Some(path) = &args.calls {
        let calls = input::load_calls(path)?;
        info!(count = calls.len(), "queueing calls");
        for call in calls {
            if let Err(err) = provider.call(&call.method, call.arguments) {
                warn!(method = %call.method, error = %err, "call rejected");
            }
        }
    }

    let segment = provider.activate()?;
    info!(
        instance_id = %segment.instance_id(),
        config = %segment.config().snapshot(),
        "segment activated"
    );

    tokio::time::sleep(Duration::from_millis(args.wait_ms)).await;

    let analytics = env.analytics();
    info!(
        state = ?env.loader().state(),
        initialized = analytics.is_initialized(),
        delivered = backend.call_count(),
        still_buffered = analytics.buffered().len(),
        "shutting down"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_flag() {
        let args = Args::try_parse_from(["segment_app", "--http"]).unwrap();
        assert!(args.http);
        let args = Args::try_parse_from(["segment_app"]).unwrap();
        assert!(!args.http);
        assert_eq!(args.wait_ms, 3000);
        assert!(Args::try_parse_from(["segment_app", "--https"]).is_err());
    }

    #[test]
    fn test_env_filter_covers_client_crates() {
        let filter = env_filter().unwrap().to_string();
        for directive in [
            "segment_app=info",
            "segment=info",
            "segment_client=info",
            "segment_loader=warn",
        ] {
            assert!(filter.contains(directive), "{filter} lacks {directive}");
        }
    }
}
