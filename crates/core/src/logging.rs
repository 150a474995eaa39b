//! Structured logging bootstrap for applications embedding Relaynet.
//!
//! The libraries only emit `tracing` events; installing a subscriber is left
//! to the host application, which can use these helpers to do it.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{CoreError, Result};

/// Directive used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Install a human-readable subscriber.
///
/// Log level can be configured via the `RUST_LOG` environment variable.
/// If not set, defaults to `info` level.
///
/// # Example
/// ```no_run
/// use relaynet_core::logging;
///
/// logging::init().expect("subscriber already installed");
/// tracing::info!("Gateway started");
/// ```
pub fn init() -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .try_init()
        .map_err(|e| CoreError::Logging(e.to_string()))
}

/// Install a JSON subscriber, for log aggregation in production.
///
/// # Example
/// ```no_run
/// use relaynet_core::logging;
///
/// logging::init_json().expect("subscriber already installed");
/// tracing::info!(recipient = "0deadbeef", "Parcel received");
/// ```
pub fn init_json() -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_target(true).with_thread_ids(true))
        .try_init()
        .map_err(|e| CoreError::Logging(e.to_string()))
}

fn env_filter() -> EnvFilter {
    filter_or_default(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
}

fn filter_or_default(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}
