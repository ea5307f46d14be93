//! CI Dashboard Proxy
//!
//! Serves a static dashboard UI and forwards authenticated API requests
//! to configured upstream CI servers, injecting per-server bearer tokens
//! that the browser never sees. An optional AWS integration annotates
//! the dashboard with autoscaler and cost data.
//!
//! # Trust boundary
//!
//! Tokens live server-side only: the public server listing strips them,
//! relayed responses pass through untouched, and transport error
//! messages are redacted before reaching the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aws;
pub mod cli;
pub mod config;
pub mod error;
pub mod registry;
pub mod relay;
pub mod routes;
pub mod server;
pub mod static_files;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
