//! Structured logging for the `flakeid` binary.
//!
//! Identifiers are written to stdout so they can be piped; every log line
//! goes to stderr. Filtering follows `RUST_LOG` and defaults to `info`. With
//! `RUST_LOG=flakeid=trace` the library's per-poll spans and clock warnings
//! become visible as well.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global `tracing` subscriber.
///
/// # Errors
///
/// Fails if a global subscriber has already been installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_target(false),
        )
        .try_init()?;
    Ok(())
}
