//! Structured logging configuration.
//!
//! Records from the library's `log` facade are bridged into the same
//! subscriber, so `RUST_LOG=roster_verify=debug` shows every batch query.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Builds the level filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize logging to stderr
///
/// Output goes to stderr so `--json` results on stdout stay parseable.
pub fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init();

    if result.is_ok() {
        tracing::debug!("Logging initialized");
    }
}

/// Log a completed verification change with structured fields
pub fn log_verification_change(entity: &str, key: &str, status: &str, saved: bool) {
    if saved {
        tracing::info!(entity = entity, key = key, status = status, "Verification saved");
    } else {
        tracing::warn!(entity = entity, key = key, status = status, "Verification not saved");
    }
}
