//! Diagnostic tracing for flag resolution.
//!
//! Missing-file and dummy-table diagnostics are `error` events, the
//! nothing-to-do notice is a `warn` event, and per-step decisions are `debug`
//! events. All of them go to stderr so stdout stays reserved for reports.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=calgate=debug calgate check header.json
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
