//! Logging initialization and configuration.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor an explicit level is given.
pub const DEFAULT_FILTER: &str = "session_gate=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Filter for a bare level such as `debug`, scoped to this crate.
///
/// Full directives (`session_gate=trace,tokio=warn`) pass through unchanged.
fn level_filter(level: &str) -> EnvFilter {
    let directive = if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("session_gate={}", level)
    };
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Registry with `filter` and a compact fmt layer on stderr.
fn subscriber(filter: EnvFilter) -> impl SubscriberInitExt {
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr),
    )
}

/// Initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// defaults to `session_gate=info`. Output goes to stderr.
///
/// # Panics
///
/// Panics if called more than once, or if another tracing subscriber
/// has already been set.
pub fn init() {
    subscriber(env_filter()).init();
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), TryInitError> {
    subscriber(env_filter()).try_init()
}

/// Try to initialize logging with an explicit level or directive string.
pub fn try_init_with_level(level: &str) -> Result<(), TryInitError> {
    subscriber(level_filter(level)).try_init()
}
