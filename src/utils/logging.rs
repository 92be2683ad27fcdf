//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Initialize console logging at the given default level.
///
/// `RUST_LOG` overrides the default when set. Safe to call more than once;
/// later calls are no-ops.
pub fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}
