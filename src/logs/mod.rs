// Logs module - Diagnostic event output

use crate::config::{log_filter, DEFAULT_LOG_FILTER};
use tracing_subscriber::EnvFilter;

/// Install the stderr tracing subscriber.
///
/// Returns false when a subscriber was already installed.
pub fn init() -> bool {
    init_with_filter(&log_filter())
}

/// Install the stderr tracing subscriber with an explicit filter directive
pub fn init_with_filter(directive: &str) -> bool {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("Invalid log filter '{}' ({}), using '{}'", directive, e, DEFAULT_LOG_FILTER);
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });

    // Writes go to whatever descriptor 2 is at event time
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
