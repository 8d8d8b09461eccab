//! Tracing initialisation
//!
//! Log records go to stderr so they never interleave with the diagnostic line
//! a probe prints on stdout.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

const FALLBACK_FILTER: &str = "warn";

/// Build the filter for a configured level, falling back to `warn` on bad input
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Initialize the global tracing subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = env_filter(&config.level);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    if result.is_ok() {
        tracing::debug!(level = %config.level, format = ?config.format, "Tracing initialized");
    }
}
