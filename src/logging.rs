//! Diagnostic logging setup.
//!
//! Logs go to stderr so rendered SQL on stdout stays pipeable. `RUST_LOG`
//! takes precedence over the configured level.

use tracing_subscriber::{EnvFilter, fmt};

/// Build the filter from `RUST_LOG` or the configured level
pub fn env_filter(level: &str) -> EnvFilter {
    std::env::var("RUST_LOG").map_or_else(
        |_| EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")),
        EnvFilter::new
    )
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(level: &str, colored: bool) {
    let _ = fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_ansi(colored)
        .with_target(false)
        .try_init();
}
