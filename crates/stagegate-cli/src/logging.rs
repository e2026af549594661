// Rust guideline compliant 2026-10-15

//! Diagnostic logging setup.
//!
//! Logs go to stderr so that stdout stays machine-readable in JSON mode.

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` is used as the
/// filter directive, falling back to `warn` if it does not parse. Calling
/// this twice is harmless.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
