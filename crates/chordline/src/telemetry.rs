//! Logging setup for the chordline binary.
//!
//! Logs go to stderr so stdout carries only analysis output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `log_level` is any `EnvFilter` directive.
///
/// Falls back to `info` when the directive does not parse. Safe to call more
/// than once; later calls are no-ops.
pub fn init(log_level: &str) {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
