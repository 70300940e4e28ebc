//! Tracing initialization.
//!
//! Diagnostics go to stderr so they never mix with the move report on stdout.
//! The level comes from the `-v` count only; `RUST_LOG` is not consulted.

use tracing_subscriber::filter::EnvFilter;

#[inline]
fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs a compact stderr subscriber for the given verbosity.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::new(level_for(verbosity));

    // A second init keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
