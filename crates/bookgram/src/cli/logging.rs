//! Tracing subscriber setup.

use std::io;

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "BOOKGRAM_LOG";

/// Installs a stderr subscriber filtered by `BOOKGRAM_LOG`, falling back to
/// `bookgram=info`, or `bookgram=debug` with `-v`.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = if verbose > 0 { "debug" } else { "info" };
        EnvFilter::new(format!("bookgram={level}"))
    });
    // A second install in the same process is ignored.
    let _ignored = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
