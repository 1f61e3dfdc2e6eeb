//! Diagnostic logging on stderr, filtered through `BROOM_LOG`

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "BROOM_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Filter read from `BROOM_LOG`, or `warn` when unset or invalid.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Prompts own stdout, so logs go to stderr.
pub fn init_logger() {
    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(env_filter())
        .try_init();

    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
