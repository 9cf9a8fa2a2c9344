//! Logging initialization with environment-based formatters
//!
//! - Production: Structured JSON logs
//! - Sandbox: Colorful, human-readable logs for development

use crate::config::{get_environment, is_production};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = if is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stdout),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .try_init()
    };

    if installed.is_ok() {
        tracing::debug!(environment = %get_environment(), "Logging initialized");
    }
}
