//! Tracing subscriber setup
//!
//! Logs always go to stderr; stdout is reserved for command output such as
//! `summary --json`.

use crate::config::{CliConfig, LogFormat};
use crate::error::{CliError, CliResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the level filter: `RUST_LOG` wins, otherwise the verbosity level
pub fn build_filter(config: &CliConfig) -> CliResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.verbosity.log_filter()))
        .map_err(|e| CliError::config(format!("invalid log filter: {e}")))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &CliConfig) -> CliResult<()> {
    let filter = build_filter(config)?;
    let ansi = config.color.should_color();

    let installed = match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(ansi)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_ansi(ansi)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|e| CliError::config(format!("failed to initialize logging: {e}")))
}
