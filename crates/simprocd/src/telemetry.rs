//! Process-wide `tracing` subscriber.
//!
//! Logs go to stderr so stdout stays free for anything a wrapper script pipes.
//! Colour is only used when stderr is a terminal.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::time::UtcTime;

use simproc_config::{Config, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression did not parse.
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        /// Expression as configured.
        filter: String,
        /// Parser diagnostic.
        #[source]
        source: ParseError,
    },
    /// A global subscriber was already installed by someone else.
    #[error("failed to install telemetry subscriber: {message}")]
    Subscriber {
        /// Installer diagnostic.
        message: String,
    },
}

/// Installs the subscriber described by `config` once per process.
///
/// Later calls are no-ops, so tests and embedders may bootstrap repeatedly;
/// only the first caller's filter and format take effect.
pub(crate) fn initialise(config: &Config) -> Result<(), TelemetryError> {
    INSTALLED.get_or_try_init(|| install(config.log_filter(), config.log_format()))?;
    Ok(())
}

fn install(filter: &str, format: LogFormat) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(filter).map_err(|source| TelemetryError::Filter {
        filter: filter.to_owned(),
        source,
    })?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_thread_names(true)
        .with_timer(UtcTime::rfc_3339());
    let installed = match format {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    installed.map_err(|error| TelemetryError::Subscriber {
        message: error.to_string(),
    })
}
