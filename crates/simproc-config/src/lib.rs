//! Shared configuration for the simulation process server.
//!
//! Server settings are resolved by `clap` with environment fallbacks, so the
//! precedence is command-line flag, then environment variable, then the
//! defaults in [`defaults`]. The process record that selects and
//! parameterises the simulated process lives in a separate JSON file and is
//! resolved by [`ProcessConfig::load`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

mod defaults;
mod logging;
mod process;
mod socket;

pub use defaults::{
    DEFAULT_CONFIG_PATH, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT, DEFAULT_PROCESS_NAME,
    DEFAULT_RATE, FALLBACK_CONFIG_PATH, default_config_path, default_log_filter,
    default_log_format, default_socket_endpoint, fallback_config_path,
};
pub use logging::LogFormat;
pub use process::{ProcessConfig, ProcessConfigIssue, ProcessConfigSource, ResolvedProcessConfig};
pub use socket::SocketEndpoint;

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "simprocd",
    version,
    about = "Serves a simulated process over a line-delimited JSON protocol"
)]
pub struct Config {
    /// Host address the server binds to.
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// TCP port the server binds to.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Primary location of the JSON process record.
    #[arg(long, env = "CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,
    /// Process record used when the primary location cannot be opened.
    #[arg(long, env = "FALLBACK_CONFIG_PATH", default_value = FALLBACK_CONFIG_PATH)]
    pub fallback_config_path: PathBuf,
    /// `tracing` filter expression, for example `info,simprocd::dispatch=debug`.
    #[arg(long, env = "SIMPROC_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
    /// Log line format.
    #[arg(long, env = "SIMPROC_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        let endpoint = default_socket_endpoint();
        Self {
            host: endpoint.host().to_owned(),
            port: endpoint.port(),
            config_path: default_config_path(),
            fallback_config_path: fallback_config_path(),
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
        }
    }
}

/// Errors raised while resolving server settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Command-line or environment input was rejected.
    #[error(transparent)]
    Cli(#[from] clap::Error),
}

impl ConfigError {
    /// Reports whether the error is a help or version request rather than a failure.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        let Self::Cli(error) = self;
        matches!(
            error.kind(),
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
        )
    }

    /// Prints the message the way `clap` does and terminates the process.
    pub fn exit(&self) -> ! {
        let Self::Cli(error) = self;
        error.exit()
    }
}

impl Config {
    /// Resolves settings from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Cli`] when a flag or environment variable does
    /// not parse, or when help or version output was requested.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Resolves settings from an explicit argument list (first item is the
    /// binary name) and the current environment.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?)
    }

    /// Endpoint the listener binds to.
    #[must_use]
    pub fn socket_endpoint(&self) -> SocketEndpoint {
        SocketEndpoint::tcp(self.host.clone(), self.port)
    }

    /// Primary process record path.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Fallback process record path.
    #[must_use]
    pub fn fallback_config_path(&self) -> &Path {
        &self.fallback_config_path
    }

    /// Filter expression handed to the telemetry subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format handed to the telemetry subscriber.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Loads the process record named by this configuration.
    #[must_use]
    pub fn resolve_process_config(&self) -> ResolvedProcessConfig {
        ProcessConfig::load(&self.config_path, &self.fallback_config_path)
    }
}
