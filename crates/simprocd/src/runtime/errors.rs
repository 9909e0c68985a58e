//! Defines the unified error surface for server launch.

use thiserror::Error;

use simproc_config::ConfigError;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Errors that stop the server from starting or end it early.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the server failed.
    #[error("server bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Installing shutdown notification failed.
    #[error("failed to install shutdown handling: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
    /// Binding the socket or running the accept loop failed.
    #[error("socket listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
}

impl LaunchError {
    /// The configuration error behind a failed bootstrap, if that is the cause.
    ///
    /// Callers use this to let `clap` render usage and help output itself.
    #[must_use]
    pub const fn configuration_error(&self) -> Option<&ConfigError> {
        match self {
            Self::Bootstrap {
                source: BootstrapError::Configuration { source },
            } => Some(source),
            _ => None,
        }
    }
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}
