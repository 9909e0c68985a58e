//! Process-wide shutdown coordination.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use thiserror::Error;
use tracing::debug;

use super::RUNTIME_TARGET;

/// Shared flag telling the accept loop and every connection to wind down.
///
/// The flag only gates loop continuation, so acquire/release ordering is
/// enough.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    raised: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Creates a lowered flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Idempotent.
    pub fn trigger(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Reports whether shutdown has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    fn shared(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.raised)
    }
}

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Arranges for `flag` to be raised when shutdown is requested.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Install`] when the notification source cannot
    /// be armed.
    fn install(&self, flag: &ShutdownFlag) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Raises the flag on `SIGINT` or `SIGTERM`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn install(&self, flag: &ShutdownFlag) -> Result<(), ShutdownError> {
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, flag.shared())
                .map_err(|source| ShutdownError::Install { source })?;
        }
        debug!(target: RUNTIME_TARGET, "termination signal handlers installed");
        Ok(())
    }
}
