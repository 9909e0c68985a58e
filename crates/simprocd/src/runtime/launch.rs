//! Launch sequencing from configuration to a stopped accept loop.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::ProcessConnectionHandler;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::SocketListener;

use super::RUNTIME_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownFlag, ShutdownSignal, SystemShutdownSignal};

/// Runs the server with the production collaborators until `SIGINT` or
/// `SIGTERM`.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, signal installation, binding, or
/// the accept loop fails.
pub fn run_server() -> Result<(), LaunchError> {
    run_server_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        &SystemShutdownSignal,
    )
}

/// Runs the server with injected collaborators.
///
/// Blocks until the accept loop stops. Connection threads are detached and
/// may still be finishing their current line when this returns.
///
/// # Errors
///
/// See [`run_server`].
pub fn run_server_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    signal: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let server = bootstrap_with(loader, reporter.as_ref())?;
    let shutdown = ShutdownFlag::new();
    signal.install(&shutdown)?;

    let endpoint = server.config().socket_endpoint();
    let listener = SocketListener::bind(&endpoint)?;
    reporter.listener_ready(listener.local_addr());

    let handler = Arc::new(ProcessConnectionHandler::new(
        server.process_config(),
        shutdown.clone(),
        Arc::clone(&reporter),
    ));
    let listener_handle = listener.start(handler, shutdown.clone())?;
    let outcome = listener_handle.join();

    shutdown.trigger();
    info!(
        target: RUNTIME_TARGET,
        %endpoint,
        "shutdown sequence completed"
    );
    reporter.shutdown_completed();
    Ok(outcome?)
}
