//! Structured health reporting for server lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use simproc_config::{Config, ResolvedProcessConfig};

use crate::bootstrap::BootstrapError;
use crate::dispatch::ConnectionSummary;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config, process: &ResolvedProcessConfig);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the listening socket is bound.
    fn listener_ready(&self, addr: SocketAddr);

    /// Invoked when a connection's handler starts.
    fn connection_opened(&self, peer: SocketAddr);

    /// Invoked when a connection's handler returns.
    fn connection_closed(&self, peer: SocketAddr, summary: &ConnectionSummary);

    /// Invoked after the accept loop has stopped.
    fn shutdown_completed(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config, process: &ResolvedProcessConfig) {
        (**self).bootstrap_succeeded(config, process);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_ready(&self, addr: SocketAddr) {
        (**self).listener_ready(addr);
    }

    fn connection_opened(&self, peer: SocketAddr) {
        (**self).connection_opened(peer);
    }

    fn connection_closed(&self, peer: SocketAddr, summary: &ConnectionSummary) {
        (**self).connection_closed(peer, summary);
    }

    fn shutdown_completed(&self) {
        (**self).shutdown_completed();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting server bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config, process: &ResolvedProcessConfig) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            endpoint = %config.socket_endpoint(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            process = process.config.name(),
            rate = process.config.rate(),
            source = %process.source,
            "server bootstrap completed"
        );
        if let Some(issue) = &process.issue {
            tracing::warn!(
                target: HEALTH_TARGET,
                event = "process_record_defaulted",
                error = %issue,
                "process record unusable, using defaults"
            );
        }
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "server bootstrap failed"
        );
    }

    fn listener_ready(&self, addr: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            %addr,
            "server listening"
        );
    }

    fn connection_opened(&self, peer: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "connection_opened",
            %peer,
            "client connected"
        );
    }

    fn connection_closed(&self, peer: SocketAddr, summary: &ConnectionSummary) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "connection_closed",
            %peer,
            commands = summary.commands,
            reason = %summary.reason,
            "client disconnected"
        );
    }

    fn shutdown_completed(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_completed",
            "server stopped"
        );
    }
}
