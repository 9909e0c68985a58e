//! Line-delimited JSON server for simulated processes.
//!
//! `simprocd` listens on a TCP endpoint configured through
//! [`simproc_config`]. Every accepted connection gets its own thread and its
//! own [`Process`] instance, built from a process record loaded once at
//! startup. Clients send one JSON object per line (`inputs`, `outputs`, or
//! `update`) and receive one JSON object per line in return.
//!
//! Startup runs in a fixed order: configuration, telemetry, process record,
//! signal handlers, then the socket. A [`HealthReporter`] observes each stage
//! and every connection's lifetime so operators can follow the server from
//! structured logs alone.
//!
//! Shutdown is cooperative. `SIGINT` or `SIGTERM` raises a [`ShutdownFlag`];
//! the accept loop notices it within one backoff interval and stops, and each
//! connection stops before reading its next line.

mod bootstrap;
mod dispatch;
mod health;
pub mod process;
mod runtime;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Server, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use dispatch::{
    CloseReason, Command, CommandRequest, CommandRouter, ConnectionSummary,
    ProcessConnectionHandler, ProtocolError, UpdateArguments, is_blank,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{CounterProcess, Process, ProcessKind};
pub use runtime::{
    LaunchError, ShutdownError, ShutdownFlag, ShutdownSignal, SystemShutdownSignal, run_server,
    run_server_with,
};
pub use telemetry::TelemetryError;
pub use transport::{ConnectionHandler, ConnectionStream, FrameError, LineFramer, ListenerError};

#[cfg(test)]
mod tests;
