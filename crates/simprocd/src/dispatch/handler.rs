//! Per-connection receive, route, reply loop.

use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use tracing::{debug, warn};

use simproc_config::ProcessConfig;

use crate::health::HealthReporter;
use crate::process::{self, Process};
use crate::runtime::ShutdownFlag;
use crate::transport::{ConnectionHandler, ConnectionStream, FrameError, LineFramer};

use super::router::{CommandRouter, DISPATCH_TARGET, is_blank};

/// Why a connection loop ended.
#[derive(Debug)]
pub enum CloseReason {
    /// The client closed its side.
    EndOfStream,
    /// Shutdown was requested between lines.
    Shutdown,
    /// Reading the next line failed.
    ReadFailed(FrameError),
    /// Sending a reply failed.
    WriteFailed(FrameError),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream => formatter.write_str("end_of_stream"),
            Self::Shutdown => formatter.write_str("shutdown"),
            Self::ReadFailed(error) => write!(formatter, "read_failed: {error}"),
            Self::WriteFailed(error) => write!(formatter, "write_failed: {error}"),
        }
    }
}

/// What happened on one connection.
#[derive(Debug)]
pub struct ConnectionSummary {
    /// Lines answered with a reply.
    pub commands: usize,
    /// Why the loop stopped.
    pub reason: CloseReason,
}

/// Serves the command protocol against a process built per connection.
pub struct ProcessConnectionHandler {
    process_config: Arc<ProcessConfig>,
    router: CommandRouter,
    shutdown: ShutdownFlag,
    reporter: Arc<dyn HealthReporter>,
}

impl ProcessConnectionHandler {
    /// Creates a handler sharing `process_config` across connections.
    #[must_use]
    pub const fn new(
        process_config: Arc<ProcessConfig>,
        shutdown: ShutdownFlag,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        Self {
            process_config,
            router: CommandRouter::new(),
            shutdown,
            reporter,
        }
    }

    /// Runs the line loop over `stream` until the client leaves, an I/O error
    /// occurs, or shutdown is requested.
    ///
    /// The shutdown flag is checked before each read, so a client blocked in
    /// silence keeps its connection until it sends or disconnects.
    #[must_use]
    pub fn serve<S>(&self, stream: S, process: &mut dyn Process) -> ConnectionSummary
    where
        S: Read + Write,
    {
        let mut framer = LineFramer::new(stream);
        let mut commands = 0;
        let reason = loop {
            if self.shutdown.is_triggered() {
                break CloseReason::Shutdown;
            }
            let line = match framer.receive_line() {
                Ok(Some(line)) => line,
                Ok(None) => break CloseReason::EndOfStream,
                Err(error) => break CloseReason::ReadFailed(error),
            };
            if is_blank(&line) {
                continue;
            }
            let reply = self.router.run_command(&line, process);
            if let Err(error) = framer.send_value(&reply) {
                break CloseReason::WriteFailed(error);
            }
            commands += 1;
        };
        log_close(&reason);
        ConnectionSummary { commands, reason }
    }
}

impl ConnectionHandler for ProcessConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        let peer = stream.peer();
        self.reporter.connection_opened(peer);
        let mut process = process::construct(&self.process_config);
        let summary = self.serve(stream, process.as_mut());
        self.reporter.connection_closed(peer, &summary);
    }
}

fn log_close(reason: &CloseReason) {
    match reason {
        CloseReason::EndOfStream | CloseReason::Shutdown => {
            debug!(target: DISPATCH_TARGET, %reason, "connection loop finished");
        }
        CloseReason::ReadFailed(_) | CloseReason::WriteFailed(_) => {
            warn!(target: DISPATCH_TARGET, %reason, "connection loop aborted");
        }
    }
}
