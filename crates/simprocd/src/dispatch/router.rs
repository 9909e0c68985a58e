//! Command routing against a connection's process.
//!
//! The router is stateless: everything that changes between calls lives in the
//! process passed to [`CommandRouter::run_command`].

use serde_json::Value;
use tracing::debug;

use crate::process::Process;

use super::errors::ProtocolError;
use super::request::CommandRequest;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Commands understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Report the process's input schema.
    Inputs,
    /// Report the process's output schema.
    Outputs,
    /// Advance a state by an interval.
    Update,
}

impl Command {
    /// Parses a command name (exact, case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownCommand`] carrying the literal name.
    pub fn parse(name: &str) -> Result<Self, ProtocolError> {
        match name {
            "inputs" => Ok(Self::Inputs),
            "outputs" => Ok(Self::Outputs),
            "update" => Ok(Self::Update),
            _ => Err(ProtocolError::unknown_command(name)),
        }
    }

    /// Canonical wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inputs => "inputs",
            Self::Outputs => "outputs",
            Self::Update => "update",
        }
    }
}

/// Routes decoded commands to a [`Process`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandRouter;

impl CommandRouter {
    /// Creates a new router.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Executes one raw command line and returns the reply object.
    ///
    /// Protocol errors are folded into `{"error": ...}` replies; this never
    /// fails. Blank-line filtering is the caller's job.
    pub fn run_command(&self, line: &[u8], process: &mut dyn Process) -> Value {
        match self.route(line, process) {
            Ok(reply) => reply,
            Err(error) => {
                debug!(target: DISPATCH_TARGET, %error, "command rejected");
                error.to_reply()
            }
        }
    }

    fn route(&self, line: &[u8], process: &mut dyn Process) -> Result<Value, ProtocolError> {
        let request = CommandRequest::parse(line)?;
        let command = Command::parse(request.name())?;

        debug!(
            target: DISPATCH_TARGET,
            command = command.as_str(),
            "routing command"
        );

        Ok(match command {
            Command::Inputs => process.inputs(),
            Command::Outputs => process.outputs(),
            Command::Update => {
                let arguments = request.update_arguments();
                process.update(&arguments.state, arguments.interval)
            }
        })
    }
}

/// Reports whether a line carries no command at all.
///
/// Empty lines and lines made only of spaces, tabs and carriage returns are
/// skipped without a reply.
#[must_use]
pub fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|byte| matches!(byte, b' ' | b'\t' | b'\r'))
}
