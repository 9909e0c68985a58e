//! Protocol errors reported back to clients.
//!
//! Each variant's display text is the exact `error` string placed on the wire,
//! so the messages here are part of the protocol and must not change.

use serde_json::{Value, json};
use thiserror::Error;

/// Failures that produce an `{"error": ...}` reply while keeping the
/// connection open.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The line was not valid JSON.
    #[error("invalid json")]
    InvalidJson {
        /// Parser diagnostic, kept for logs only.
        #[source]
        source: serde_json::Error,
    },

    /// The value was not an object or had no `command` field.
    #[error("missing 'command' field")]
    MissingCommand,

    /// The `command` field was present but not a string.
    #[error("invalid 'command' field")]
    InvalidCommand,

    /// The command name is not one the server understands.
    #[error("unknown command: {name}")]
    UnknownCommand {
        /// Command name exactly as received.
        name: String,
    },
}

impl ProtocolError {
    /// Creates an unknown command error.
    #[must_use]
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::UnknownCommand { name: name.into() }
    }

    /// Renders the error as a reply object.
    #[must_use]
    pub fn to_reply(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}
