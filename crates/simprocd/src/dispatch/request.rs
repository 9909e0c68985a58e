//! Request decoding for the dispatch loop.
//!
//! Decoding is deliberately loose past the `command` field: arguments that are
//! missing or of the wrong type fall back to defaults instead of failing the
//! request.

use serde_json::{Map, Value};

use super::errors::ProtocolError;

/// A decoded command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    name: String,
    arguments: Value,
}

impl CommandRequest {
    /// Parses one line into a command request.
    ///
    /// Surrounding whitespace, including a stray carriage return, is accepted
    /// by the JSON parser.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidJson`] when the line does not parse,
    /// [`ProtocolError::MissingCommand`] when the value is not an object with a
    /// `command` field, and [`ProtocolError::InvalidCommand`] when that field is
    /// not a string.
    pub fn parse(line: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_slice(line).map_err(|source| ProtocolError::InvalidJson { source })?;
        Self::from_value(value)
    }

    /// Validates an already parsed value.
    ///
    /// # Errors
    ///
    /// See [`CommandRequest::parse`].
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let Value::Object(mut object) = value else {
            return Err(ProtocolError::MissingCommand);
        };
        let name = match object.remove("command") {
            None => return Err(ProtocolError::MissingCommand),
            Some(Value::String(name)) => name,
            Some(_) => return Err(ProtocolError::InvalidCommand),
        };
        let arguments = object.remove("arguments").unwrap_or(Value::Null);
        Ok(Self { name, arguments })
    }

    /// Command name as sent by the client.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interprets the arguments as `update` arguments.
    #[must_use]
    pub fn update_arguments(&self) -> UpdateArguments {
        UpdateArguments::from_value(&self.arguments)
    }
}

/// Arguments accepted by `update`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateArguments {
    /// State to advance; `{}` when absent or not an object.
    pub state: Value,
    /// Time step; `0.0` when absent or not a number.
    pub interval: f64,
}

impl Default for UpdateArguments {
    fn default() -> Self {
        Self {
            state: empty_object(),
            interval: 0.0,
        }
    }
}

impl UpdateArguments {
    /// Extracts `state` and `interval`, defaulting whatever is malformed.
    #[must_use]
    pub fn from_value(arguments: &Value) -> Self {
        let Some(arguments) = arguments.as_object() else {
            return Self::default();
        };
        Self {
            state: object_or_empty(arguments.get("state")),
            interval: number_or_zero(arguments.get("interval")),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn object_or_empty(value: Option<&Value>) -> Value {
    value
        .filter(|value| value.is_object())
        .cloned()
        .unwrap_or_else(empty_object)
}

fn number_or_zero(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}
