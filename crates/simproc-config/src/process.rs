//! The process record: which simulated process to build and its parameters.
//!
//! The record is a loosely typed JSON object. Every field is optional and a
//! field with the wrong type is treated as absent, so a broken record degrades
//! to defaults instead of stopping the server.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::defaults::{DEFAULT_PROCESS_NAME, DEFAULT_RATE};

/// Immutable record used to construct one process per connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessConfig {
    name: String,
    parameters: Map<String, Value>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::from_value(&Value::Object(Map::new()))
    }
}

impl ProcessConfig {
    /// Coerces a JSON value into a record, ignoring anything malformed.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let parameters = value.as_object().cloned().unwrap_or_default();
        let name = parameters
            .get("process")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROCESS_NAME)
            .to_owned();
        Self { name, parameters }
    }

    /// Name of the process variant to build.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Counter rate, defaulting to [`DEFAULT_RATE`].
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.number("rate").unwrap_or(DEFAULT_RATE)
    }

    /// Numeric parameter, or `None` when absent or not a number.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.parameters.get(key).and_then(Value::as_f64)
    }

    /// Resolves the record from `primary`, else `fallback`, else defaults.
    ///
    /// The primary file wins whenever it can be opened, even if its contents
    /// turn out to be unusable. Problems are reported through
    /// [`ResolvedProcessConfig::issue`] rather than as errors.
    #[must_use]
    pub fn load(primary: &Path, fallback: &Path) -> ResolvedProcessConfig {
        let (path, source) = match fs::File::open(primary) {
            Ok(_) => (primary, ProcessConfigSource::Primary(primary.to_path_buf())),
            Err(_) => (
                fallback,
                ProcessConfigSource::Fallback(fallback.to_path_buf()),
            ),
        };

        match read_record(path) {
            Ok(value) => ResolvedProcessConfig {
                config: Self::from_value(&value),
                source,
                issue: None,
            },
            Err(issue) => {
                let source = match (&source, &issue) {
                    (ProcessConfigSource::Fallback(_), ProcessConfigIssue::Read { .. }) => {
                        ProcessConfigSource::Defaults
                    }
                    _ => source,
                };
                ResolvedProcessConfig {
                    config: Self::default(),
                    source,
                    issue: Some(issue),
                }
            }
        }
    }
}

fn read_record(path: &Path) -> Result<Value, ProcessConfigIssue> {
    let text = fs::read_to_string(path).map_err(|source| ProcessConfigIssue::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value =
        serde_json::from_str(&text).map_err(|source| ProcessConfigIssue::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ProcessConfigIssue::NotAnObject {
            path: path.to_path_buf(),
        })
    }
}

/// Where the process record came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessConfigSource {
    /// The primary path could be opened.
    Primary(PathBuf),
    /// The primary path was missing; the fallback path was used.
    Fallback(PathBuf),
    /// Neither file was readable; built-in defaults apply.
    Defaults,
}

impl fmt::Display for ProcessConfigSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary(path) => write!(formatter, "primary:{}", path.display()),
            Self::Fallback(path) => write!(formatter, "fallback:{}", path.display()),
            Self::Defaults => formatter.write_str("defaults"),
        }
    }
}

/// Non-fatal problems met while reading the process record.
#[derive(Debug, Error)]
pub enum ProcessConfigIssue {
    /// The file could not be read.
    #[error("failed to read process record '{path}': {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The file did not contain valid JSON.
    #[error("process record '{path}' is not valid JSON: {source}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The file held JSON that was not an object.
    #[error("process record '{path}' is not a JSON object")]
    NotAnObject {
        /// Offending file.
        path: PathBuf,
    },
}

/// Outcome of [`ProcessConfig::load`].
#[derive(Debug)]
pub struct ResolvedProcessConfig {
    /// Record to build processes from.
    pub config: ProcessConfig,
    /// File (or defaults) the record came from.
    pub source: ProcessConfigSource,
    /// Problem that forced defaults, if any.
    pub issue: Option<ProcessConfigIssue>,
}
