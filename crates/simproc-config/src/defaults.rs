use std::path::PathBuf;

use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Address the server binds to when `HOST` is unset.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Port the server binds to when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 11111;

/// Primary location of the process record when `CONFIG_PATH` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "/config/config.json";

/// Process record consulted when the primary location cannot be opened.
pub const FALLBACK_CONFIG_PATH: &str = "config/default_config.json";

/// Process name assumed when the record has no string `process` field.
pub const DEFAULT_PROCESS_NAME: &str = "counter";

/// Counter rate used when the record omits `rate` or it is not a number.
pub const DEFAULT_RATE: f64 = 1.0;

/// Default log filter expression used by the server.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Returns [`DEFAULT_LOG_FILTER`].
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the server.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Endpoint the server listens on when neither flags nor environment say otherwise.
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_HOST, DEFAULT_PORT)
}

/// Owned copy of [`DEFAULT_CONFIG_PATH`].
#[must_use]
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Owned copy of [`FALLBACK_CONFIG_PATH`].
#[must_use]
pub fn fallback_config_path() -> PathBuf {
    PathBuf::from(FALLBACK_CONFIG_PATH)
}
