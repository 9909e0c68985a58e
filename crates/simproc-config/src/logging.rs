use clap::ValueEnum;
use strum::{Display, EnumString};

/// Supported logging output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display, ValueEnum)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable single line output, the default for interactive runs.
    #[default]
    Compact,
    /// Structured JSON suitable for container log collectors.
    Json,
}
