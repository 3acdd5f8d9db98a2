//! Error types shared by the viewer component and its configuration.

use thiserror::Error;

/// Errors raised when a range passed to the component cannot be applied.
///
/// None of these errors mutate state: the call is rejected as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Invalid range: start {start} is after end {end}")]
    Inverted { start: usize, end: usize },

    #[error("Range {start}..={end} is outside the sequence (1..={len})")]
    OutOfBounds { start: usize, end: usize, len: usize },
}

/// Errors that can occur while building a [`crate::config::SequenceConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid color for '{option}': '{value}'")]
    InvalidColor { option: &'static str, value: String },

    #[error("'{0}' must be greater than zero")]
    ZeroColumns(&'static str),

    #[error("'{option}' is {value}, at most {max} is supported")]
    TooManyColumns {
        option: &'static str,
        value: usize,
        max: usize,
    },

    #[error("Unknown format '{0}' (expected FASTA, CODATA, RAW or PRIDE)")]
    UnknownFormat(String),

    #[error("Invalid highlight '{0}': expected START:END[:FG[:BG]]")]
    InvalidHighlight(String),
}
