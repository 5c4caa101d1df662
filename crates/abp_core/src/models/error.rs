//! Error types for model validation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or reading model values.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A time field was negative, NaN or infinite.
    #[error("Invalid {field}: {value} (expected a non-negative number of seconds)")]
    InvalidSeconds { field: String, value: f64 },

    /// A time field could not be parsed.
    #[error("Failed to parse {field} '{input}': {message}")]
    ParseSeconds {
        field: String,
        input: String,
        message: String,
    },

    /// A file reference could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ModelError {
    /// Create an invalid seconds error.
    pub fn invalid_seconds(field: impl Into<String>, value: f64) -> Self {
        Self::InvalidSeconds {
            field: field.into(),
            value,
        }
    }

    /// Create a parse error for a time field.
    pub fn parse_seconds(
        field: impl Into<String>,
        input: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ParseSeconds {
            field: field.into(),
            input: input.into(),
            message: message.into(),
        }
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
