//! Error types for media engine operations.

use std::io;

use thiserror::Error;

/// Error from a media engine call.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine could not be initialized.
    #[error("Media engine unavailable: {0}")]
    Unavailable(String),

    /// An operation was attempted before `load` succeeded.
    #[error("Media engine is not loaded")]
    NotLoaded,

    /// A virtual filesystem name was not a single plain component.
    #[error("Invalid engine file name: '{0}'")]
    InvalidName(String),

    /// A name was read or deleted that does not exist.
    #[error("Engine file not found: {0}")]
    FileNotFound(String),

    /// Scratch storage I/O failed.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// The engine ran and reported failure.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    ExecFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },
}

impl EngineError {
    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create an exec failure error.
    pub fn exec_failed(tool: impl Into<String>, exit_code: i32, message: impl Into<String>) -> Self {
        Self::ExecFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
