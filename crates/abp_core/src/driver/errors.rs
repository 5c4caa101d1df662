//! Error types for the processing driver.
//!
//! Errors carry context that chains through layers:
//! Run → Job → Step → Engine detail

use thiserror::Error;

use crate::engine::EngineError;
use crate::models::ModelError;

/// Run-level error: nothing was processed.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The engine has not been loaded.
    #[error("Media engine '{engine}' is not loaded")]
    EngineNotLoaded { engine: String },

    /// A run-scoped clip (intro/outro) could not be staged.
    #[error("Failed to stage {role} clip '{name}': {message}")]
    SharedStagingFailed {
        role: String,
        name: String,
        message: String,
    },
}

impl DriverError {
    /// Create an engine not loaded error.
    pub fn engine_not_loaded(engine: impl Into<String>) -> Self {
        Self::EngineNotLoaded {
            engine: engine.into(),
        }
    }

    /// Create a shared staging error.
    pub fn shared_staging(
        role: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SharedStagingFailed {
            role: role.into(),
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Error from one job. Recorded in the run report, never fatal to the run
/// under the continue policy.
#[derive(Error, Debug)]
pub enum JobError {
    /// The source file could not be read.
    #[error("Failed to read source: {0}")]
    Source(#[from] ModelError),

    /// Writing into the engine failed.
    #[error("Failed to stage {name}: {source}")]
    Stage {
        name: String,
        #[source]
        source: EngineError,
    },

    /// An engine invocation failed.
    #[error("{step} step failed: {source}")]
    Step {
        step: String,
        #[source]
        source: EngineError,
    },

    /// The final artifact could not be read back.
    #[error("Failed to read output {name}: {source}")]
    ReadOutput {
        name: String,
        #[source]
        source: EngineError,
    },
}

impl JobError {
    /// Create a staging error.
    pub fn stage(name: impl Into<String>, source: EngineError) -> Self {
        Self::Stage {
            name: name.into(),
            source,
        }
    }

    /// Create a step failure error.
    pub fn step(step: impl Into<String>, source: EngineError) -> Self {
        Self::Step {
            step: step.into(),
            source,
        }
    }

    /// Create an output read error.
    pub fn read_output(name: impl Into<String>, source: EngineError) -> Self {
        Self::ReadOutput {
            name: name.into(),
            source,
        }
    }
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
