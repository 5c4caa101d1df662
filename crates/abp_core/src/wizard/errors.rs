//! Wizard error types.

use thiserror::Error;

use crate::models::ModelError;

use super::types::WizardStep;

/// Why the wizard refused to start a run.
#[derive(Error, Debug)]
pub enum WizardError {
    /// The media engine is not ready.
    #[error("Media engine is not available: {0}")]
    EngineUnavailable(String),

    /// The wizard is on the wrong step for this action.
    #[error("Expected step {expected}, wizard is at {actual}")]
    NotAtStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    /// No operation mode selected.
    #[error("No operation mode selected")]
    NoMode,

    /// No target files selected.
    #[error("No files selected")]
    NoFiles,

    /// The entered trim range is not valid.
    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] ModelError),
}

impl WizardError {
    /// Create a wrong step error.
    pub fn not_at_step(expected: WizardStep, actual: WizardStep) -> Self {
        Self::NotAtStep { expected, actual }
    }
}

/// Result type for wizard operations.
pub type WizardResult<T> = Result<T, WizardError>;
