//! Wizard step and engine status types.

use crate::models::{Job, JobConfiguration};

/// The five linear wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WizardStep {
    /// Choose concat, trim or both.
    #[default]
    Mode,
    /// Trim range and intro/outro clips.
    Settings,
    /// Target files.
    Files,
    /// Run in progress.
    Processing,
    /// Produced artifacts.
    Results,
}

impl WizardStep {
    /// All steps in order.
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Mode,
        WizardStep::Settings,
        WizardStep::Files,
        WizardStep::Processing,
        WizardStep::Results,
    ];

    /// 1-based step number for display.
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Mode => 1,
            WizardStep::Settings => 2,
            WizardStep::Files => 3,
            WizardStep::Processing => 4,
            WizardStep::Results => 5,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::Mode => "Mode",
            WizardStep::Settings => "Settings",
            WizardStep::Files => "Files",
            WizardStep::Processing => "Processing",
            WizardStep::Results => "Results",
        }
    }

    /// The following step, if any.
    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Mode => Some(WizardStep::Settings),
            WizardStep::Settings => Some(WizardStep::Files),
            WizardStep::Files => Some(WizardStep::Processing),
            WizardStep::Processing => Some(WizardStep::Results),
            WizardStep::Results => None,
        }
    }

    /// The preceding step, if any.
    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Mode => None,
            WizardStep::Settings => Some(WizardStep::Mode),
            WizardStep::Files => Some(WizardStep::Settings),
            WizardStep::Processing => Some(WizardStep::Files),
            WizardStep::Results => Some(WizardStep::Processing),
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.number(), self.name())
    }
}

/// Load state of the media engine, as seen by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineStatus {
    /// Engine not loaded yet.
    #[default]
    Loading,
    /// Engine loaded and usable.
    Ready,
    /// Engine failed to load; the wizard cannot be used.
    Unavailable(String),
}

/// Everything the driver needs for one run, snapshotted by `begin_run`.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Immutable configuration for the whole run.
    pub config: JobConfiguration,
    /// One job per target file, in submission order.
    pub jobs: Vec<Job>,
}
