//! Wizard state controller.

use crate::commands::CommandBuilder;
use crate::driver::{JobFailure, RunReport};
use crate::models::{FileRef, JobConfiguration, OperationMode, RunResult, TrimMode, TrimSpec};

use super::errors::{WizardError, WizardResult};
use super::types::{EngineStatus, RunPlan, WizardStep};

/// User selections across the wizard, plus the last run's outcome.
///
/// Navigation (`request_advance`, `retreat`) never has side effects beyond
/// the current step. Starting a run is the separate `begin_run` call.
#[derive(Debug, Default)]
pub struct WizardState {
    step: WizardStep,
    engine_status: EngineStatus,
    mode: Option<OperationMode>,
    trim_mode: TrimMode,
    trim_start: f64,
    trim_duration: Option<f64>,
    trim_end: Option<f64>,
    intro: Option<FileRef>,
    outro: Option<FileRef>,
    files: Vec<FileRef>,
    report: RunReport,
}

impl WizardState {
    /// Create a wizard at the first step with the engine still loading.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Current engine status.
    pub fn engine_status(&self) -> &EngineStatus {
        &self.engine_status
    }

    /// Record the engine's load outcome.
    pub fn set_engine_status(&mut self, status: EngineStatus) {
        if let EngineStatus::Unavailable(ref reason) = status {
            tracing::warn!("Media engine unavailable: {}", reason);
        }
        self.engine_status = status;
    }

    // =========================================================================
    // Mode
    // =========================================================================

    /// Select the operation mode.
    ///
    /// Refused while the engine is unavailable. Settings entered for other
    /// modes are kept.
    pub fn select_mode(&mut self, mode: OperationMode) -> bool {
        if matches!(self.engine_status, EngineStatus::Unavailable(_)) {
            return false;
        }
        self.mode = Some(mode);
        true
    }

    /// Selected operation mode.
    pub fn mode(&self) -> Option<OperationMode> {
        self.mode
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn set_trim_mode(&mut self, trim_mode: TrimMode) {
        self.trim_mode = trim_mode;
    }

    pub fn trim_mode(&self) -> TrimMode {
        self.trim_mode
    }

    pub fn set_trim_start(&mut self, start: f64) {
        self.trim_start = start;
    }

    pub fn set_trim_duration(&mut self, duration: Option<f64>) {
        self.trim_duration = duration;
    }

    pub fn set_trim_end(&mut self, end: Option<f64>) {
        self.trim_end = end;
    }

    pub fn set_intro(&mut self, intro: Option<FileRef>) {
        self.intro = intro;
    }

    pub fn set_outro(&mut self, outro: Option<FileRef>) {
        self.outro = outro;
    }

    pub fn intro(&self) -> Option<&FileRef> {
        self.intro.as_ref()
    }

    pub fn outro(&self) -> Option<&FileRef> {
        self.outro.as_ref()
    }

    /// Trim range from the entered fields.
    ///
    /// Start/duration mode uses the start field (default 0) and optional
    /// duration; duration/end mode uses the optional duration and end.
    pub fn trim_spec(&self) -> WizardResult<TrimSpec> {
        let spec = match self.trim_mode {
            TrimMode::StartDuration => {
                TrimSpec::start_and_duration(self.trim_start, self.trim_duration)?
            }
            TrimMode::DurationEnd => TrimSpec::duration_and_end(self.trim_duration, self.trim_end)?,
        };
        Ok(spec)
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Replace the target files.
    pub fn set_files(&mut self, files: Vec<FileRef>) {
        self.files = files;
    }

    /// Append target files, keeping order.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = FileRef>) {
        self.files.extend(files);
    }

    /// Remove the target file at `index`.
    pub fn remove_file(&mut self, index: usize) -> Option<FileRef> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Whether the given step's requirements are met.
    pub fn can_advance(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Mode => self.mode.is_some(),
            WizardStep::Settings => true,
            WizardStep::Files => !self.files.is_empty(),
            WizardStep::Processing | WizardStep::Results => true,
        }
    }

    /// Move forward one step within Mode → Settings → Files.
    ///
    /// Leaving Files starts processing, which only `begin_run` does.
    pub fn request_advance(&mut self) -> bool {
        if !matches!(self.step, WizardStep::Mode | WizardStep::Settings) {
            return false;
        }
        if !self.can_advance(self.step) {
            return false;
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    /// Move back one step. No-op at Mode; never cancels a run.
    pub fn retreat(&mut self) -> bool {
        match self.step.previous() {
            Some(previous) => {
                self.step = previous;
                true
            }
            None => false,
        }
    }

    /// Return every field to its initial value, including the last result.
    ///
    /// The engine status is kept; the engine itself is not recreated.
    pub fn reset(&mut self) {
        let engine_status = std::mem::take(&mut self.engine_status);
        *self = Self {
            engine_status,
            ..Self::default()
        };
    }

    // =========================================================================
    // Runs
    // =========================================================================

    /// Snapshot of the current selections.
    pub fn job_configuration(&self) -> WizardResult<JobConfiguration> {
        let mode = self.mode.ok_or(WizardError::NoMode)?;
        let mut config = JobConfiguration::new(mode);
        if mode.trims() {
            config = config.with_trim(self.trim_spec()?);
        }
        if mode.concats() {
            config.intro = self.intro.clone();
            config.outro = self.outro.clone();
        }
        Ok(config)
    }

    /// Start a run from the Files step.
    ///
    /// Snapshots the configuration, builds jobs, clears the previous result
    /// and moves to Processing.
    pub fn begin_run(&mut self, builder: &CommandBuilder) -> WizardResult<RunPlan> {
        if self.step != WizardStep::Files {
            return Err(WizardError::not_at_step(WizardStep::Files, self.step));
        }
        match &self.engine_status {
            EngineStatus::Ready => {}
            EngineStatus::Loading => {
                return Err(WizardError::EngineUnavailable("still loading".to_string()))
            }
            EngineStatus::Unavailable(reason) => {
                return Err(WizardError::EngineUnavailable(reason.clone()))
            }
        }
        if !self.can_advance(WizardStep::Files) {
            return Err(WizardError::NoFiles);
        }

        let config = self.job_configuration()?;
        let jobs = builder.build_jobs(&self.files, &config);

        self.report = RunReport::new(jobs.len());
        self.step = WizardStep::Processing;
        tracing::debug!("Run planned: {} jobs, mode {}", jobs.len(), config.operation_mode);

        Ok(RunPlan { config, jobs })
    }

    /// Store a finished run and move to Results.
    pub fn complete_run(&mut self, report: RunReport) {
        self.report = report;
        self.step = WizardStep::Results;
    }

    /// Undo `begin_run` after a run-level failure.
    pub fn abandon_run(&mut self) {
        if self.step == WizardStep::Processing {
            self.step = WizardStep::Files;
        }
    }

    /// Artifacts of the last run.
    pub fn result(&self) -> &RunResult {
        &self.report.result
    }

    /// Failed jobs of the last run.
    pub fn failures(&self) -> &[JobFailure] {
        &self.report.failures
    }

    /// Full report of the last run.
    pub fn report(&self) -> &RunReport {
        &self.report
    }
}
