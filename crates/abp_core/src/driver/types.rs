//! Core types for the processing driver.

use crate::models::RunResult;

use super::errors::JobError;

/// Progress callback type for reporting run progress.
///
/// Arguments: (percent_complete, display name of the file just finished)
pub type ProgressCallback = Box<dyn Fn(u32, &str) + Send + Sync>;

/// A job that did not produce an artifact.
#[derive(Debug)]
pub struct JobFailure {
    /// Job position in submission order.
    pub index: usize,
    /// Name of the target file.
    pub source_name: String,
    /// What went wrong.
    pub error: JobError,
}

impl std::fmt::Display for JobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "File '{}' failed: {}", self.source_name, self.error)
    }
}

/// An engine file that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    /// Engine file name.
    pub name: String,
    /// Error message from the engine.
    pub reason: String,
}

/// Outcome of best-effort cleanup across a run.
///
/// Deletion failures are collected here and logged; they never fail a job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupResult {
    /// Number of engine files deleted.
    pub deleted: usize,
    /// Deletions that failed.
    pub failed: Vec<CleanupFailure>,
}

impl CleanupResult {
    /// Record a failed deletion.
    pub fn record_failure(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.failed.push(CleanupFailure {
            name: name.into(),
            reason: reason.into(),
        });
    }

    /// Whether every deletion succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Unique run identifier.
    pub run_id: String,
    /// Number of jobs submitted.
    pub total_jobs: usize,
    /// Successful artifacts in submission order.
    pub result: RunResult,
    /// Jobs that failed, in submission order.
    pub failures: Vec<JobFailure>,
    /// Cleanup outcome.
    pub cleanup: CleanupResult,
    /// Whether the run stopped early under the abort policy.
    pub aborted: bool,
}

impl RunReport {
    /// Create an empty report for a run of `total_jobs` jobs.
    pub fn new(total_jobs: usize) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            total_jobs,
            ..Default::default()
        }
    }

    /// Whether every submitted job produced an artifact.
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty() && !self.aborted && self.result.len() == self.total_jobs
    }

    /// Number of jobs that were attempted.
    pub fn attempted(&self) -> usize {
        self.result.len() + self.failures.len()
    }
}

/// Integer progress over a fixed number of jobs.
///
/// Values never decrease, and `100` is only reported once every job is done.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: usize,
    completed: usize,
    last_percent: u32,
}

impl ProgressTracker {
    /// Create a tracker for `total` jobs.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            last_percent: 0,
        }
    }

    /// Mark one more job finished and return the new percentage.
    pub fn advance(&mut self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        self.completed = (self.completed + 1).min(self.total);

        let mut percent = ((self.completed as f64 / self.total as f64) * 100.0).round() as u32;
        if self.completed < self.total {
            percent = percent.min(99);
        }
        self.last_percent = percent.max(self.last_percent);
        self.last_percent
    }

}
