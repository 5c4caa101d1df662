//! Processing driver.
//!
//! Runs a list of jobs against one media engine, strictly one at a time:
//!
//! 1. Stage intro/outro clips once for the run
//! 2. Per file: stage input → run each engine step → read output back
//! 3. Release per-job engine files, then the shared clips
//!
//! Failures of a single file are recorded in the `RunReport`; the
//! `FailurePolicy` decides whether the run continues.

mod errors;
mod processor;
mod types;

pub use errors::{DriverError, DriverResult, JobError};
pub use processor::ProcessingDriver;
pub use types::{
    CleanupFailure, CleanupResult, JobFailure, ProgressCallback, ProgressTracker, RunReport,
};
