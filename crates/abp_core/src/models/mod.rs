//! Data models for Audio Batch Processor.
//!
//! This module contains the core data structures used throughout the application:
//! - Enums for operation mode, trim mode, failure policy and theme
//! - Trim range specification and time parsing
//! - File references
//! - Job structures (configuration, per-file jobs, run results)

mod enums;
mod error;
mod files;
mod jobs;
mod trim;

// Re-export all public types
pub use enums::{FailurePolicy, OperationMode, Theme, TrimMode};
pub use error::{ModelError, ModelResult};
pub use files::{FileRef, FileSource};
pub use jobs::{Job, JobConfiguration, ProcessedArtifact, RunResult};
pub use trim::{format_seconds, parse_seconds, TrimSpec};
