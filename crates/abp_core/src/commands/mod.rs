//! Engine command building.
//!
//! This module provides:
//! - `TrimBounds`: trim range arithmetic (start/duration/end resolution)
//! - `CommandBuilder`: per-file jobs and their ordered engine invocations
//!
//! # Example
//!
//! ```
//! use abp_core::commands::CommandBuilder;
//! use abp_core::models::{FileRef, JobConfiguration, OperationMode, TrimSpec};
//!
//! let builder = CommandBuilder::default();
//! let config = JobConfiguration::new(OperationMode::Trim)
//!     .with_trim(TrimSpec::start_and_duration(5.0, None).unwrap());
//! let files = vec![FileRef::from_bytes("episode.mp3", vec![0u8; 16])];
//!
//! let jobs = builder.build_jobs(&files, &config);
//! let steps = builder.build_engine_arguments(&jobs[0], &config);
//! assert_eq!(steps[0].args, vec!["-i", "input_0.mp3", "-ss", "5", "-c", "copy", "output_0.mp3"]);
//! ```

mod builder;
mod trim;

pub use builder::{
    concat_list_text, CommandBuilder, EngineStep, StepKind, DEFAULT_EXTENSION,
    DEFAULT_OUTPUT_PREFIX,
};
pub use trim::TrimBounds;
