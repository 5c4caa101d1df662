//! Job structures: run configuration, per-file jobs and run results.

use super::enums::OperationMode;
use super::files::FileRef;
use super::trim::TrimSpec;

/// Snapshot of the user's choices for one processing run.
///
/// Taken when a run begins and never changed while it executes.
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfiguration {
    /// What to do with each file.
    pub operation_mode: OperationMode,
    /// Trim range (used when the mode trims).
    pub trim_spec: Option<TrimSpec>,
    /// Clip prepended to each file (used when the mode concats).
    pub intro: Option<FileRef>,
    /// Clip appended to each file (used when the mode concats).
    pub outro: Option<FileRef>,
}

impl JobConfiguration {
    /// Create a configuration with no trim range and no intro/outro.
    pub fn new(operation_mode: OperationMode) -> Self {
        Self {
            operation_mode,
            trim_spec: None,
            intro: None,
            outro: None,
        }
    }

    /// Set the trim range (builder pattern).
    pub fn with_trim(mut self, spec: TrimSpec) -> Self {
        self.trim_spec = Some(spec);
        self
    }

    /// Set the intro clip (builder pattern).
    pub fn with_intro(mut self, intro: FileRef) -> Self {
        self.intro = Some(intro);
        self
    }

    /// Set the outro clip (builder pattern).
    pub fn with_outro(mut self, outro: FileRef) -> Self {
        self.outro = Some(outro);
        self
    }

    /// Intro clip, only when the mode concatenates.
    pub fn active_intro(&self) -> Option<&FileRef> {
        self.intro.as_ref().filter(|_| self.operation_mode.concats())
    }

    /// Outro clip, only when the mode concatenates.
    pub fn active_outro(&self) -> Option<&FileRef> {
        self.outro.as_ref().filter(|_| self.operation_mode.concats())
    }

    /// Trim range to apply, only when the mode trims.
    ///
    /// A trimming mode with no range entered uses the default (from 0 to
    /// the end of the source).
    pub fn active_trim(&self) -> Option<TrimSpec> {
        if self.operation_mode.trims() {
            Some(self.trim_spec.unwrap_or_default())
        } else {
            None
        }
    }
}

/// Unit of work for one target file.
///
/// All engine file names embed the job index so jobs never collide in the
/// engine's virtual filesystem.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Position in submission order.
    pub index: usize,
    /// The target file.
    pub source: FileRef,
    /// Name the source is staged under.
    pub input_name: String,
    /// Names produced between input and output, in creation order.
    pub intermediate_names: Vec<String>,
    /// Name of the final artifact.
    pub output_name: String,
    /// Name shown to the user for the result.
    pub display_name: String,
}

impl Job {
    /// Every engine name this job may leave behind.
    pub fn scoped_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.intermediate_names.len() + 2);
        names.push(self.input_name.clone());
        names.extend(self.intermediate_names.iter().cloned());
        names.push(self.output_name.clone());
        names
    }
}

/// One successfully produced output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedArtifact {
    /// Name to save/download the artifact under.
    pub display_name: String,
    /// Artifact contents.
    pub data: Vec<u8>,
}

/// Ordered outputs of a processing run, one per successful job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    entries: Vec<ProcessedArtifact>,
}

impl RunResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an artifact (submission order is preserved).
    pub fn push(&mut self, artifact: ProcessedArtifact) {
        self.entries.push(artifact);
    }

    /// Artifacts in submission order.
    pub fn entries(&self) -> &[ProcessedArtifact] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all artifacts.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
