//! Job and engine argument builder.
//!
//! Turns the target file list plus a `JobConfiguration` into per-file jobs,
//! and each job into the ordered engine invocations that produce its output.
//! Everything here is pure: nothing touches the engine.
//!
//! # Naming
//!
//! Engine names embed the job index so no two jobs share a name:
//!
//! | Stage        | Name                 |
//! |--------------|----------------------|
//! | staged input | `input_{i}.{ext}`    |
//! | trimmed      | `trimmed_{i}.{ext}`  |
//! | concat list  | `list_{i}.txt`       |
//! | final output | `output_{i}.{ext}`   |
//!
//! Intro and outro are staged once per run as `intro.{ext}` / `outro.{ext}`.

use std::collections::HashSet;

use crate::models::{FileRef, Job, JobConfiguration};

use super::trim::TrimBounds;

/// Extension used when a file name has none.
pub const DEFAULT_EXTENSION: &str = "mp3";

/// Prefix prepended to display names of produced files.
pub const DEFAULT_OUTPUT_PREFIX: &str = "processed_";

/// What an engine step does.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    /// Cut a time range out of the current file.
    Trim(TrimBounds),
    /// Join files listed in a concat list, in order.
    Concat {
        /// Name the list file is staged under.
        list_name: String,
        /// Engine names joined, in playback order.
        inputs: Vec<String>,
    },
}

impl StepKind {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Trim(_) => "Trim",
            StepKind::Concat { .. } => "Concat",
        }
    }
}

/// One engine invocation within a job.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStep {
    /// What the step does.
    pub kind: StepKind,
    /// Arguments passed to the engine, in order.
    pub args: Vec<String>,
    /// Name the step writes.
    pub output: String,
    /// Names that can be deleted once this step succeeds.
    pub cleanup_after: Vec<String>,
}

impl EngineStep {
    /// Text file that must be staged before the step runs, as `(name, contents)`.
    pub fn staged_text(&self) -> Option<(&str, String)> {
        match &self.kind {
            StepKind::Concat { list_name, inputs } => {
                Some((list_name.as_str(), concat_list_text(inputs)))
            }
            StepKind::Trim(_) => None,
        }
    }
}

/// Render a concat demuxer list.
pub fn concat_list_text(inputs: &[String]) -> String {
    inputs
        .iter()
        .map(|name| format!("file '{}'\n", name.replace('\'', "'\\''")))
        .collect()
}

/// Builder for jobs and their engine invocations.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    default_extension: String,
    output_prefix: String,
}

/// `ep.mp3` + 1 -> `ep_1.mp3`; names without an extension get `_1` appended.
fn with_suffix(name: &str, suffix: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", name, suffix),
    }
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION, DEFAULT_OUTPUT_PREFIX)
    }
}

impl CommandBuilder {
    /// Create a builder.
    ///
    /// # Arguments
    /// * `default_extension` - Extension for files whose name has none
    /// * `output_prefix` - Prefix for result display names
    pub fn new(default_extension: impl Into<String>, output_prefix: impl Into<String>) -> Self {
        let default_extension = default_extension.into();
        let default_extension = default_extension.trim_start_matches('.').to_ascii_lowercase();
        Self {
            default_extension: if default_extension.is_empty() {
                DEFAULT_EXTENSION.to_string()
            } else {
                default_extension
            },
            output_prefix: output_prefix.into(),
        }
    }

    fn extension_for(&self, file: &FileRef) -> String {
        file.extension()
            .unwrap_or_else(|| self.default_extension.clone())
    }

    /// Engine name of the run-scoped intro clip, if the configuration uses one.
    pub fn intro_name(&self, config: &JobConfiguration) -> Option<String> {
        config
            .active_intro()
            .map(|f| format!("intro.{}", self.extension_for(f)))
    }

    /// Engine name of the run-scoped outro clip, if the configuration uses one.
    pub fn outro_name(&self, config: &JobConfiguration) -> Option<String> {
        config
            .active_outro()
            .map(|f| format!("outro.{}", self.extension_for(f)))
    }

    /// Build one job per target file, in submission order.
    ///
    /// Deterministic: identical inputs give structurally identical jobs.
    /// Display names are unique within the run; a repeated file name gets
    /// the job index appended to its stem (`processed_ep_1.mp3`).
    pub fn build_jobs(&self, files: &[FileRef], config: &JobConfiguration) -> Vec<Job> {
        let mode = config.operation_mode;
        let mut taken = HashSet::new();
        let mut jobs = Vec::with_capacity(files.len());

        for (i, file) in files.iter().enumerate() {
            let ext = self.extension_for(file);

            let mut intermediate_names = Vec::new();
            if mode.trims() && mode.concats() {
                intermediate_names.push(format!("trimmed_{}.{}", i, ext));
            }
            if mode.concats() {
                intermediate_names.push(format!("list_{}.txt", i));
            }

            jobs.push(Job {
                index: i,
                source: file.clone(),
                input_name: format!("input_{}.{}", i, ext),
                intermediate_names,
                output_name: format!("output_{}.{}", i, ext),
                display_name: self.unique_display_name(file.name(), i, &mut taken),
            });
        }
        jobs
    }

    fn unique_display_name(&self, name: &str, index: usize, taken: &mut HashSet<String>) -> String {
        let mut candidate = format!("{}{}", self.output_prefix, name);
        let mut suffix = index;
        while taken.contains(&candidate) {
            candidate = format!("{}{}", self.output_prefix, with_suffix(name, suffix));
            suffix += 1;
        }
        taken.insert(candidate.clone());
        candidate
    }

    /// Build the ordered engine invocations for one job.
    ///
    /// Trim always runs before concat. When both run, the trimmed file is an
    /// intermediate that concat consumes and that is released once concat
    /// succeeds.
    pub fn build_engine_arguments(&self, job: &Job, config: &JobConfiguration) -> Vec<EngineStep> {
        let mut steps = Vec::new();
        let mode = config.operation_mode;
        let mut current = job.input_name.clone();

        if let Some(spec) = config.active_trim() {
            let bounds = TrimBounds::from_spec(&spec);
            let output = if mode.concats() {
                self.intermediate(job, "trimmed_")
                    .unwrap_or_else(|| job.output_name.clone())
            } else {
                job.output_name.clone()
            };

            steps.push(EngineStep {
                kind: StepKind::Trim(bounds),
                args: bounds.to_args(&current, &output),
                output: output.clone(),
                cleanup_after: Vec::new(),
            });
            current = output;
        }

        if mode.concats() {
            let list_name = self
                .intermediate(job, "list_")
                .unwrap_or_else(|| format!("list_{}.txt", job.index));

            let mut inputs = Vec::with_capacity(3);
            if let Some(intro) = self.intro_name(config) {
                inputs.push(intro);
            }
            inputs.push(current.clone());
            if let Some(outro) = self.outro_name(config) {
                inputs.push(outro);
            }

            let args = vec![
                "-f".to_string(),
                "concat".to_string(),
                "-safe".to_string(),
                "0".to_string(),
                "-i".to_string(),
                list_name.clone(),
                "-c".to_string(),
                "copy".to_string(),
                job.output_name.clone(),
            ];

            let mut cleanup_after = vec![list_name.clone()];
            if current != job.input_name {
                cleanup_after.push(current);
            }

            steps.push(EngineStep {
                kind: StepKind::Concat { list_name, inputs },
                args,
                output: job.output_name.clone(),
                cleanup_after,
            });
        }

        steps
    }

    fn intermediate(&self, job: &Job, prefix: &str) -> Option<String> {
        job.intermediate_names
            .iter()
            .find(|n| n.starts_with(prefix))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OperationMode, TrimSpec};

    fn files(names: &[&str]) -> Vec<FileRef> {
        names
            .iter()
            .map(|n| FileRef::from_bytes(*n, vec![1u8, 2, 3]))
            .collect()
    }

    #[test]
    fn trim_start_only_single_step() {
        let builder = CommandBuilder::default();
        let config = JobConfiguration::new(OperationMode::Trim)
            .with_trim(TrimSpec::start_and_duration(5.0, None).unwrap());

        let jobs = builder.build_jobs(&files(&["song.mp3"]), &config);
        assert_eq!(jobs.len(), 1);

        let steps = builder.build_engine_arguments(&jobs[0], &config);
        assert_eq!(steps.len(), 1);

        let step = &steps[0];
        match &step.kind {
            StepKind::Trim(bounds) => {
                assert_eq!(bounds.start, 5.0);
                assert!(bounds.is_open_ended());
            }
            other => panic!("expected trim step, got {:?}", other),
        }
        assert!(step.args.contains(&"-ss".to_string()));
        assert!(!step.args.contains(&"-t".to_string()));
        assert!(!step.args.contains(&"-to".to_string()));
        assert_eq!(step.output, "output_0.mp3");
    }

    #[test]
    fn concat_with_intro_and_outro() {
        let builder = CommandBuilder::default();
        let config = JobConfiguration::new(OperationMode::Concat)
            .with_intro(FileRef::from_bytes("jingle.mp3", vec![9u8]))
            .with_outro(FileRef::from_bytes("credits.mp3", vec![8u8]));

        let jobs = builder.build_jobs(&files(&["a.mp3", "b.mp3", "c.mp3"]), &config);
        assert_eq!(jobs.len(), 3);

        for (i, job) in jobs.iter().enumerate() {
            let steps = builder.build_engine_arguments(job, &config);
            assert_eq!(steps.len(), 1);

            match &steps[0].kind {
                StepKind::Concat { list_name, inputs } => {
                    assert_eq!(list_name, &format!("list_{}.txt", i));
                    assert_eq!(
                        inputs,
                        &vec![
                            "intro.mp3".to_string(),
                            format!("input_{}.mp3", i),
                            "outro.mp3".to_string()
                        ]
                    );
                }
                other => panic!("expected concat step, got {:?}", other),
            }
            assert_eq!(steps[0].cleanup_after, vec![format!("list_{}.txt", i)]);
        }
    }

    #[test]
    fn concat_without_clips_lists_only_source() {
        let builder = CommandBuilder::default();
        let config = JobConfiguration::new(OperationMode::Concat);
        let jobs = builder.build_jobs(&files(&["a.mp3"]), &config);
        let steps = builder.build_engine_arguments(&jobs[0], &config);

        let (name, text) = steps[0].staged_text().unwrap();
        assert_eq!(name, "list_0.txt");
        assert_eq!(text, "file 'input_0.mp3'\n");
    }

    #[test]
    fn duration_end_scenario() {
        let builder = CommandBuilder::default();
        let config = JobConfiguration::new(OperationMode::Trim)
            .with_trim(TrimSpec::duration_and_end(Some(30.0), Some(60.0)).unwrap());

        let jobs = builder.build_jobs(&files(&["a.mp3"]), &config);
        let steps = builder.build_engine_arguments(&jobs[0], &config);

        assert_eq!(
            steps[0].args,
            vec!["-i", "input_0.mp3", "-ss", "30", "-to", "60", "-c", "copy", "output_0.mp3"]
        );
    }

    #[test]
    fn both_mode_trims_then_concats() {
        let builder = CommandBuilder::default();
        let config = JobConfiguration::new(OperationMode::Both)
            .with_trim(TrimSpec::start_and_duration(1.0, Some(4.0)).unwrap())
            .with_outro(FileRef::from_bytes("outro.mp3", vec![1u8]));

        let jobs = builder.build_jobs(&files(&["x.mp3"]), &config);
        assert_eq!(
            jobs[0].intermediate_names,
            vec!["trimmed_0.mp3".to_string(), "list_0.txt".to_string()]
        );

        let steps = builder.build_engine_arguments(&jobs[0], &config);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].kind.label(), "Trim");
        assert_eq!(steps[0].output, "trimmed_0.mp3");
        assert_eq!(steps[1].kind.label(), "Concat");
        assert_eq!(
            steps[1].cleanup_after,
            vec!["list_0.txt".to_string(), "trimmed_0.mp3".to_string()]
        );

        match &steps[1].kind {
            StepKind::Concat { inputs, .. } => {
                assert_eq!(inputs, &vec!["trimmed_0.mp3".to_string(), "outro.mp3".to_string()]);
            }
            other => panic!("expected concat step, got {:?}", other),
        }
    }

    #[test]
    fn build_jobs_is_deterministic() {
        let builder = CommandBuilder::default();
        let config = JobConfiguration::new(OperationMode::Both)
            .with_trim(TrimSpec::start_and_duration(3.0, None).unwrap())
            .with_intro(FileRef::from_bytes("intro.wav", vec![1u8]));
        let inputs = files(&["a.flac", "b", "c.MP3"]);

        let first = builder.build_jobs(&inputs, &config);
        let second = builder.build_jobs(&inputs, &config);
        assert_eq!(first, second);

        let steps_a: Vec<_> = first
            .iter()
            .map(|j| builder.build_engine_arguments(j, &config))
            .collect();
        let steps_b: Vec<_> = second
            .iter()
            .map(|j| builder.build_engine_arguments(j, &config))
            .collect();
        assert_eq!(steps_a, steps_b);
    }

    #[test]
    fn same_file_name_from_different_folders_gets_distinct_display_names() {
        let builder = CommandBuilder::default();
        let config = JobConfiguration::new(OperationMode::Trim);
        let inputs = vec![
            FileRef::from_path("/x/ep.mp3"),
            FileRef::from_path("/y/ep.mp3"),
            FileRef::from_path("/z/ep_1.mp3"),
            FileRef::from_path("/w/README"),
            FileRef::from_path("/v/README"),
        ];

        let names: Vec<_> = builder
            .build_jobs(&inputs, &config)
            .into_iter()
            .map(|j| j.display_name)
            .collect();

        assert_eq!(
            names,
            vec![
                "processed_ep.mp3",
                "processed_ep_1.mp3",
                "processed_ep_1_2.mp3",
                "processed_README",
                "processed_README_4",
            ]
        );
    }

    #[test]
    fn names_follow_source_extension() {
        let builder = CommandBuilder::new(".ogg", "done_");
        let config = JobConfiguration::new(OperationMode::Concat)
            .with_intro(FileRef::from_bytes("intro.wav", vec![1u8]));

        let jobs = builder.build_jobs(&files(&["a.flac", "noext"]), &config);
        assert_eq!(jobs[0].input_name, "input_0.flac");
        assert_eq!(jobs[1].output_name, "output_1.ogg");
        assert_eq!(jobs[1].display_name, "done_noext");
        assert_eq!(builder.intro_name(&config).as_deref(), Some("intro.wav"));
    }

    #[test]
    fn concat_list_escapes_quotes() {
        let text = concat_list_text(&["it's.mp3".to_string()]);
        assert_eq!(text, "file 'it'\\''s.mp3'\n");
    }
}
