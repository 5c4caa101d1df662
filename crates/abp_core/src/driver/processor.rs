//! Processing driver that runs jobs against one engine, one at a time.

use std::sync::Arc;

use crate::commands::CommandBuilder;
use crate::engine::{EngineError, MediaEngine};
use crate::logging::RunLogger;
use crate::models::{FailurePolicy, FileRef, Job, JobConfiguration, ProcessedArtifact};

use super::errors::{DriverError, DriverResult, JobError};
use super::types::{CleanupResult, JobFailure, ProgressCallback, ProgressTracker, RunReport};

/// Runs jobs sequentially against a single shared engine.
///
/// The engine's virtual filesystem is shared mutable state, so jobs never
/// overlap. Intro/outro clips are staged once for the whole run.
pub struct ProcessingDriver {
    builder: CommandBuilder,
    policy: FailurePolicy,
    logger: Option<Arc<RunLogger>>,
    progress_callback: Option<ProgressCallback>,
}

impl ProcessingDriver {
    /// Create a driver using `builder` for engine arguments.
    pub fn new(builder: CommandBuilder) -> Self {
        Self {
            builder,
            policy: FailurePolicy::default(),
            logger: None,
            progress_callback: None,
        }
    }

    /// Set the failure policy (builder pattern).
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach a run logger (builder pattern).
    pub fn with_logger(mut self, logger: Arc<RunLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set the progress callback (builder pattern).
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The command builder jobs are expanded with.
    pub fn builder(&self) -> &CommandBuilder {
        &self.builder
    }

    /// Run every job in order.
    ///
    /// Job failures are recorded in the report; under
    /// `FailurePolicy::Abort` the run stops after the first one. Only
    /// run-level problems (engine not loaded, shared clips not stageable)
    /// return an error.
    pub fn run<E: MediaEngine + ?Sized>(
        &self,
        engine: &mut E,
        jobs: &[Job],
        config: &JobConfiguration,
    ) -> DriverResult<RunReport> {
        if !engine.is_loaded() {
            return Err(DriverError::engine_not_loaded(engine.name()));
        }

        let mut report = RunReport::new(jobs.len());
        if jobs.is_empty() {
            tracing::info!("No files to process");
            return Ok(report);
        }

        tracing::info!(
            "Starting run {} ({} files, mode {})",
            report.run_id,
            jobs.len(),
            config.operation_mode
        );
        self.log(|l| l.phase(&format!("Run {}", report.run_id)));

        let shared = self.stage_shared(engine, config, &mut report.cleanup)?;
        let mut progress = ProgressTracker::new(jobs.len());

        for job in jobs {
            let label = format!("File {}/{}: {}", job.index + 1, jobs.len(), job.source.name());
            tracing::info!("{}", label);
            self.log(|l| l.phase(&label));

            let failed = match self.run_job(engine, job, config, &mut report.cleanup) {
                Ok(artifact) => {
                    self.log(|l| l.success(&format!("Produced {}", artifact.display_name)));
                    report.result.push(artifact);
                    false
                }
                Err(error) => {
                    tracing::error!("File '{}' failed: {}", job.source.name(), error);
                    self.log(|l| {
                        l.error(&format!("File '{}' failed: {}", job.source.name(), error))
                    });
                    report.failures.push(JobFailure {
                        index: job.index,
                        source_name: job.source.name().to_string(),
                        error,
                    });
                    true
                }
            };

            let percent = progress.advance();
            self.report_progress(percent, job.source.name());

            if failed && self.policy == FailurePolicy::Abort {
                tracing::warn!(
                    "Aborting run after failure ({} of {} files attempted)",
                    report.attempted(),
                    jobs.len()
                );
                self.log(|l| l.warn("Aborting run after first failure"));
                report.aborted = true;
                break;
            }
        }

        if !shared.is_empty() {
            self.log(|l| l.section("Releasing shared clips"));
            for name in &shared {
                self.release(engine, name, &mut report.cleanup);
            }
        }

        if !report.cleanup.is_clean() {
            for failure in &report.cleanup.failed {
                tracing::warn!("Could not delete {}: {}", failure.name, failure.reason);
            }
        }

        self.log(|l| {
            l.success(&format!(
                "Run finished: {} produced, {} failed",
                report.result.len(),
                report.failures.len()
            ))
        });
        self.log(|l| l.flush());

        Ok(report)
    }

    /// Stage intro/outro once for the whole run. Returns the staged names.
    fn stage_shared<E: MediaEngine + ?Sized>(
        &self,
        engine: &mut E,
        config: &JobConfiguration,
        cleanup: &mut CleanupResult,
    ) -> DriverResult<Vec<String>> {
        let clips = [
            ("intro", config.active_intro(), self.builder.intro_name(config)),
            ("outro", config.active_outro(), self.builder.outro_name(config)),
        ];

        let mut staged: Vec<String> = Vec::new();
        for (role, clip, name) in clips {
            let (Some(clip), Some(name)) = (clip, name) else {
                continue;
            };

            if let Err(message) = self.stage_clip(engine, clip, &name) {
                for done in &staged {
                    self.release(engine, done, cleanup);
                }
                return Err(DriverError::shared_staging(role, clip.name(), message));
            }

            self.log(|l| l.info(&format!("Staged {} clip '{}' as {}", role, clip.name(), name)));
            staged.push(name);
        }
        Ok(staged)
    }

    fn stage_clip<E: MediaEngine + ?Sized>(
        &self,
        engine: &mut E,
        clip: &FileRef,
        name: &str,
    ) -> Result<(), String> {
        let bytes = clip.read_bytes().map_err(|e| e.to_string())?;
        engine.write_file(name, &bytes).map_err(|e| e.to_string())
    }

    /// Run one job, then release everything it left in the engine.
    fn run_job<E: MediaEngine + ?Sized>(
        &self,
        engine: &mut E,
        job: &Job,
        config: &JobConfiguration,
        cleanup: &mut CleanupResult,
    ) -> Result<ProcessedArtifact, JobError> {
        let mut created = Vec::new();
        let outcome = self.execute_job(engine, job, config, &mut created, cleanup);

        for name in created {
            self.release(engine, &name, cleanup);
        }
        outcome
    }

    fn execute_job<E: MediaEngine + ?Sized>(
        &self,
        engine: &mut E,
        job: &Job,
        config: &JobConfiguration,
        created: &mut Vec<String>,
        cleanup: &mut CleanupResult,
    ) -> Result<ProcessedArtifact, JobError> {
        let bytes = job.source.read_bytes()?;
        engine
            .write_file(&job.input_name, &bytes)
            .map_err(|e| JobError::stage(&job.input_name, e))?;
        created.push(job.input_name.clone());

        for step in self.builder.build_engine_arguments(job, config) {
            if let Some((name, text)) = step.staged_text() {
                engine
                    .write_file(name, text.as_bytes())
                    .map_err(|e| JobError::stage(name, e))?;
                created.push(name.to_string());
            }

            tracing::debug!("{} step: {:?}", step.kind.label(), step.args);
            self.log(|l| l.command(engine.name(), &step.args));

            // A failed exec may still leave a partial output behind
            created.push(step.output.clone());
            self.log(|l| l.clear_tail());
            let outcome = engine.exec(&step.args, &mut |line: &str| {
                self.log(|l| l.output_line(line))
            });
            if let Err(e) = outcome {
                self.log(|l| l.show_tail(step.kind.label()));
                return Err(JobError::step(step.kind.label(), e));
            }

            for name in &step.cleanup_after {
                if let Some(pos) = created.iter().position(|n| n == name) {
                    created.remove(pos);
                    self.release(engine, name, cleanup);
                }
            }
        }

        let data = engine
            .read_file(&job.output_name)
            .map_err(|e| JobError::read_output(&job.output_name, e))?;

        Ok(ProcessedArtifact {
            display_name: job.display_name.clone(),
            data,
        })
    }

    /// Best-effort delete. Missing names are fine; other failures are recorded.
    fn release<E: MediaEngine + ?Sized>(
        &self,
        engine: &mut E,
        name: &str,
        cleanup: &mut CleanupResult,
    ) {
        match engine.delete_file(name) {
            Ok(()) => cleanup.deleted += 1,
            Err(EngineError::FileNotFound(_)) => {}
            Err(e) => {
                tracing::debug!("Cleanup of {} failed: {}", name, e);
                self.log(|l| l.warn(&format!("Could not delete {}: {}", name, e)));
                cleanup.record_failure(name, e.to_string());
            }
        }
    }

    fn report_progress(&self, percent: u32, name: &str) {
        self.log(|l| {
            l.progress(percent);
        });
        if let Some(ref callback) = self.progress_callback {
            callback(percent, name);
        }
    }

    fn log(&self, f: impl FnOnce(&RunLogger)) {
        if let Some(ref logger) = self.logger {
            f(logger);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use crate::logging::LogConfig;
    use crate::models::{OperationMode, TrimSpec};
    use parking_lot::Mutex;

    fn files(names: &[&str]) -> Vec<FileRef> {
        names
            .iter()
            .map(|n| FileRef::from_bytes(*n, n.as_bytes().to_vec()))
            .collect()
    }

    fn loaded_engine() -> MemoryEngine {
        let mut engine = MemoryEngine::new();
        engine.load().unwrap();
        engine
    }

    fn run(
        driver: &ProcessingDriver,
        engine: &mut MemoryEngine,
        inputs: &[FileRef],
        config: &JobConfiguration,
    ) -> RunReport {
        let jobs = driver.builder().build_jobs(inputs, config);
        driver.run(engine, &jobs, config).unwrap()
    }

    #[test]
    fn produces_one_artifact_per_file_in_order() {
        let driver = ProcessingDriver::new(CommandBuilder::default());
        let mut engine = loaded_engine();
        let config = JobConfiguration::new(OperationMode::Concat);

        let report = run(&driver, &mut engine, &files(&["a.mp3", "b.mp3", "c.mp3"]), &config);

        let names: Vec<_> = report
            .result
            .entries()
            .iter()
            .map(|a| a.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["processed_a.mp3", "processed_b.mp3", "processed_c.mp3"]);
        assert_eq!(report.result.entries()[1].data, b"b.mp3");
        assert!(report.all_succeeded());
    }

    #[test]
    fn concat_wraps_with_intro_and_outro() {
        let driver = ProcessingDriver::new(CommandBuilder::default());
        let mut engine = loaded_engine();
        let config = JobConfiguration::new(OperationMode::Concat)
            .with_intro(FileRef::from_bytes("intro.mp3", b"<".to_vec()))
            .with_outro(FileRef::from_bytes("outro.mp3", b">".to_vec()));

        let report = run(&driver, &mut engine, &files(&["x.mp3", "y.mp3"]), &config);

        assert_eq!(report.result.entries()[0].data, b"<x.mp3>");
        assert_eq!(report.result.entries()[1].data, b"<y.mp3>");
    }

    #[test]
    fn shared_clips_staged_once_and_released() {
        let driver = ProcessingDriver::new(CommandBuilder::default());
        let mut engine = loaded_engine();
        let config = JobConfiguration::new(OperationMode::Concat)
            .with_intro(FileRef::from_bytes("intro.mp3", b"<".to_vec()));

        run(&driver, &mut engine, &files(&["a.mp3", "b.mp3", "c.mp3"]), &config);

        let intro_writes = engine.writes().iter().filter(|n| *n == "intro.mp3").count();
        assert_eq!(intro_writes, 1);
        assert!(engine.file_names().is_empty(), "left behind: {:?}", engine.file_names());
    }

    #[test]
    fn both_mode_cleans_intermediates() {
        let driver = ProcessingDriver::new(CommandBuilder::default());
        let mut engine = loaded_engine();
        let config = JobConfiguration::new(OperationMode::Both)
            .with_trim(TrimSpec::start_and_duration(1.0, None).unwrap())
            .with_outro(FileRef::from_bytes("outro.mp3", b"!".to_vec()));

        let report = run(&driver, &mut engine, &files(&["a.mp3"]), &config);

        assert_eq!(report.result.entries()[0].data, b"a.mp3!");
        assert!(engine.deletes().contains(&"trimmed_0.mp3".to_string()));
        assert!(engine.deletes().contains(&"list_0.txt".to_string()));
        assert!(engine.file_names().is_empty());
        assert!(report.cleanup.is_clean());
    }

    #[test]
    fn continue_policy_skips_failed_file() {
        let driver = ProcessingDriver::new(CommandBuilder::default());
        let mut engine = MemoryEngine::new().fail_exec_on("input_1.mp3");
        engine.load().unwrap();
        let config = JobConfiguration::new(OperationMode::Trim);

        let report = run(&driver, &mut engine, &files(&["a.mp3", "b.mp3", "c.mp3"]), &config);

        assert_eq!(report.result.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].source_name, "b.mp3");
        assert!(matches!(report.failures[0].error, JobError::Step { .. }));
        assert!(!report.aborted);
        assert!(engine.file_names().is_empty());
    }

    #[test]
    fn abort_policy_stops_after_failure() {
        let driver =
            ProcessingDriver::new(CommandBuilder::default()).with_policy(FailurePolicy::Abort);
        let mut engine = MemoryEngine::new().fail_exec_on("input_0.mp3");
        engine.load().unwrap();
        let config = JobConfiguration::new(OperationMode::Trim);

        let report = run(&driver, &mut engine, &files(&["a.mp3", "b.mp3"]), &config);

        assert!(report.aborted);
        assert_eq!(report.attempted(), 1);
        assert!(report.result.is_empty());
        assert_eq!(engine.exec_calls().len(), 1);
    }

    #[test]
    fn progress_is_monotonic_and_ends_at_100() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let driver = ProcessingDriver::new(CommandBuilder::default())
            .with_progress_callback(Box::new(move |p: u32, _: &str| sink.lock().push(p)));
        let mut engine = MemoryEngine::new().fail_exec_on("input_2.mp3");
        engine.load().unwrap();
        let config = JobConfiguration::new(OperationMode::Concat);

        run(
            &driver,
            &mut engine,
            &files(&["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3", "f.mp3", "g.mp3"]),
            &config,
        );

        let seen = seen.lock();
        assert_eq!(seen.len(), 7);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 100);
        assert!(seen[..6].iter().all(|p| *p < 100));
    }

    #[test]
    fn engine_output_goes_to_log_and_failure_tail() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RunLogger::new("engine_lines", dir.path(), LogConfig::default(), None).unwrap();
        let log_path = logger.log_path().to_path_buf();
        let driver =
            ProcessingDriver::new(CommandBuilder::default()).with_logger(Arc::new(logger));
        let mut engine = MemoryEngine::new().fail_exec_on("input_1.mp3");
        engine.load().unwrap();
        let config = JobConfiguration::new(OperationMode::Trim);

        run(&driver, &mut engine, &files(&["a.mp3", "b.mp3"]), &config);
        drop(driver);

        let log = std::fs::read_to_string(log_path).unwrap();
        // Compact mode: successful output stays out of the log
        assert!(!log.contains("Output #0, to 'output_0.mp3'"));
        let tail = log.split("[Trim/tail]").nth(1).unwrap();
        assert!(tail.contains("Input #0, from 'input_1.mp3'"));
        assert!(tail.contains("input_1.mp3: Invalid data found when processing input"));
        assert!(!tail.contains("input_0.mp3"));
    }

    #[test]
    fn verbose_log_records_engine_output() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RunLogger::new("verbose", dir.path(), LogConfig::debug(), None).unwrap();
        let log_path = logger.log_path().to_path_buf();
        let driver =
            ProcessingDriver::new(CommandBuilder::default()).with_logger(Arc::new(logger));
        let mut engine = loaded_engine();
        let config = JobConfiguration::new(OperationMode::Concat)
            .with_intro(FileRef::from_bytes("intro.mp3", b"<".to_vec()));

        run(&driver, &mut engine, &files(&["a.mp3"]), &config);
        drop(driver);

        let log = std::fs::read_to_string(log_path).unwrap();
        assert!(log.contains("[engine] Output #0, to 'output_0.mp3'"));
        assert!(log.contains("--- Releasing shared clips ---"));
    }

    #[test]
    fn cleanup_failures_are_collected_not_raised() {
        let driver = ProcessingDriver::new(CommandBuilder::default());
        let mut engine = MemoryEngine::new().fail_delete_of("input_0.mp3");
        engine.load().unwrap();
        let config = JobConfiguration::new(OperationMode::Concat);

        let report = run(&driver, &mut engine, &files(&["a.mp3"]), &config);

        assert_eq!(report.result.len(), 1);
        assert_eq!(report.cleanup.failed.len(), 1);
        assert_eq!(report.cleanup.failed[0].name, "input_0.mp3");
    }

    #[test]
    fn unloaded_engine_is_rejected() {
        let driver = ProcessingDriver::new(CommandBuilder::default());
        let mut engine = MemoryEngine::new();
        let config = JobConfiguration::new(OperationMode::Concat);
        let jobs = driver.builder().build_jobs(&files(&["a.mp3"]), &config);

        assert!(matches!(
            driver.run(&mut engine, &jobs, &config),
            Err(DriverError::EngineNotLoaded { .. })
        ));
    }

    #[test]
    fn unreadable_intro_fails_run() {
        let driver = ProcessingDriver::new(CommandBuilder::default());
        let mut engine = loaded_engine();
        let config = JobConfiguration::new(OperationMode::Concat)
            .with_intro(FileRef::from_path("/definitely/missing/intro.mp3"));
        let jobs = driver.builder().build_jobs(&files(&["a.mp3"]), &config);

        let err = driver.run(&mut engine, &jobs, &config).unwrap_err();
        assert!(matches!(err, DriverError::SharedStagingFailed { .. }));
        assert!(engine.exec_calls().is_empty());
    }

    #[test]
    fn failed_outro_releases_staged_intro() {
        let driver = ProcessingDriver::new(CommandBuilder::default());
        let mut engine = loaded_engine();
        let config = JobConfiguration::new(OperationMode::Concat)
            .with_intro(FileRef::from_bytes("intro.mp3", b"<".to_vec()))
            .with_outro(FileRef::from_path("/definitely/missing/outro.mp3"));
        let jobs = driver.builder().build_jobs(&files(&["a.mp3"]), &config);

        let err = driver.run(&mut engine, &jobs, &config).unwrap_err();

        assert!(matches!(err, DriverError::SharedStagingFailed { .. }));
        assert_eq!(engine.writes(), ["intro.mp3".to_string()]);
        assert_eq!(engine.deletes(), ["intro.mp3".to_string()]);
        assert!(engine.file_names().is_empty());
    }

    #[test]
    fn unreadable_source_is_a_job_failure() {
        let driver = ProcessingDriver::new(CommandBuilder::default());
        let mut engine = loaded_engine();
        let config = JobConfiguration::new(OperationMode::Trim);
        let inputs = vec![
            FileRef::from_path("/definitely/missing/a.mp3"),
            FileRef::from_bytes("b.mp3", b"b".to_vec()),
        ];

        let report = run(&driver, &mut engine, &inputs, &config);
        assert_eq!(report.result.len(), 1);
        assert!(matches!(report.failures[0].error, JobError::Source(_)));
    }

    #[test]
    fn empty_job_list_is_empty_report() {
        let driver = ProcessingDriver::new(CommandBuilder::default());
        let mut engine = loaded_engine();
        let config = JobConfiguration::new(OperationMode::Trim);

        let report = driver.run(&mut engine, &[], &config).unwrap();
        assert!(report.result.is_empty());
        assert!(engine.writes().is_empty());
    }
}
