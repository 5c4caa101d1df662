//! Audio Batch Processor CLI.
//!
//! Fills the wizard from command-line flags, runs every file through ffmpeg
//! and writes the results to the output folder.
//!
//! # Usage
//!
//! ```bash
//! audio-batch concat --intro intro.mp3 --outro outro.mp3 ep1.mp3 ep2.mp3
//! audio-batch trim --start 5 --duration 60 ep1.mp3
//! audio-batch trim --trim-mode duration-end --duration 30 --end 1:00 ep1.mp3
//! audio-batch both --start 5 --outro outro.mp3 ep1.mp3
//! audio-batch theme dark
//! ```

mod args;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;

use abp_core::config::{ConfigManager, ConfigSection};
use abp_core::driver::ProcessingDriver;
use abp_core::engine::{FfmpegEngine, MediaEngine};
use abp_core::logging::{init_tracing_with_file, LogLevel, RunLoggerBuilder};
use abp_core::models::{FailurePolicy, RunResult, Theme};
use abp_core::session::start_run;
use abp_core::wizard::{EngineStatus, WizardState};

use args::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut manager = ConfigManager::new(&cli.config);
    manager
        .load_or_create()
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    if let Command::Theme { theme } = &cli.command {
        let theme = set_theme(&mut manager, *theme)?;
        println!("Theme: {}", theme.name());
        return Ok(ExitCode::SUCCESS);
    }

    apply_overrides(&mut manager, &cli);
    manager
        .ensure_dirs_exist()
        .context("Failed to create working directories")?;

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let _log_guard = init_tracing_with_file(level, &manager.logs_folder());
    tracing::info!("audio-batch {} starting", abp_core::version());

    process(&manager, &cli.command, level)
}

/// Set (or cycle) the theme and persist only the `[ui]` section.
fn set_theme(manager: &mut ConfigManager, theme: Option<Theme>) -> Result<Theme> {
    let theme = theme.unwrap_or_else(|| manager.settings().ui.theme.cycle());
    manager.settings_mut().ui.theme = theme;
    manager
        .update_section(ConfigSection::Ui)
        .context("Failed to save theme")?;
    Ok(theme)
}

/// Command-line flags take precedence over the config file for this run only.
fn apply_overrides(manager: &mut ConfigManager, cli: &Cli) {
    let settings = manager.settings_mut();
    if let Some(ref dir) = cli.output_dir {
        settings.paths.output_folder = dir.to_string_lossy().to_string();
    }
    if let Some(ref ffmpeg) = cli.ffmpeg {
        settings.processing.ffmpeg_path = ffmpeg.clone();
    }
    if cli.abort_on_error {
        settings.processing.failure_policy = FailurePolicy::Abort;
    }
}

fn process(manager: &ConfigManager, command: &Command, level: LogLevel) -> Result<ExitCode> {
    let settings = manager.settings();
    let mut wizard = WizardState::new();

    let mut engine = FfmpegEngine::new(&settings.processing.ffmpeg_path)
        .with_scratch_parent(manager.temp_root());
    match engine.load() {
        Ok(()) => wizard.set_engine_status(EngineStatus::Ready),
        Err(e) => {
            wizard.set_engine_status(EngineStatus::Unavailable(e.to_string()));
            bail!("Media engine unavailable: {}", e);
        }
    }

    command.fill_wizard(&mut wizard)?;

    let mut logger = RunLoggerBuilder::new(
        format!("run_{}", Local::now().format("%Y%m%d_%H%M%S")),
        manager.logs_folder(),
    )
    .config(settings.logging.to_log_config(level));
    if level == LogLevel::Debug {
        logger = logger.line_callback(Box::new(|line: &str| eprintln!("{}", line)));
    }
    let logger = logger.build().context("Failed to create run log")?;
    let log_path = logger.log_path().to_path_buf();
    tracing::info!("Run {} logging to {}", logger.run_name(), log_path.display());

    let driver = ProcessingDriver::new(settings.processing.command_builder())
        .with_policy(settings.processing.failure_policy)
        .with_logger(Arc::new(logger))
        .with_progress_callback(Box::new(|percent: u32, name: &str| {
            println!("[{:>3}%] {}", percent, name);
        }));

    let report = start_run(&mut wizard, &mut engine, &driver)?;

    let written = write_artifacts(&manager.output_folder(), &report.result)?;
    for path in &written {
        println!("Wrote {}", path.display());
    }
    for failure in &report.failures {
        eprintln!("{}", failure);
    }
    if report.aborted {
        eprintln!(
            "Stopped after {} of {} files",
            report.attempted(),
            report.total_jobs
        );
    }
    println!("Log: {}", log_path.display());

    if report.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Write each artifact under its display name.
///
/// Fails rather than overwrite an artifact written earlier in the same call.
fn write_artifacts(dir: &Path, result: &RunResult) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output folder {}", dir.display()))?;

    let mut written = Vec::with_capacity(result.len());
    for artifact in result.entries() {
        let path = dir.join(&artifact.display_name);
        if written.contains(&path) {
            bail!("Two results share the output name {}", artifact.display_name);
        }
        fs::write(&path, &artifact.data)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use abp_core::commands::CommandBuilder;
    use abp_core::models::{FileRef, JobConfiguration, OperationMode, ProcessedArtifact};
    use tempfile::tempdir;

    #[test]
    fn artifacts_written_under_display_names() {
        let dir = tempdir().unwrap();
        let mut result = RunResult::new();
        result.push(ProcessedArtifact {
            display_name: "processed_a.mp3".to_string(),
            data: b"aaa".to_vec(),
        });
        result.push(ProcessedArtifact {
            display_name: "processed_b.mp3".to_string(),
            data: b"bb".to_vec(),
        });

        let out = dir.path().join("out");
        let written = write_artifacts(&out, &result).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(fs::read(out.join("processed_a.mp3")).unwrap(), b"aaa");
        assert_eq!(fs::read(out.join("processed_b.mp3")).unwrap(), b"bb");
    }

    #[test]
    fn same_named_sources_write_separate_files() {
        let dir = tempdir().unwrap();
        let mut inputs = Vec::new();
        for folder in ["x", "y"] {
            let path = dir.path().join(folder).join("ep.mp3");
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, folder).unwrap();
            inputs.push(FileRef::from_path(path));
        }

        let config = JobConfiguration::new(OperationMode::Trim);
        let mut result = RunResult::new();
        for job in CommandBuilder::default().build_jobs(&inputs, &config) {
            result.push(ProcessedArtifact {
                display_name: job.display_name.clone(),
                data: job.source.read_bytes().unwrap(),
            });
        }

        let out = dir.path().join("out");
        let written = write_artifacts(&out, &result).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(fs::read(out.join("processed_ep.mp3")).unwrap(), b"x");
        assert_eq!(fs::read(out.join("processed_ep_1.mp3")).unwrap(), b"y");
    }

    #[test]
    fn duplicate_artifact_names_are_rejected() {
        let dir = tempdir().unwrap();
        let mut result = RunResult::new();
        for data in [b"one".to_vec(), b"two".to_vec()] {
            result.push(ProcessedArtifact {
                display_name: "processed_ep.mp3".to_string(),
                data,
            });
        }

        let err = write_artifacts(dir.path(), &result).unwrap_err();

        assert!(err.to_string().contains("processed_ep.mp3"));
        assert_eq!(fs::read(dir.path().join("processed_ep.mp3")).unwrap(), b"one");
    }

    #[test]
    fn theme_cycles_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut manager = ConfigManager::new(&path);
        manager.load_or_create().unwrap();

        assert_eq!(set_theme(&mut manager, None).unwrap(), Theme::Light);
        assert_eq!(set_theme(&mut manager, None).unwrap(), Theme::Dark);
        assert_eq!(set_theme(&mut manager, Some(Theme::System)).unwrap(), Theme::System);

        let mut reloaded = ConfigManager::new(&path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings().ui.theme, Theme::System);
    }

    #[test]
    fn overrides_apply_to_settings() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("settings.toml"));
        let cli = Cli::try_parse_from([
            "audio-batch",
            "--abort-on-error",
            "--ffmpeg",
            "/opt/ffmpeg",
            "-o",
            "elsewhere",
            "trim",
            "a.mp3",
        ])
        .unwrap();

        apply_overrides(&mut manager, &cli);

        let settings = manager.settings();
        assert_eq!(settings.processing.failure_policy, FailurePolicy::Abort);
        assert_eq!(settings.processing.ffmpeg_path, "/opt/ffmpeg");
        assert_eq!(settings.paths.output_folder, "elsewhere");
    }
}
