//! Command-line arguments and their mapping onto the wizard.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use abp_core::models::{parse_seconds, FileRef, OperationMode, Theme, TrimMode};
use abp_core::wizard::WizardState;

// ───────────────────────────── CLI definition ─────────────────────────────

/// Top-level CLI entry point for the `audio-batch` binary.
#[derive(Parser, Debug)]
#[command(
    name = "audio-batch",
    about = "Batch-trim audio files and wrap them with intro/outro clips",
    version
)]
pub struct Cli {
    /// Config file path.
    #[arg(long, global = true, default_value = ".config/settings.toml")]
    pub config: PathBuf,

    /// Write processed files here instead of the configured output folder.
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// ffmpeg binary to use instead of the configured one.
    #[arg(long, global = true)]
    pub ffmpeg: Option<String>,

    /// Stop the run at the first failed file.
    #[arg(long, global = true)]
    pub abort_on_error: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available sub-commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wrap each file with an intro and/or outro clip.
    Concat {
        #[command(flatten)]
        clips: ClipArgs,

        /// Target audio files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Cut a time range out of each file.
    Trim {
        #[command(flatten)]
        trim: TrimArgs,

        /// Target audio files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Trim each file, then wrap it with intro/outro clips.
    Both {
        #[command(flatten)]
        trim: TrimArgs,

        #[command(flatten)]
        clips: ClipArgs,

        /// Target audio files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Set the theme preference and print it. Without a value, moves to the
    /// next one in light → dark → system order.
    Theme {
        /// light, dark or system.
        #[arg(value_parser = parse_theme)]
        theme: Option<Theme>,
    },
}

/// Intro/outro clip flags.
#[derive(Args, Debug, Default)]
pub struct ClipArgs {
    /// Clip prepended to every file.
    #[arg(long)]
    pub intro: Option<PathBuf>,

    /// Clip appended to every file.
    #[arg(long)]
    pub outro: Option<PathBuf>,
}

/// Trim range flags. Times accept seconds (`90`, `2.5`) or `h:m:s`.
#[derive(Args, Debug, Default)]
pub struct TrimArgs {
    /// How the range is given.
    #[arg(long, value_enum, default_value_t = TrimModeArg::StartDuration)]
    pub trim_mode: TrimModeArg,

    /// Start of the kept range (start-duration mode).
    #[arg(long, value_parser = parse_start)]
    pub start: Option<f64>,

    /// Length of the kept range.
    #[arg(long, value_parser = parse_duration)]
    pub duration: Option<f64>,

    /// End of the kept range (duration-end mode).
    #[arg(long, value_parser = parse_end)]
    pub end: Option<f64>,
}

/// `--trim-mode` values.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrimModeArg {
    /// Keep `duration` seconds from `start`.
    #[default]
    StartDuration,
    /// Keep the `duration` seconds that end at `end`.
    DurationEnd,
}

impl From<TrimModeArg> for TrimMode {
    fn from(arg: TrimModeArg) -> Self {
        match arg {
            TrimModeArg::StartDuration => TrimMode::StartDuration,
            TrimModeArg::DurationEnd => TrimMode::DurationEnd,
        }
    }
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    s.parse()
}

fn parse_time(field: &str, s: &str) -> Result<f64, String> {
    match parse_seconds(field, s) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err("expected a time value".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_start(s: &str) -> Result<f64, String> {
    parse_time("start", s)
}

fn parse_duration(s: &str) -> Result<f64, String> {
    parse_time("duration", s)
}

fn parse_end(s: &str) -> Result<f64, String> {
    parse_time("end", s)
}

// ───────────────────────────── Wizard mapping ─────────────────────────────

impl Command {
    /// Walk the wizard through Mode → Settings → Files with these arguments.
    ///
    /// Leaves the wizard at Files, ready for `begin_run`.
    pub fn fill_wizard(&self, wizard: &mut WizardState) -> Result<()> {
        let (mode, trim, clips, files) = match self {
            Command::Concat { clips, files } => (OperationMode::Concat, None, Some(clips), files),
            Command::Trim { trim, files } => (OperationMode::Trim, Some(trim), None, files),
            Command::Both { trim, clips, files } => {
                (OperationMode::Both, Some(trim), Some(clips), files)
            }
            Command::Theme { .. } => bail!("The theme command does not process files"),
        };

        if !wizard.select_mode(mode) {
            bail!("Cannot select mode {}: media engine unavailable", mode);
        }
        advance(wizard)?;

        if let Some(trim) = trim {
            wizard.set_trim_mode(trim.trim_mode.into());
            if let Some(start) = trim.start {
                wizard.set_trim_start(start);
            }
            wizard.set_trim_duration(trim.duration);
            wizard.set_trim_end(trim.end);
        }
        if let Some(clips) = clips {
            wizard.set_intro(clips.intro.as_ref().map(FileRef::from_path));
            wizard.set_outro(clips.outro.as_ref().map(FileRef::from_path));
        }
        advance(wizard)?;

        wizard.set_files(files.iter().map(FileRef::from_path).collect());
        Ok(())
    }
}

fn advance(wizard: &mut WizardState) -> Result<()> {
    let from = wizard.step();
    if !wizard.request_advance() {
        bail!("Cannot leave step {}", from);
    }
    Ok(())
}
