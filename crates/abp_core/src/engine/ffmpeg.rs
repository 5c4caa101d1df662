//! FFmpeg process engine.
//!
//! Uses a private scratch directory as the virtual filesystem and runs the
//! `ffmpeg` binary inside it, so engine names are plain relative paths.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tempfile::TempDir;

use super::errors::{EngineError, EngineResult};
use super::{validate_name, MediaEngine};

/// Number of stderr lines kept in an exec failure message.
const STDERR_TAIL_LINES: usize = 8;

/// Media engine backed by the ffmpeg command-line tool.
pub struct FfmpegEngine {
    /// ffmpeg binary (name on PATH or full path).
    binary: PathBuf,
    /// Parent directory for the scratch directory (system temp if unset).
    scratch_parent: Option<PathBuf>,
    /// Scratch directory, created by `load` and removed on drop.
    scratch: Option<TempDir>,
}

impl FfmpegEngine {
    /// Create an engine for the given ffmpeg binary. Nothing runs until `load`.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            scratch_parent: None,
            scratch: None,
        }
    }

    /// Place the scratch directory under `dir` (builder pattern).
    pub fn with_scratch_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(dir.into());
        self
    }

    fn scratch_path(&self, name: &str) -> EngineResult<PathBuf> {
        validate_name(name)?;
        let dir = self.scratch.as_ref().ok_or(EngineError::NotLoaded)?;
        Ok(dir.path().join(name))
    }

    fn tool_name(&self) -> String {
        self.binary
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "ffmpeg".to_string())
    }
}

impl MediaEngine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn load(&mut self) -> EngineResult<()> {
        if self.scratch.is_some() {
            return Ok(());
        }

        let status = Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                EngineError::unavailable(format!(
                    "failed to start {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !status.success() {
            return Err(EngineError::unavailable(format!(
                "{} -version exited with code {:?}",
                self.binary.display(),
                status.code()
            )));
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("abp-engine-");
        let scratch = match &self.scratch_parent {
            Some(parent) => {
                fs::create_dir_all(parent)
                    .map_err(|e| EngineError::io("creating scratch parent", e))?;
                builder.tempdir_in(parent)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| EngineError::io("creating scratch directory", e))?;

        tracing::debug!("ffmpeg engine scratch directory: {}", scratch.path().display());
        self.scratch = Some(scratch);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.scratch.is_some()
    }

    fn write_file(&mut self, name: &str, data: &[u8]) -> EngineResult<()> {
        let path = self.scratch_path(name)?;
        fs::write(&path, data).map_err(|e| EngineError::io(format!("writing {}", name), e))
    }

    fn read_file(&mut self, name: &str) -> EngineResult<Vec<u8>> {
        let path = self.scratch_path(name)?;
        if !path.exists() {
            return Err(EngineError::FileNotFound(name.to_string()));
        }
        fs::read(&path).map_err(|e| EngineError::io(format!("reading {}", name), e))
    }

    fn exec(&mut self, args: &[String], on_line: &mut dyn FnMut(&str)) -> EngineResult<()> {
        let dir = self.scratch.as_ref().ok_or(EngineError::NotLoaded)?;

        let mut cmd = Command::new(&self.binary);
        cmd.current_dir(dir.path())
            .args(["-hide_banner", "-nostdin", "-y"])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        tracing::debug!("Running FFmpeg: {:?}", cmd);

        let output = cmd.output().map_err(|e| {
            EngineError::exec_failed(self.tool_name(), -1, format!("failed to spawn: {}", e))
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        for &line in &lines {
            on_line(line);
        }

        if !output.status.success() {
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            return Err(EngineError::exec_failed(
                self.tool_name(),
                output.status.code().unwrap_or(-1),
                tail,
            ));
        }

        Ok(())
    }

    fn delete_file(&mut self, name: &str) -> EngineResult<()> {
        let path = self.scratch_path(name)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EngineError::FileNotFound(name.to_string()),
            _ => EngineError::io(format!("deleting {}", name), e),
        })
    }
}
