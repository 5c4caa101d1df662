//! Per-run log file.
//!
//! A `RunLogger` owns one log file for one processing run. Lines also go to
//! an optional callback (terminal or UI). Engine output is kept in a bounded
//! tail and only dumped when a step fails; in compact mode progress lines
//! are thinned to `progress_step` intervals.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogConfig, LogLevel, LogLineCallback, MessagePrefix};

/// Mutable logger state, guarded as one unit so lines never interleave.
struct Sink {
    writer: Option<BufWriter<File>>,
    callback: Option<LogLineCallback>,
    tail: VecDeque<String>,
    last_progress: Option<u32>,
}

impl Sink {
    fn emit(&mut self, line: &str) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writeln!(writer, "{}", line);
        }
        if let Some(callback) = self.callback.as_ref() {
            callback(line);
        }
    }
}

/// Log file for one processing run.
///
/// Shared between the driver and its caller behind an `Arc`; every method
/// takes `&self`.
pub struct RunLogger {
    run_name: String,
    log_path: PathBuf,
    config: LogConfig,
    sink: Mutex<Sink>,
}

impl RunLogger {
    /// Create `<log_dir>/<run_name>.log`, creating `log_dir` if needed.
    pub fn new(
        run_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        line_callback: Option<LogLineCallback>,
    ) -> std::io::Result<Self> {
        let run_name = run_name.into();
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&run_name)));
        let writer = BufWriter::new(File::create(&log_path)?);

        let sink = Sink {
            writer: Some(writer),
            callback: line_callback,
            tail: VecDeque::with_capacity(config.error_tail),
            last_progress: None,
        };

        Ok(Self {
            run_name,
            log_path,
            config,
            sink: Mutex::new(sink),
        })
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Write `message` if `level` passes the configured minimum.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level >= self.config.level {
            self.write_line(message);
        }
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    pub fn phase(&self, name: &str) {
        self.info(&MessagePrefix::Phase.format(name));
    }

    pub fn section(&self, name: &str) {
        self.info(&MessagePrefix::Section.format(name));
    }

    pub fn success(&self, message: &str) {
        self.info(&MessagePrefix::Success.format(message));
    }

    /// Log one engine invocation as `$ tool args...`, plus the pretty and
    /// JSON dumps when enabled.
    pub fn command(&self, tool: &str, args: &[String]) {
        self.info(&MessagePrefix::Command.format(&format!("{} {}", tool, args.join(" "))));

        if self.config.show_commands_pretty {
            self.log_args_pretty(tool, args);
        }
        if self.config.show_commands_json {
            self.log_args_json(tool, args);
        }
    }

    /// Log a progress percentage. Returns false when compact mode skipped it.
    ///
    /// In compact mode a value is written only when it crosses into a new
    /// `progress_step` bucket; 100 is always written.
    pub fn progress(&self, percent: u32) -> bool {
        if self.config.compact {
            let step = self.config.progress_step.max(1);
            let mut sink = self.sink.lock();
            let last_bucket = sink.last_progress.map(|p| p / step).unwrap_or(0);
            if percent < 100 && percent / step <= last_bucket {
                return false;
            }
            sink.last_progress = Some(percent);
        }

        self.info(&format!("Progress: {}%", percent));
        true
    }

    /// Record a line of engine output.
    ///
    /// Always kept in the tail; written to the log only outside compact mode.
    pub fn output_line(&self, line: &str) {
        let limit = self.config.error_tail;
        {
            let mut sink = self.sink.lock();
            if limit > 0 {
                while sink.tail.len() >= limit {
                    sink.tail.pop_front();
                }
                sink.tail.push_back(line.to_string());
            }
        }

        if !self.config.compact {
            self.write_line(&format!("[engine] {}", line));
        }
    }

    /// Dump the tail under a `[header/tail]` marker. No-op when empty.
    pub fn show_tail(&self, header: &str) {
        let lines: Vec<String> = self.sink.lock().tail.iter().cloned().collect();
        if lines.is_empty() {
            return;
        }
        self.write_line(&format!("[{}/tail]", header));
        for line in &lines {
            self.write_line(line);
        }
    }

    /// Forget earlier engine output, so the next `show_tail` covers only
    /// what follows.
    pub fn clear_tail(&self) {
        self.sink.lock().tail.clear();
    }

    /// One argument per line, shell-continuation style.
    pub fn log_args_pretty(&self, tool: &str, args: &[String]) {
        self.info(&MessagePrefix::Section.format(&format!("{} arguments", tool)));
        self.info(&format!("{} \\\n  {}", tool, args.join(" \\\n  ")));
    }

    /// Arguments as a JSON array.
    pub fn log_args_json(&self, tool: &str, args: &[String]) {
        match serde_json::to_string(args) {
            Ok(json) => self.info(&format!("{} args: {}", tool, json)),
            Err(e) => self.debug(&format!("Could not encode {} args as JSON: {}", tool, e)),
        }
    }

    pub fn flush(&self) {
        if let Some(writer) = self.sink.lock().writer.as_mut() {
            let _ = writer.flush();
        }
    }

    /// Flush and close the file. Later lines only reach the callback.
    pub fn close(&self) {
        let mut sink = self.sink.lock();
        if let Some(mut writer) = sink.writer.take() {
            let _ = writer.flush();
        }
    }

    fn write_line(&self, message: &str) {
        let line = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        };
        self.sink.lock().emit(&line);
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Replace characters that are not allowed in file names.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// Fluent construction for `RunLogger`.
pub struct RunLoggerBuilder {
    run_name: String,
    log_dir: PathBuf,
    config: LogConfig,
    line_callback: Option<LogLineCallback>,
}

impl RunLoggerBuilder {
    pub fn new(run_name: impl Into<String>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_name: run_name.into(),
            log_dir: log_dir.into(),
            config: LogConfig::default(),
            line_callback: None,
        }
    }

    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    pub fn line_callback(mut self, callback: LogLineCallback) -> Self {
        self.line_callback = Some(callback);
        self
    }

    pub fn build(self) -> std::io::Result<RunLogger> {
        RunLogger::new(self.run_name, self.log_dir, self.config, self.line_callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn plain() -> LogConfig {
        LogConfig {
            show_timestamps: false,
            ..LogConfig::default()
        }
    }

    #[test]
    fn creates_named_log_file() {
        let dir = tempdir().unwrap();
        let logger = RunLogger::new("run 12:30", dir.path(), LogConfig::default(), None).unwrap();

        assert!(logger.log_path().exists());
        assert!(logger.log_path().ends_with("run 12_30.log"));
    }

    #[test]
    fn lines_reach_file_after_flush() {
        let dir = tempdir().unwrap();
        let logger = RunLogger::new("batch", dir.path(), plain(), None).unwrap();

        logger.phase("File 1/2: a.mp3");
        logger.success("Produced processed_a.mp3");
        logger.flush();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("=== File 1/2: a.mp3 ==="));
        assert!(content.contains("[SUCCESS] Produced processed_a.mp3"));
    }

    #[test]
    fn callback_sees_every_line() {
        let dir = tempdir().unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let logger = RunLoggerBuilder::new("batch", dir.path())
            .line_callback(Box::new(move |_: &str| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .build()
            .unwrap();

        logger.info("one");
        logger.info("two");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn level_filter_hides_debug() {
        let dir = tempdir().unwrap();
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();

        let logger = RunLoggerBuilder::new("batch", dir.path())
            .config(plain())
            .line_callback(Box::new(move |msg: &str| sink.lock().push(msg.to_string())))
            .build()
            .unwrap();

        logger.debug("hidden");
        logger.warn("cleanup failed");

        let lines = lines.lock();
        assert_eq!(*lines, vec!["[WARNING] cleanup failed".to_string()]);
    }

    #[test]
    fn compact_progress_uses_buckets() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            compact: true,
            progress_step: 20,
            ..LogConfig::default()
        };
        let logger = RunLogger::new("batch", dir.path(), config, None).unwrap();

        assert!(!logger.progress(5));
        assert!(!logger.progress(15));
        assert!(logger.progress(20));
        assert!(!logger.progress(25));
        assert!(logger.progress(67));
        assert!(logger.progress(100));
    }

    #[test]
    fn verbose_mode_logs_all_progress() {
        let dir = tempdir().unwrap();
        let logger = RunLogger::new("batch", dir.path(), LogConfig::debug(), None).unwrap();
        assert!(logger.progress(1));
        assert!(logger.progress(2));
    }

    #[test]
    fn command_dumps_json_when_enabled() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            show_commands_json: true,
            ..plain()
        };
        let logger = RunLogger::new("batch", dir.path(), config, None).unwrap();

        logger.command("ffmpeg", &["-i".to_string(), "input_0.mp3".to_string()]);
        logger.flush();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("$ ffmpeg -i input_0.mp3"));
        assert!(content.contains(r#"ffmpeg args: ["-i","input_0.mp3"]"#));
    }

    #[test]
    fn tail_is_bounded_and_shown_on_failure() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            error_tail: 3,
            ..plain()
        };
        let logger = RunLogger::new("batch", dir.path(), config, None).unwrap();

        for i in 0..6 {
            logger.output_line(&format!("line {}", i));
        }

        logger.show_tail("Concat");
        logger.flush();
        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("[Concat/tail]\nline 3\nline 4\nline 5"));
        // Compact mode keeps engine output out of the log otherwise
        assert!(!content.contains("line 0"));

        logger.clear_tail();
        logger.output_line("line 6");
        logger.show_tail("Trim");
        logger.flush();
        let content = fs::read_to_string(logger.log_path()).unwrap();
        let after = content.split("[Trim/tail]").nth(1).unwrap();
        assert_eq!(after, "\nline 6\n");
    }

    #[test]
    fn close_stops_file_output() {
        let dir = tempdir().unwrap();
        let logger = RunLogger::new("batch", dir.path(), plain(), None).unwrap();
        logger.info("before");
        logger.close();
        logger.info("after");

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("before"));
        assert!(!content.contains("after"));
    }

    #[test]
    fn sanitizes_filename() {
        assert_eq!(sanitize_filename("normal_name"), "normal_name");
        assert_eq!(sanitize_filename("has/slash"), "has_slash");
        assert_eq!(sanitize_filename("a<b>c"), "a_b_c");
    }
}
