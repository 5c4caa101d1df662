//! Typed contents of `settings.toml`, one struct per table.

use serde::{Deserialize, Serialize};

use crate::commands::{CommandBuilder, DEFAULT_EXTENSION, DEFAULT_OUTPUT_PREFIX};
use crate::logging::{LogConfig, LogLevel};
use crate::models::{FailurePolicy, Theme};

/// Everything in `settings.toml`. A missing table or key takes its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub logging: LoggingSettings,
    pub processing: ProcessingSettings,
    pub ui: UiSettings,
}

/// `[paths]`. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Where processed files are written.
    pub output_folder: String,
    /// Parent of the engine's per-run scratch directory.
    pub temp_root: String,
    /// Run logs and `audio-batch.log`.
    pub logs_folder: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: "processed_output".to_string(),
            temp_root: ".temp".to_string(),
            logs_folder: ".logs".to_string(),
        }
    }
}

/// `[logging]`, turned into a `LogConfig` per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub compact: bool,
    /// Engine output lines dumped after a failed step.
    pub error_tail: u32,
    /// Percent between logged progress lines in compact mode.
    pub progress_step: u32,
    pub show_commands: bool,
    pub show_commands_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: 20,
            progress_step: 20,
            show_commands: false,
            show_commands_json: false,
        }
    }
}

impl LoggingSettings {
    pub fn to_log_config(&self, level: LogLevel) -> LogConfig {
        LogConfig {
            level,
            compact: self.compact,
            progress_step: self.progress_step.max(1),
            error_tail: self.error_tail as usize,
            show_timestamps: true,
            show_commands_pretty: self.show_commands,
            show_commands_json: self.show_commands_json,
        }
    }
}

/// `[processing]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// ffmpeg binary name (looked up on `PATH`) or full path.
    pub ffmpeg_path: String,
    /// Used for inputs without an extension.
    pub default_extension: String,
    pub output_prefix: String,
    pub failure_policy: FailurePolicy,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            default_extension: DEFAULT_EXTENSION.to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl ProcessingSettings {
    pub fn command_builder(&self) -> CommandBuilder {
        CommandBuilder::new(&self.default_extension, &self.output_prefix)
    }
}

/// `[ui]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub theme: Theme,
}

/// A top-level table, for `ConfigManager::update_section`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Logging,
    Processing,
    Ui,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Processing,
        ConfigSection::Ui,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Processing => "processing",
            ConfigSection::Ui => "ui",
        }
    }

    /// Comment written above the section.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Output and working directories",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Processing => "Engine and job settings",
            ConfigSection::Ui => "Display preferences",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_serialize_every_table() {
        let text = toml::to_string_pretty(&Settings::default()).unwrap();
        for section in ConfigSection::ALL {
            assert!(text.contains(&format!("[{}]", section.table_name())));
        }
        assert!(text.contains("failure_policy = \"continue\""));
        assert!(text.contains("theme = \"system\""));
    }

    #[test]
    fn changed_values_survive_serialization() {
        let mut settings = Settings::default();
        settings.ui.theme = Theme::Dark;
        settings.processing.failure_policy = FailurePolicy::Abort;
        settings.processing.output_prefix = "clean_".to_string();

        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed.ui.theme, Theme::Dark);
        assert_eq!(parsed.processing.failure_policy, FailurePolicy::Abort);
        assert_eq!(parsed.processing.output_prefix, "clean_");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: Settings =
            toml::from_str("[logging]\ncompact = false\n\n[processing]\nffmpeg_path = \"/usr/bin/ffmpeg\"")
                .unwrap();

        assert!(!parsed.logging.compact);
        assert_eq!(parsed.logging.error_tail, 20);
        assert_eq!(parsed.processing.ffmpeg_path, "/usr/bin/ffmpeg");
        assert_eq!(parsed.processing.default_extension, DEFAULT_EXTENSION);
        assert_eq!(parsed.paths.logs_folder, ".logs");
        assert_eq!(parsed.ui.theme, Theme::System);
    }

    #[test]
    fn log_config_from_settings() {
        let logging = LoggingSettings {
            show_commands: true,
            progress_step: 0,
            ..LoggingSettings::default()
        };

        let config = logging.to_log_config(LogLevel::Debug);
        assert!(config.show_commands_pretty);
        assert_eq!(config.progress_step, 1);
        assert_eq!(config.level, LogLevel::Debug);
    }
}
