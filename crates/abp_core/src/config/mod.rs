//! Persistent settings for the batch processor.
//!
//! `settings.toml` has four tables (`[paths]`, `[logging]`, `[processing]`,
//! `[ui]`). The whole file can be regenerated with `save`, or a single table
//! rewritten with `update_section`; both go through a temp file and rename.
//!
//! # Example
//!
//! ```no_run
//! use abp_core::config::{ConfigManager, ConfigSection};
//! use abp_core::models::Theme;
//!
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//! println!("ffmpeg: {}", config.settings().processing.ffmpeg_path);
//!
//! config.settings_mut().ui.theme = Theme::Dark;
//! config.update_section(ConfigSection::Ui).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, LoggingSettings, PathSettings, ProcessingSettings, Settings, UiSettings,
};
