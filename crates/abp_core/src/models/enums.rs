//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};

/// What a processing run does to each target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    /// Wrap each file with optional intro/outro clips.
    Concat,
    /// Cut a time range out of each file.
    Trim,
    /// Trim first, then wrap the trimmed result with intro/outro.
    Both,
}

impl OperationMode {
    /// Whether this mode runs the trim step.
    pub fn trims(&self) -> bool {
        matches!(self, OperationMode::Trim | OperationMode::Both)
    }

    /// Whether this mode runs the concat step.
    pub fn concats(&self) -> bool {
        matches!(self, OperationMode::Concat | OperationMode::Both)
    }
}

impl std::fmt::Display for OperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationMode::Concat => write!(f, "concat"),
            OperationMode::Trim => write!(f, "trim"),
            OperationMode::Both => write!(f, "both"),
        }
    }
}

/// How the trim range is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimMode {
    /// Start offset plus an optional duration.
    #[default]
    StartDuration,
    /// Optional duration counted back from an optional end offset.
    DurationEnd,
}

impl std::fmt::Display for TrimMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrimMode::StartDuration => write!(f, "start + duration"),
            TrimMode::DurationEnd => write!(f, "duration + end"),
        }
    }
}

/// What to do with the remaining jobs when one job's engine call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and move on to the next file.
    #[default]
    Continue,
    /// Stop the run after the first failed file.
    Abort,
}

/// Display theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the operating system preference.
    #[default]
    System,
}

impl Theme {
    /// Next theme in the light → dark → system rotation.
    pub fn cycle(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }

    /// Get the display name for this theme.
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}
