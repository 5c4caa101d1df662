//! Trim range specification and time-field parsing.

use serde::{Deserialize, Serialize};

use super::error::{ModelError, ModelResult};

/// A trim range as entered by the user.
///
/// All present values are non-negative, finite seconds. The constructors
/// enforce this; the variants are public for pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrimSpec {
    /// Cut from `start`, for `duration` seconds or to the end of the source.
    StartAndDuration { start: f64, duration: Option<f64> },
    /// Cut the `duration` seconds that end at `end`.
    DurationAndEnd {
        duration: Option<f64>,
        end: Option<f64>,
    },
}

impl TrimSpec {
    /// Build a start/duration spec, validating both values.
    pub fn start_and_duration(start: f64, duration: Option<f64>) -> ModelResult<Self> {
        check_seconds("start", start)?;
        if let Some(d) = duration {
            check_seconds("duration", d)?;
        }
        Ok(Self::StartAndDuration { start, duration })
    }

    /// Build a duration/end spec, validating both values.
    pub fn duration_and_end(duration: Option<f64>, end: Option<f64>) -> ModelResult<Self> {
        if let Some(d) = duration {
            check_seconds("duration", d)?;
        }
        if let Some(e) = end {
            check_seconds("end", e)?;
        }
        Ok(Self::DurationAndEnd { duration, end })
    }
}

impl Default for TrimSpec {
    fn default() -> Self {
        Self::StartAndDuration {
            start: 0.0,
            duration: None,
        }
    }
}

fn check_seconds(field: &str, value: f64) -> ModelResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::invalid_seconds(field, value))
    }
}

/// Parse a time field.
///
/// Empty input means the field is absent. Accepts plain seconds (`"5"`,
/// `"2.5"`) and clock forms (`"1:30"`, `"01:02:03.5"`).
pub fn parse_seconds(field: &str, input: &str) -> ModelResult<Option<f64>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(ModelError::parse_seconds(field, input, "too many ':' separators"));
    }

    let mut total = 0.0;
    for (i, part) in parts.iter().enumerate() {
        let value: f64 = part
            .parse()
            .map_err(|_| ModelError::parse_seconds(field, input, "not a number"))?;
        if value < 0.0 || part.trim_start().starts_with('-') {
            return Err(ModelError::parse_seconds(field, input, "negative value"));
        }
        // Only the last component may carry a fraction or exceed 59
        let is_last = i == parts.len() - 1;
        if !is_last && value.fract() != 0.0 {
            return Err(ModelError::parse_seconds(field, input, "invalid clock component"));
        }
        if i > 0 && value >= 60.0 {
            return Err(ModelError::parse_seconds(field, input, "clock component out of range"));
        }
        total = total * 60.0 + value;
    }

    check_seconds(field, total)?;
    Ok(Some(total))
}

/// Format seconds the way ffmpeg accepts them, without trailing zeros.
pub fn format_seconds(value: f64) -> String {
    // Adding 0.0 turns -0.0 into 0.0
    let rounded = (value * 1000.0).round() / 1000.0 + 0.0;
    format!("{}", rounded)
}
