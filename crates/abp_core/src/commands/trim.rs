//! Trim range arithmetic.
//!
//! Converts a user-entered `TrimSpec` into the concrete bounds passed to the
//! engine:
//!
//! - **StartAndDuration**: `start` as given; `duration` only when present,
//!   otherwise the cut runs to the end of the source.
//! - **DurationAndEnd**: `start = max(0, end - duration)`, with a missing
//!   `end` treated as `0`. A present `end` is passed as an explicit upper
//!   bound. Duration without end means the first `duration` seconds of the
//!   source (the clamp-to-zero reading); end without duration means `0..end`.

use crate::models::{format_seconds, TrimSpec};

/// Concrete trim bounds, in seconds.
///
/// At most one of `duration` and `end` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimBounds {
    /// Where the cut starts.
    pub start: f64,
    /// Length of the cut (`-t`).
    pub duration: Option<f64>,
    /// Absolute position where the cut stops (`-to`).
    pub end: Option<f64>,
}

impl TrimBounds {
    /// Resolve a trim spec into bounds.
    pub fn from_spec(spec: &TrimSpec) -> Self {
        match *spec {
            TrimSpec::StartAndDuration { start, duration } => Self {
                start,
                duration,
                end: None,
            },
            TrimSpec::DurationAndEnd { duration, end } => match (duration, end) {
                (Some(d), Some(e)) => Self {
                    start: (e - d).max(0.0),
                    duration: None,
                    end: Some(e),
                },
                // No end to count back from: clamp to the head of the file
                (Some(d), None) => Self {
                    start: 0.0,
                    duration: Some(d),
                    end: None,
                },
                (None, Some(e)) => Self {
                    start: 0.0,
                    duration: None,
                    end: Some(e),
                },
                (None, None) => Self {
                    start: 0.0,
                    duration: None,
                    end: None,
                },
            },
        }
    }

    /// Whether the cut is open-ended (runs to the end of the source).
    pub fn is_open_ended(&self) -> bool {
        self.duration.is_none() && self.end.is_none()
    }

    /// Build the engine arguments for this cut.
    ///
    /// Streams are copied, not re-encoded.
    pub fn to_args(&self, input: &str, output: &str) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            input.to_string(),
            "-ss".to_string(),
            format_seconds(self.start),
        ];

        if let Some(d) = self.duration {
            args.push("-t".to_string());
            args.push(format_seconds(d));
        }
        if let Some(e) = self.end {
            args.push("-to".to_string());
            args.push(format_seconds(e));
        }

        args.push("-c".to_string());
        args.push("copy".to_string());
        args.push(output.to_string());
        args
    }
}
