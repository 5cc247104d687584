use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Epoch values with more digits than this are not epoch-minutes.
pub const MAX_MINUTE_DIGITS: usize = 9;

/// Epoch values with at least this many digits are milliseconds.
const MILLIS_DIGITS: usize = 13;

/// Convert a timestamp to whole minutes since the Unix epoch, the unit the
/// read API takes for `from_date`.
pub fn epoch_minutes(dt: DateTime<Utc>) -> i64 {
    dt.timestamp().div_euclid(60)
}

/// Coerce a caller-supplied `from_date` to epoch minutes.
///
/// Up to nine digits is already minutes and is returned unchanged. Ten to
/// twelve digits is read as epoch seconds, thirteen or more as epoch
/// milliseconds. Non-numeric input is returned unchanged.
pub fn coerce_epoch_minutes(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() <= MAX_MINUTE_DIGITS {
        return raw.to_string();
    }
    let Ok(value) = raw.parse::<i64>() else {
        return raw.to_string();
    };
    let divisor = if raw.trim_start_matches('-').len() >= MILLIS_DIGITS {
        60_000
    } else {
        60
    };
    value.div_euclid(divisor).to_string()
}

/// A pseudo-unique reference id taken from the clock.
pub fn reference_id_now() -> String {
    Utc::now().timestamp().to_string()
}

/// Length of a video as reported by the API (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VideoLength(Duration);

impl VideoLength {
    pub fn from_millis(ms: i64) -> Self {
        VideoLength(Duration::milliseconds(ms))
    }

    /// Get the length in whole seconds
    pub fn seconds(&self) -> i64 {
        self.0.num_seconds()
    }

    /// Get the length in milliseconds
    pub fn millis(&self) -> i64 {
        self.0.num_milliseconds()
    }
}

/// Formats as `h:mm:ss` when at least an hour long, `m:ss` otherwise.
impl fmt::Display for VideoLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.seconds().max(0);
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
        if hours > 0 {
            write!(f, "{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            write!(f, "{}:{:02}", minutes, seconds)
        }
    }
}
