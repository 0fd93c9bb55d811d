//! Countdown engine.
//!
//! A pure function of (end instant, current instant). Reading the clock is
//! an input: [`compute_breakdown`] takes `now` explicitly and
//! [`compute_breakdown_now`] is the convenience wrapper for callers that
//! want wall-clock time.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CountdownError;

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_MINUTE: u64 = 60;

/// Remaining time until an event ends, split into display units.
///
/// `remaining_ms == 0` exactly when `ended` is true. The unit fields only
/// cover whole seconds; a sub-second remainder shows as all zeros with
/// `ended == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBreakdown {
    pub remaining_ms: u64,
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub ended: bool,
}

impl TimeBreakdown {
    /// Whole seconds left, i.e. `floor(remaining_ms / 1000)`.
    pub fn total_seconds(&self) -> u64 {
        self.days * SECS_PER_DAY
            + u64::from(self.hours) * SECS_PER_HOUR
            + u64::from(self.minutes) * SECS_PER_MINUTE
            + u64::from(self.seconds)
    }

    /// Zero-padded display fields.
    pub fn display(&self) -> CountdownDisplay {
        CountdownDisplay {
            days: pad2(self.days),
            hours: pad2(u64::from(self.hours)),
            minutes: pad2(u64::from(self.minutes)),
            seconds: pad2(u64::from(self.seconds)),
        }
    }
}

/// Text the rendering layer puts in the countdown boxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownDisplay {
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl std::fmt::Display for CountdownDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}d {}:{}:{}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Compute the breakdown of `end - now`, clamped at zero.
pub fn compute_breakdown(end: DateTime<Utc>, now: DateTime<Utc>) -> TimeBreakdown {
    let diff_ms = end.signed_duration_since(now).num_milliseconds().max(0) as u64;
    breakdown_from_millis(diff_ms)
}

/// [`compute_breakdown`] against the current wall clock.
pub fn compute_breakdown_now(end: DateTime<Utc>) -> TimeBreakdown {
    compute_breakdown(end, Utc::now())
}

/// Decompose a non-negative millisecond count.
pub fn breakdown_from_millis(remaining_ms: u64) -> TimeBreakdown {
    let total = remaining_ms / 1000;
    TimeBreakdown {
        remaining_ms,
        days: total / SECS_PER_DAY,
        hours: ((total % SECS_PER_DAY) / SECS_PER_HOUR) as u32,
        minutes: ((total % SECS_PER_HOUR) / SECS_PER_MINUTE) as u32,
        seconds: (total % SECS_PER_MINUTE) as u32,
        ended: remaining_ms == 0,
    }
}

/// Render `n` as at least two decimal digits, zero-padded on the left.
///
/// Values of 100 or more are printed in full, never truncated.
pub fn pad2(n: u64) -> String {
    format!("{n:02}")
}

/// Parse an ISO-8601 end date from the backend.
///
/// Accepts RFC 3339 timestamps, minute-precision timestamps with an offset
/// or `Z`, offset-less date-times (taken as UTC), and bare dates (UTC
/// midnight).
pub fn parse_end_time(input: &str) -> Result<DateTime<Utc>, CountdownError> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Minute precision with an offset, e.g. `2025-01-02T09:00+09:00`.
    for fmt in ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    if let Some(zulu) = trimmed.strip_suffix(['Z', 'z']) {
        if let Ok(naive) = NaiveDateTime::parse_from_str(zulu, "%Y-%m-%dT%H:%M") {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M") {
        return Ok(naive.and_utc());
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Ok(date.and_time(NaiveTime::default()).and_utc()),
        Err(e) => Err(CountdownError::InvalidEndTime {
            input: input.to_string(),
            message: e.to_string(),
        }),
    }
}
