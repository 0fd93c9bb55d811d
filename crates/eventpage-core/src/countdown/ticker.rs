//! Host-driven countdown ticker.
//!
//! Like the engine it wraps, the ticker owns no thread or timer. The host
//! calls `tick()` on its own interval (see [`CountdownTicker::interval`]).
//!
//! ```text
//! Stopped -> Running -> (Stopped | Ended)
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::engine::{compute_breakdown, TimeBreakdown};
use crate::events::Event;

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickerState {
    Stopped,
    Running,
    /// Terminal: the end instant has been reached and reported.
    Ended,
}

#[derive(Debug, Clone)]
pub struct CountdownTicker {
    end: DateTime<Utc>,
    state: TickerState,
    interval: Duration,
    last: Option<TimeBreakdown>,
}

impl CountdownTicker {
    pub fn new(end: DateTime<Utc>) -> Self {
        Self::with_interval(end, Duration::from_millis(DEFAULT_TICK_INTERVAL_MS))
    }

    pub fn with_interval(end: DateTime<Utc>, interval: Duration) -> Self {
        Self {
            end,
            state: TickerState::Stopped,
            interval,
            last: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TickerState {
        self.state
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Breakdown produced by the most recent start or tick.
    pub fn last(&self) -> Option<&TimeBreakdown> {
        self.last.as_ref()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TickerState::Stopped => {
                let breakdown = compute_breakdown(self.end, now);
                self.state = TickerState::Running;
                self.last = Some(breakdown);
                Some(Event::CountdownStarted {
                    end: self.end,
                    breakdown,
                    at: now,
                })
            }
            TickerState::Running | TickerState::Ended => None,
        }
    }

    /// Call periodically. Returns `CountdownEnded` exactly once.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TickerState::Running {
            return None;
        }
        let breakdown = compute_breakdown(self.end, now);
        self.last = Some(breakdown);
        if breakdown.ended {
            self.state = TickerState::Ended;
            tracing::debug!(end = %self.end, "countdown ended");
            return Some(Event::CountdownEnded { end: self.end, at: now });
        }
        Some(Event::CountdownTick { breakdown, at: now })
    }

    /// Safe from any state.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TickerState::Running => {
                self.state = TickerState::Stopped;
                Some(Event::CountdownStopped { at: now })
            }
            TickerState::Stopped | TickerState::Ended => None,
        }
    }
}
