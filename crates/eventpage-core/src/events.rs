use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::countdown::TimeBreakdown;

/// Every state change in the core produces an Event.
/// The rendering layer consumes them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        end: DateTime<Utc>,
        breakdown: TimeBreakdown,
        at: DateTime<Utc>,
    },
    CountdownTick {
        breakdown: TimeBreakdown,
        at: DateTime<Utc>,
    },
    /// Emitted once, on the first tick at or past the end instant.
    CountdownEnded {
        end: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    CountdownStopped {
        at: DateTime<Utc>,
    },
    ObserverActivated {
        threshold: f64,
        root_margin: String,
        at: DateTime<Utc>,
    },
    /// Watcher discarded; `abandoned` targets were still pending.
    ObserverDeactivated {
        abandoned: usize,
        at: DateTime<Utc>,
    },
    TargetRevealed {
        target: String,
        at: DateTime<Utc>,
    },
    /// No intersection facility; eligible targets were revealed immediately.
    RevealFallback {
        reason: String,
        revealed: usize,
        at: DateTime<Utc>,
    },
}
