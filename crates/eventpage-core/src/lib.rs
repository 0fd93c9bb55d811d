//! # eventpage Core Library
//!
//! Host-agnostic logic behind a single-page event promotion: a countdown to
//! the event's end date and one-time scroll-reveal of page sections. The
//! `eventpage` CLI is one host; a rendering layer would be another.
//!
//! ## Architecture
//!
//! - **Countdown**: a pure breakdown of `end - now` plus a caller-driven
//!   ticker. Neither owns a thread; the host decides the tick interval.
//! - **Reveal**: a per-session state machine over host-supplied elements.
//!   Each element goes `Pending -> Revealed` once and is then unobserved.
//! - **API**: the event backend client (`GET /event`, `POST /entries`).
//! - **Storage**: TOML configuration.
//!
//! ## Key Components
//!
//! - [`compute_breakdown`]: countdown engine
//! - [`CountdownTicker`]: periodic countdown driver
//! - [`RevealObserver`]: scroll-reveal state machine
//! - [`RevealHost`]: trait the rendering layer implements
//! - [`EventClient`]: backend client
//! - [`Config`]: application configuration

pub mod api;
pub mod countdown;
pub mod error;
pub mod events;
pub mod reveal;
pub mod storage;

pub use api::{EntryPayload, EventClient, EventResponse, Reward};
pub use countdown::{
    compute_breakdown, compute_breakdown_now, pad2, parse_end_time, CountdownTicker, TimeBreakdown,
};
pub use error::{ApiError, ConfigError, CoreError, CountdownError, RevealError};
pub use events::Event;
pub use reveal::{IntersectionEntry, RevealHost, RevealObserver, RevealOptions, RevealState};
pub use storage::Config;
