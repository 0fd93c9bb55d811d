mod engine;
mod ticker;

pub use engine::{
    breakdown_from_millis, compute_breakdown, compute_breakdown_now, pad2, parse_end_time,
    CountdownDisplay, TimeBreakdown,
};
pub use ticker::{CountdownTicker, TickerState, DEFAULT_TICK_INTERVAL_MS};
