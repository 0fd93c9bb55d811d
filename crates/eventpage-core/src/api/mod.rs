mod client;
mod types;

pub use client::{EventClient, DEFAULT_TIMEOUT_MS};
pub use types::{EntryPayload, EventResponse, Reward};
