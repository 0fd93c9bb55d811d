//! Payloads exchanged with the event backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::countdown::parse_end_time;
use crate::error::CountdownError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: u64,
    pub name: String,
    /// Image URL.
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: u64,
    pub title: String,
    /// ISO-8601 end date as sent by the backend.
    pub end_date: String,
    pub description: String,
    #[serde(default)]
    pub rewards: Vec<Reward>,
}

impl EventResponse {
    /// Parsed `end_date`. Callers must handle the error before starting a
    /// countdown.
    pub fn end_time(&self) -> Result<DateTime<Utc>, CountdownError> {
        parse_end_time(&self.end_date)
    }
}

/// A user entry submitted from the event page form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    pub event_id: u64,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub agree_privacy: bool,
}
