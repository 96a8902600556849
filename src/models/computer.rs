// Persisted presence record (SQLite `computers` table)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fixed-width so that lexical order in SQLite matches chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

impl PresenceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PresenceStatus::Online => "online",
            PresenceStatus::Offline => "offline",
        }
    }

    /// Parse the stored column value; anything unrecognised reads as offline.
    pub fn from_db(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "online" => PresenceStatus::Online,
            _ => PresenceStatus::Offline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputerRecord {
    pub name: String,
    pub last_seen: NaiveDateTime,
    pub status: PresenceStatus,
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Accepts the stored format as well as shorter ISO-8601 variants (no fraction).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()
}
