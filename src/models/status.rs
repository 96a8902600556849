// GET /api/status payload (snake_case on the wire)

use serde::{Deserialize, Serialize};

use super::ComputerRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: u64,
    pub online: u64,
    pub offline: u64,
}

impl Stats {
    /// Counts devices; `offline` is always `total - online`.
    pub fn from_devices(devices: &[Device]) -> Self {
        let total = devices.len() as u64;
        let online = devices.iter().filter(|d| d.is_online).count() as u64;
        Self {
            total,
            online,
            offline: total - online,
        }
    }
}

/// One monitored machine as seen by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub is_online: bool,
    /// Server-local date-time (ISO-8601, offset optional).
    pub last_seen: String,
    /// Last persisted presence; informational, `is_online` is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Device {
    pub fn from_record(record: &ComputerRecord, is_online: bool) -> Self {
        Self {
            name: record.name.clone(),
            is_online,
            last_seen: super::format_timestamp(&record.last_seen),
            status: Some(record.status.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub stats: Stats,
    pub computers: Vec<Device>,
}

impl StatusResponse {
    pub fn from_devices(computers: Vec<Device>) -> Self {
        Self {
            stats: Stats::from_devices(&computers),
            computers,
        }
    }
}
