// Wire and storage models

mod computer;
mod status;

pub use computer::{ComputerRecord, PresenceStatus, format_timestamp, parse_timestamp};
pub use status::{Device, Stats, StatusResponse};
