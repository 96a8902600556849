//! Polling dashboard: fetches `/api/status` on a fixed interval and re-renders
//! the device overview into a [`Document`].
//!
//! The four element ids below are the contract with the host page; the server's
//! `GET /` page and [`Page::dashboard`] both provide them.

pub mod document;
pub mod poller;
pub mod render;
pub mod source;

pub use document::{Document, DocumentError, FilePage, Page};
pub use poller::{CycleOutcome, POLL_INTERVAL, StatusPoller};
pub use render::{EMPTY_PLACEHOLDER, RenderError, Renderer, SUPPORTED_LOCALES};
pub use source::{HttpStatusSource, PollError, STATUS_PATH, StatusSource};

pub const TOTAL_DEVICES_ID: &str = "total-devices";
pub const ONLINE_DEVICES_ID: &str = "online-devices";
pub const OFFLINE_DEVICES_ID: &str = "offline-devices";
pub const DEVICE_LIST_ID: &str = "device-list";
