// Stats and device-card rendering. Device names and timestamps go through
// askama's HTML escaping; stats are written as text content.

use askama::Template;
use chrono::{DateTime, Local, Locale, TimeZone, Utc};

use super::document::{Document, DocumentError};
use super::{DEVICE_LIST_ID, OFFLINE_DEVICES_ID, ONLINE_DEVICES_ID, TOTAL_DEVICES_ID};
use crate::models::{Device, Stats, StatusResponse, parse_timestamp};

pub const EMPTY_PLACEHOLDER: &str = "No devices found";

/// Shown when `last_seen` cannot be parsed as a date-time.
pub const INVALID_DATE: &str = "Invalid Date";

/// Locales accepted for `dashboard.locale`.
pub const SUPPORTED_LOCALES: &[&str] = &[
    "ru_RU", "uk_UA", "be_BY", "kk_KZ", "bg_BG", "pl_PL", "cs_CZ", "sk_SK", "sl_SI", "hr_HR",
    "sr_RS", "ro_RO", "hu_HU", "lt_LT", "lv_LV", "et_EE", "fi_FI", "sv_SE", "nb_NO", "da_DK",
    "de_DE", "de_AT", "de_CH", "nl_NL", "nl_BE", "fr_FR", "fr_BE", "fr_CA", "it_IT", "es_ES",
    "es_MX", "pt_PT", "pt_BR", "el_GR", "tr_TR", "en_US", "en_GB", "en_CA", "en_AU", "en_IE",
    "ja_JP", "ko_KR", "zh_CN", "zh_TW",
];

/// Used when the locale's date layout cannot be read back from a sample date.
const FALLBACK_DATE_FORMAT: &str = "%d.%m.%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("device list template: {0}")]
    Template(#[from] askama::Error),
}

struct DeviceCard<'a> {
    name: &'a str,
    status_class: &'static str,
    badge_class: &'static str,
    status_text: &'static str,
    last_seen: String,
}

#[derive(Template)]
#[template(path = "device_list.html")]
struct DeviceListTemplate<'a> {
    cards: Vec<DeviceCard<'a>>,
    placeholder: &'static str,
}

#[derive(Debug, Clone)]
pub struct Renderer {
    last_seen_format: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Locale::ru_RU)
    }
}

impl Renderer {
    pub fn new(locale: Locale) -> Self {
        Self {
            last_seen_format: format!("{}, {}", locale_date_format(locale), TIME_FORMAT),
        }
    }

    /// Renderer for one of [`SUPPORTED_LOCALES`], e.g. "ru_RU".
    pub fn for_locale(name: &str) -> anyhow::Result<Self> {
        anyhow::ensure!(
            SUPPORTED_LOCALES.contains(&name),
            "unsupported locale: {}",
            name
        );
        let locale = Locale::try_from(name)
            .map_err(|_| anyhow::anyhow!("unknown locale: {}", name))?;
        Ok(Self::new(locale))
    }

    /// Writes stats and the device list. All targets are checked and the list
    /// markup is built before the first write, so a failure leaves `doc` untouched.
    pub fn render_status<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        status: &StatusResponse,
    ) -> Result<(), RenderError> {
        let html = self.device_list_html(&status.computers)?;
        for id in [
            TOTAL_DEVICES_ID,
            ONLINE_DEVICES_ID,
            OFFLINE_DEVICES_ID,
            DEVICE_LIST_ID,
        ] {
            if !doc.contains(id) {
                return Err(DocumentError::MissingElement(id.to_string()).into());
            }
        }
        self.render_stats(doc, &status.stats)?;
        doc.set_inner_html(DEVICE_LIST_ID, &html)?;
        Ok(())
    }

    /// Counters are written verbatim; `online + offline == total` is not checked.
    pub fn render_stats<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        stats: &Stats,
    ) -> Result<(), DocumentError> {
        doc.set_text_content(TOTAL_DEVICES_ID, &stats.total.to_string())?;
        doc.set_text_content(ONLINE_DEVICES_ID, &stats.online.to_string())?;
        doc.set_text_content(OFFLINE_DEVICES_ID, &stats.offline.to_string())?;
        Ok(())
    }

    /// Replaces the whole device list.
    pub fn render_device_list<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        devices: &[Device],
    ) -> Result<(), RenderError> {
        let html = self.device_list_html(devices)?;
        doc.set_inner_html(DEVICE_LIST_ID, &html)?;
        Ok(())
    }

    pub fn device_list_html(&self, devices: &[Device]) -> Result<String, askama::Error> {
        let cards = devices
            .iter()
            .map(|d| {
                let (status_class, badge_class, status_text) = if d.is_online {
                    ("online", "status-badge-online", "ONLINE")
                } else {
                    ("offline", "status-badge-offline", "OFFLINE")
                };
                DeviceCard {
                    name: &d.name,
                    status_class,
                    badge_class,
                    status_text,
                    last_seen: self.format_last_seen(&d.last_seen),
                }
            })
            .collect();
        DeviceListTemplate {
            cards,
            placeholder: EMPTY_PLACEHOLDER,
        }
        .render()
    }

    /// Formats a server timestamp in the viewer's local time zone. Values with an
    /// offset are converted; values without one are taken as local already.
    pub fn format_last_seen(&self, raw: &str) -> String {
        match parse_last_seen(raw) {
            Some(ts) => ts.format(&self.last_seen_format).to_string(),
            None => INVALID_DATE.to_string(),
        }
    }
}

/// The locale's `%x` order and separators with fields pinned to `%d`, `%m`
/// and `%Y`. Read back from a sample date whose day, month and year differ.
fn locale_date_format(locale: Locale) -> String {
    let Some(sample) = Utc.with_ymd_and_hms(2033, 11, 22, 0, 0, 0).single() else {
        return FALLBACK_DATE_FORMAT.to_string();
    };
    let shown = sample
        .format_localized("%x", locale)
        .to_string()
        .replace('%', "%%");
    let year = if shown.contains("2033") { "2033" } else { "33" };
    let pattern = shown
        .replacen(year, "%Y", 1)
        .replacen("22", "%d", 1)
        .replacen("11", "%m", 1);
    let complete = ["%Y", "%m", "%d"].iter().all(|f| pattern.contains(f))
        && !pattern.chars().any(|c| c.is_numeric());
    if complete {
        pattern
    } else {
        FALLBACK_DATE_FORMAT.to_string()
    }
}

fn parse_last_seen(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local));
    }
    let naive = parse_timestamp(raw)?;
    Local.from_local_datetime(&naive).earliest()
}
