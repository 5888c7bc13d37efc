use serde::{Deserialize, Serialize};

/// Placeholder for schedule, venue and date fields the listing page does not expose.
pub const DETAILS_SENTINEL: &str = "詳見內文";

/// `event_type` value when no keyword group matches.
pub const OTHER_EVENT_TYPE: &str = "other";

/// An event as an adapter scraped it, before normalization.
///
/// Only `title`, `url` and `platform` are guaranteed; everything else is
/// best-effort and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub title: String,
    pub url: String,
    pub platform: String,
    pub image: String,
    pub start_time: Option<String>,
    pub category: Option<String>,
}

impl RawEvent {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            platform: platform.into(),
            ..Default::default()
        }
    }
}

/// The canonical event row. Every field is always populated, using
/// [`DETAILS_SENTINEL`] / [`OTHER_EVENT_TYPE`] where the source had nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    /// Absolute, canonical URL. Unique across the store.
    pub url: String,
    pub start_time: String,
    pub platform: String,
    pub image: String,
    pub event_type: String,
    pub location: String,
    pub event_date: String,
}

impl EventRecord {
    /// Build a record with sentinel values for every optional field.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            start_time: DETAILS_SENTINEL.to_string(),
            platform: platform.into(),
            image: String::new(),
            event_type: OTHER_EVENT_TYPE.to_string(),
            location: DETAILS_SENTINEL.to_string(),
            event_date: DETAILS_SENTINEL.to_string(),
        }
    }
}
