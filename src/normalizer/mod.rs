//! Normalization & dedup: raw adapter output in, canonical records out.

pub mod classify;
pub mod details;

use std::collections::HashSet;

use html_escape::decode_html_entities;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::{EventRecord, RawEvent, DETAILS_SENTINEL, OTHER_EVENT_TYPE};

pub const MAX_TITLE: usize = 255;
pub const MAX_URL: usize = 255;
pub const MAX_IMAGE: usize = 255;
pub const MAX_START_TIME: usize = 100;
pub const MAX_PLATFORM: usize = 50;
pub const MAX_EVENT_TYPE: usize = 50;
pub const MAX_LOCATION: usize = 100;
pub const MAX_EVENT_DATE: usize = 100;

/// Titles must be longer than this many characters.
pub const MIN_TITLE_CHARS: usize = 3;

const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Classify `event_type` from the title (default: true)
    pub classify: bool,

    /// Extract `location` / `event_date` from the title (default: true)
    pub extract_details: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            classify: true,
            extract_details: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Turn raw events into records. Pure: the same input always yields the
    /// same output. Order is preserved and the first record seen for a URL
    /// wins.
    pub fn normalize(&self, raw: &[RawEvent]) -> Vec<EventRecord> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(raw.len());
        let mut rejected = 0usize;
        let mut duplicates = 0usize;

        for event in raw {
            let Some(record) = self.normalize_one(event) else {
                rejected += 1;
                continue;
            };
            if !seen.insert(record.url.clone()) {
                duplicates += 1;
                continue;
            }
            records.push(record);
        }

        debug!(
            input = raw.len(),
            output = records.len(),
            rejected,
            duplicates,
            "Normalized events"
        );
        records
    }

    fn normalize_one(&self, raw: &RawEvent) -> Option<EventRecord> {
        let title = clean_title(&raw.title);
        if !is_event_title(&title) {
            return None;
        }

        let url = canonical_url(&raw.url)?;
        if url.chars().count() > MAX_URL {
            return None;
        }

        let mut record = EventRecord::new(
            truncate(&title, MAX_TITLE),
            url,
            truncate(raw.platform.trim(), MAX_PLATFORM),
        );

        if let Some(start) = raw.start_time.as_deref().map(clean_text) {
            if !start.is_empty() {
                record.start_time = truncate(&start, MAX_START_TIME);
            }
        }

        let image = raw.image.trim();
        if !image.is_empty() && image.chars().count() <= MAX_IMAGE {
            record.image = image.to_string();
        }

        record.event_type = if self.config.classify {
            truncate(classify::classify(&title), MAX_EVENT_TYPE)
        } else {
            OTHER_EVENT_TYPE.to_string()
        };

        if self.config.extract_details {
            record.location = details::extract_location(&title)
                .map(|v| truncate(&v, MAX_LOCATION))
                .unwrap_or_else(|| DETAILS_SENTINEL.to_string());
            record.event_date = details::extract_date(&title)
                .map(|v| truncate(&v, MAX_EVENT_DATE))
                .unwrap_or_else(|| DETAILS_SENTINEL.to_string());
        }

        Some(record)
    }
}

fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean_title(input: &str) -> String {
    clean_text(&decode_html_entities(input))
}

/// Whether a cleaned title clears the acceptance bar.
pub fn is_event_title(title: &str) -> bool {
    title.chars().count() > MIN_TITLE_CHARS
}

/// Absolute http(s) URL without fragment, or `None`.
pub fn canonical_url(input: &str) -> Option<String> {
    let mut url = Url::parse(input.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    url.set_fragment(None);
    Some(url.into())
}

/// Cut to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        return input.to_string();
    }
    let mut out: String = input.chars().take(max.saturating_sub(1)).collect();
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, url: &str, platform: &str) -> RawEvent {
        RawEvent::new(title, url, platform)
    }

    #[test]
    fn test_first_seen_wins() {
        let input = vec![
            raw("X Festival", "https://a.example/1", "A"),
            raw("Y Festival", "https://a.example/1", "B"),
        ];
        let out = Normalizer::default().normalize(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "X Festival");
        assert_eq!(out[0].platform, "A");
    }

    #[test]
    fn test_acceptance_bar() {
        let input = vec![
            raw("Go", "https://a.example/go", "A"),
            raw("Jazz", "https://a.example/jazz", "A"),
            raw("   ", "https://a.example/blank", "A"),
            raw("Abc", "https://a.example/abc", "A"),
        ];
        let out = Normalizer::default().normalize(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Jazz");
    }

    #[test]
    fn test_rejects_bad_urls() {
        let input = vec![
            raw("Relative link", "/event/1", "A"),
            raw("Mail link", "mailto:x@y.z", "A"),
            raw("Empty link", "", "A"),
            raw("Good link", "https://a.example/2#tickets", "A"),
        ];
        let out = Normalizer::default().normalize(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://a.example/2");
    }

    #[test]
    fn test_fragment_variants_collapse() {
        let input = vec![
            raw("First copy", "https://a.example/3#a", "A"),
            raw("Second copy", "https://a.example/3#b", "B"),
        ];
        let out = Normalizer::default().normalize(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "First copy");
    }

    #[test]
    fn test_idempotent() {
        let input = vec![
            raw("Art Expo", "https://b.example/2", "B"),
            raw("Jazz Night", "https://a.example/1", "A"),
            raw("Art Expo again", "https://b.example/2", "A"),
            raw("Jazz Night Dup", "https://a.example/1", "B"),
        ];
        let normalizer = Normalizer::default();
        let first = normalizer.normalize(&input);
        let second = normalizer.normalize(&input);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].url, "https://b.example/2");
    }

    #[test]
    fn test_title_cleaning_and_truncation() {
        let long = "演".repeat(300);
        let input = vec![
            raw("  Rock &amp;   Roll\n Night ", "https://a.example/r", "A"),
            raw(&long, "https://a.example/long", "A"),
        ];
        let out = Normalizer::default().normalize(&input);
        assert_eq!(out[0].title, "Rock & Roll Night");
        assert_eq!(out[1].title.chars().count(), MAX_TITLE);
        assert!(out[1].title.ends_with('…'));
    }

    #[test]
    fn test_sentinels_and_details() {
        let mut with_time = raw("跨年晚會 @ 台北小巨蛋", "https://a.example/nye", "寬宏");
        with_time.start_time = Some(" 2026/12/31\n 20:00 ".into());
        with_time.image = "https://img.example/nye.jpg".into();

        let input = vec![with_time, raw("年末特賣會", "https://a.example/sale", "UDN")];
        let out = Normalizer::default().normalize(&input);

        assert_eq!(out[0].start_time, "2026/12/31 20:00");
        assert_eq!(out[0].location, "台北小巨蛋");
        assert_eq!(out[0].event_date, DETAILS_SENTINEL);
        assert_eq!(out[0].image, "https://img.example/nye.jpg");

        assert_eq!(out[1].start_time, DETAILS_SENTINEL);
        assert_eq!(out[1].location, DETAILS_SENTINEL);
        assert_eq!(out[1].event_type, OTHER_EVENT_TYPE);
        assert_eq!(out[1].image, "");
    }

    #[test]
    fn test_oversized_url_and_image() {
        let long_url = format!("https://a.example/{}", "x".repeat(300));
        let mut event = raw("Long image event", "https://a.example/img", "A");
        event.image = long_url.clone();

        let input = vec![raw("Long url event", &long_url, "A"), event];
        let out = Normalizer::default().normalize(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Long image event");
        assert_eq!(out[0].image, "");
    }

    #[test]
    fn test_classification_toggles() {
        let input = vec![raw("Jazz Night 2026/05/01", "https://a.example/j", "A")];

        let on = Normalizer::default().normalize(&input);
        assert_eq!(on[0].event_type, "concert");
        assert_eq!(on[0].event_date, "2026/05/01");

        let off = Normalizer::new(NormalizeConfig {
            classify: false,
            extract_details: false,
        })
        .normalize(&input);
        assert_eq!(off[0].event_type, OTHER_EVENT_TYPE);
        assert_eq!(off[0].event_date, DETAILS_SENTINEL);
    }

    #[test]
    fn test_is_event_title_counts_chars() {
        assert!(!is_event_title("購票"));
        assert!(!is_event_title("熱賣中"));
        assert!(is_event_title("更多資訊"));
        assert!(is_event_title("Jazz"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("abcd", 3), "ab…");
    }
}
