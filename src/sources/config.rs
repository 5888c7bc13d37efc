use serde::{Deserialize, Serialize};

use crate::domain::Platform;
use crate::fetcher::FetchStrategy;

/// Per-adapter sub-configuration. Plain data; no behaviour lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub platform: Platform,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL relative hrefs are resolved against
    pub base_url: String,

    /// Listing pages, fetched in order. Category-partitioned platforms have
    /// one page per category.
    pub pages: Vec<ListingPage>,

    #[serde(default)]
    pub selectors: SelectorSet,

    /// Resolved event URLs must contain this substring
    #[serde(default)]
    pub link_filter: Option<String>,

    /// Fetch strategy chain, tried in order on blocks
    #[serde(default = "default_strategies")]
    pub strategies: Vec<FetchStrategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub category: Option<String>,
    pub url: String,
}

impl ListingPage {
    pub fn new(url: &str) -> Self {
        Self {
            category: None,
            url: url.to_string(),
        }
    }

    pub fn category(category: &str, url: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            url: url.to_string(),
        }
    }
}

/// CSS selectors in priority order: the first one that matches wins, the
/// rest are fallbacks for when the page structure drifts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    /// Event entry containers
    pub items: Vec<String>,
    /// Title, relative to an entry
    pub title: Vec<String>,
    /// Detail link, relative to an entry. An entry that is itself an anchor
    /// is its own link.
    pub link: Vec<String>,
    /// Thumbnail, relative to an entry
    pub image: Vec<String>,
    /// Schedule text, relative to an entry
    pub date: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_strategies() -> Vec<FetchStrategy> {
    vec![FetchStrategy::Http]
}

pub(crate) fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
