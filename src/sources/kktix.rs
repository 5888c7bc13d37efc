use crate::domain::Platform;
use crate::fetcher::FetchStrategy;
use crate::sources::config::strings;
use crate::sources::{ListingPage, SelectorSet, SourceConfig};

/// KKTIX sits behind a challenge network, hence the full strategy chain.
pub fn source() -> SourceConfig {
    SourceConfig {
        platform: Platform::Kktix,
        enabled: true,
        base_url: "https://kktix.com/".to_string(),
        pages: vec![ListingPage::new("https://kktix.com/events")],
        selectors: SelectorSet {
            items: strings(&["ul.event-list li", "div.event-list li", "li.event"]),
            title: strings(&[".event-title", "h2"]),
            link: strings(&["a.event-link", r#"a[href*="/events/"]"#]),
            image: strings(&["img.event-image", "img"]),
            date: strings(&[".event-date", "span.date", "time"]),
        },
        link_filter: None,
        strategies: vec![
            FetchStrategy::Http,
            FetchStrategy::Stealth,
            FetchStrategy::Browser,
        ],
    }
}
