//! OPENTIX 兩廳院文化生活. The home page is client-rendered; the event
//! anchors themselves are the entries.

use crate::domain::Platform;
use crate::fetcher::FetchStrategy;
use crate::sources::config::strings;
use crate::sources::{ListingPage, SelectorSet, SourceConfig};

pub fn source() -> SourceConfig {
    SourceConfig {
        platform: Platform::Opentix,
        enabled: true,
        base_url: "https://www.opentix.life/".to_string(),
        pages: vec![ListingPage::new("https://www.opentix.life")],
        selectors: SelectorSet {
            items: strings(&[r#"a[href^="/event/"]"#, r#"a[href*="/event/"]"#]),
            title: strings(&["h5", "h6", ".title"]),
            link: Vec::new(),
            image: strings(&["img"]),
            date: strings(&[".date", "time"]),
        },
        link_filter: Some("opentix.life/event/".to_string()),
        strategies: vec![FetchStrategy::Http, FetchStrategy::Browser],
    }
}
