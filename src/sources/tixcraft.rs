use crate::domain::Platform;
use crate::fetcher::FetchStrategy;
use crate::sources::config::strings;
use crate::sources::{ListingPage, SelectorSet, SourceConfig};

pub fn source() -> SourceConfig {
    SourceConfig {
        platform: Platform::Tixcraft,
        enabled: true,
        base_url: "https://tixcraft.com/".to_string(),
        pages: vec![ListingPage::new("https://tixcraft.com/activity")],
        selectors: SelectorSet {
            items: strings(&["div.activity-block", "div.thumbnails", "div.col-md-3"]),
            title: strings(&[".activity-name", ".multi_ellipsis", "h3"]),
            link: strings(&[
                r#"a[href*="/activity/detail"]"#,
                r#"a[href*="/activity/game"]"#,
            ]),
            image: strings(&[".activity-thumbnail img", "img"]),
            date: strings(&[".activity-date", ".date"]),
        },
        link_filter: None,
        strategies: vec![
            FetchStrategy::Http,
            FetchStrategy::Stealth,
            FetchStrategy::Browser,
        ],
    }
}
