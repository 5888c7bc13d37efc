use crate::domain::Platform;
use crate::fetcher::FetchStrategy;
use crate::sources::config::strings;
use crate::sources::{ListingPage, SelectorSet, SourceConfig};

pub fn source() -> SourceConfig {
    SourceConfig {
        platform: Platform::Ibon,
        enabled: true,
        base_url: "https://ticket.ibon.com.tw/".to_string(),
        pages: vec![ListingPage::new("https://ticket.ibon.com.tw/Index/entertainment")],
        selectors: SelectorSet {
            items: strings(&["div.ticket-item", "li.ticket-item", "div.item"]),
            title: strings(&["div.ticket-info div.ticket-title", ".ticket-title", "div.title"]),
            link: strings(&[
                r#"a[href*="/activity/detail"]"#,
                r#"a[href*="ActivityInfo"]"#,
            ]),
            image: strings(&["div.ticket-img img", "img"]),
            date: strings(&["div.ticket-info div.ticket-date", ".ticket-date", ".date"]),
        },
        link_filter: None,
        strategies: vec![FetchStrategy::Http, FetchStrategy::Browser],
    }
}
