use crate::domain::Platform;
use crate::fetcher::FetchStrategy;
use crate::sources::config::strings;
use crate::sources::{ListingPage, SelectorSet, SourceConfig};

pub fn source() -> SourceConfig {
    SourceConfig {
        platform: Platform::Eventgo,
        enabled: true,
        base_url: "https://eventgo.bnextmedia.com.tw/".to_string(),
        pages: vec![ListingPage::new("https://eventgo.bnextmedia.com.tw/event/list")],
        selectors: SelectorSet {
            items: strings(&["div.event-card, li.event-item", "div.card", "article"]),
            title: strings(&["h3.event-title, .event-title", "h3", ".title"]),
            link: strings(&[r#"a[href*="event/detail"]"#]),
            image: strings(&["img.event-img", "img"]),
            date: strings(&[".event-date", ".date", "time"]),
        },
        link_filter: Some("event/detail".to_string()),
        strategies: vec![FetchStrategy::Http, FetchStrategy::Browser],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::politeness::DelayRange;
    use crate::sources::ListingAdapter;

    const FIXTURE: &str = r#"
    <section>
      <div class="card">
        <a href="/event/detail/20261"><img class="event-img" src="/upload/20261.webp"></a>
        <h3>AI 應用高峰論壇</h3>
        <time>2026-11-12</time>
      </div>
      <div class="card">
        <a href="/event/list?page=2">下一頁</a>
      </div>
    </section>"#;

    #[test]
    fn test_parses_cards_with_fallback_selectors() {
        let adapter = ListingAdapter::new(source(), DelayRange::none()).unwrap();
        let events = adapter.parse_page(FIXTURE, None);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "AI 應用高峰論壇");
        assert_eq!(
            events[0].url,
            "https://eventgo.bnextmedia.com.tw/event/detail/20261"
        );
        assert_eq!(
            events[0].image,
            "https://eventgo.bnextmedia.com.tw/upload/20261.webp"
        );
        assert_eq!(events[0].start_time.as_deref(), Some("2026-11-12"));
    }
}
