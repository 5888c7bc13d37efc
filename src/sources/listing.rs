use std::collections::HashSet;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};
use url::Url;

use crate::app::Result;
use crate::domain::RawEvent;
use crate::fetcher::{FetchFailure, Fetcher};
use crate::normalizer::is_event_title;
use crate::politeness::DelayRange;
use crate::sources::extract::{self, CompiledSelectors};
use crate::sources::{AdapterError, Extraction, SourceAdapter, SourceConfig};

/// Selector-driven adapter for a platform's listing pages.
pub struct ListingAdapter {
    config: SourceConfig,
    base: Url,
    selectors: CompiledSelectors,
    category_delay: DelayRange,
}

impl ListingAdapter {
    pub fn new(config: SourceConfig, category_delay: DelayRange) -> Result<Self> {
        let base = Url::parse(&config.base_url)?;
        let selectors = CompiledSelectors::compile(config.platform.label(), &config.selectors)?;
        Ok(Self {
            config,
            base,
            selectors,
            category_delay,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Pull raw events out of one listing document. Item selectors are
    /// tried in order until one of them yields events.
    pub(crate) fn parse_page(&self, body: &str, category: Option<&str>) -> Vec<RawEvent> {
        let platform = self.config.platform.label();
        let document = Html::parse_document(body);

        for (idx, selector) in self.selectors.items.iter().enumerate() {
            let events = self.parse_entries(document.select(selector), category);
            if events.is_empty() {
                continue;
            }
            if idx > 0 {
                debug!(
                    platform,
                    selector = %self.config.selectors.items[idx],
                    "Earlier item selectors yielded nothing, using fallback"
                );
            }
            return events;
        }

        warn!(
            platform,
            category = category.unwrap_or("-"),
            "No item selector yielded events, page structure may have changed"
        );
        Vec::new()
    }

    fn parse_entries<'a>(
        &self,
        entries: impl Iterator<Item = ElementRef<'a>>,
        category: Option<&str>,
    ) -> Vec<RawEvent> {
        let mut seen = HashSet::new();
        let mut events = Vec::new();

        for entry in entries {
            let Some(link) = extract::entry_link(entry, &self.selectors.link) else {
                continue;
            };
            let Some(url) = link
                .value()
                .attr("href")
                .and_then(|href| extract::resolve_url(&self.base, href))
            else {
                continue;
            };
            if let Some(filter) = &self.config.link_filter {
                if !url.contains(filter.as_str()) {
                    continue;
                }
            }

            // Noise anchors ("購票", "更多") must not claim a URL that a
            // titled entry further down also points at.
            let title = extract::first_text_where(entry, &self.selectors.title, is_event_title)
                .or_else(|| extract::link_title(link, is_event_title));
            let Some(title) = title else {
                continue;
            };

            if !seen.insert(url.clone()) {
                continue;
            }

            let mut event = RawEvent::new(title, url, self.config.platform.label());
            event.image = extract::entry_image(entry, &self.selectors.image, &self.base)
                .unwrap_or_default();
            event.start_time = extract::first_text(entry, &self.selectors.date);
            event.category = category.map(str::to_string);
            events.push(event);
        }

        events
    }
}

#[async_trait]
impl SourceAdapter for ListingAdapter {
    fn platform(&self) -> &str {
        self.config.platform.label()
    }

    async fn extract(&self, fetcher: &dyn Fetcher) -> std::result::Result<Extraction, AdapterError> {
        let platform = self.platform();
        let mut extraction = Extraction::default();
        let mut last_failure: Option<FetchFailure> = None;

        for (i, page) in self.config.pages.iter().enumerate() {
            if i > 0 {
                self.category_delay.sleep().await;
            }
            let category = page.category.as_deref();

            match fetcher
                .fetch_with_fallback(&page.url, &self.config.strategies)
                .await
            {
                Ok(doc) => {
                    let events = self.parse_page(&doc.body, category);
                    info!(
                        platform,
                        category = category.unwrap_or("-"),
                        strategy = %doc.strategy,
                        count = events.len(),
                        "Fetched listing page"
                    );
                    extraction.pages_ok += 1;
                    extraction.events.extend(events);
                }
                Err(failure) => {
                    warn!(
                        platform,
                        category = category.unwrap_or("-"),
                        url = %page.url,
                        error = %failure,
                        "Listing page failed"
                    );
                    extraction.pages_failed += 1;
                    last_failure = Some(failure);
                }
            }
        }

        if extraction.pages_ok == 0 {
            if let Some(last) = last_failure {
                return Err(AdapterError::AllPagesFailed {
                    pages: extraction.pages_failed,
                    last,
                });
            }
        }

        // Categories of one platform overlap.
        let mut seen = HashSet::new();
        extraction
            .events
            .retain(|e| is_event_title(&e.title) && seen.insert(e.url.clone()));

        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Platform;
    use crate::fetcher::testing::FakeFetcher;
    use crate::fetcher::FetchStrategy;
    use crate::sources::config::strings;
    use crate::sources::{ListingPage, SelectorSet};

    fn config() -> SourceConfig {
        SourceConfig {
            platform: Platform::Kham,
            enabled: true,
            base_url: "https://tickets.example/".into(),
            pages: vec![
                ListingPage::category("music", "https://tickets.example/music"),
                ListingPage::category("drama", "https://tickets.example/drama"),
            ],
            selectors: SelectorSet {
                items: strings(&["ul#list li", "div.card"]),
                title: strings(&["div.name"]),
                link: strings(&["a"]),
                image: strings(&["img.lazy"]),
                date: strings(&["span.date"]),
            },
            link_filter: None,
            strategies: vec![FetchStrategy::Http],
        }
    }

    const MUSIC: &str = r#"
        <ul id="list">
          <li><a href="/e/1"><img class="lazy" data-src="/i/1.jpg"></a>
              <div class="name"> Jazz   Night </div><span class="date">2026/11/02</span></li>
          <li><a href="/e/2"><div class="name">Piano Recital</div></a></li>
          <li><a href="/e/1">duplicate</a></li>
          <li><a href="javascript:void(0)">More</a></li>
        </ul>"#;

    const DRAMA: &str = r#"
        <div class="card"><a href="https://tickets.example/e/3#x">Hamlet Live</a></div>
        <div class="card"><a href="/e/2">Piano Recital again</a></div>"#;

    #[test]
    fn test_parse_page_fields() {
        let adapter = ListingAdapter::new(config(), DelayRange::none()).unwrap();
        let events = adapter.parse_page(MUSIC, Some("music"));

        assert_eq!(events.len(), 2);
        let first = &events[0];
        assert_eq!(first.title, "Jazz Night");
        assert_eq!(first.url, "https://tickets.example/e/1");
        assert_eq!(first.platform, "寬宏");
        assert_eq!(first.image, "https://tickets.example/i/1.jpg");
        assert_eq!(first.start_time.as_deref(), Some("2026/11/02"));
        assert_eq!(first.category.as_deref(), Some("music"));

        assert_eq!(events[1].title, "Piano Recital");
        assert!(events[1].image.is_empty());
        assert!(events[1].start_time.is_none());
    }

    #[test]
    fn test_parse_page_fallback_selector() {
        let adapter = ListingAdapter::new(config(), DelayRange::none()).unwrap();
        let events = adapter.parse_page(DRAMA, None);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Hamlet Live");
        assert_eq!(events[0].url, "https://tickets.example/e/3");
    }

    #[test]
    fn test_parse_page_structural_mismatch_is_empty() {
        let adapter = ListingAdapter::new(config(), DelayRange::none()).unwrap();
        assert!(adapter.parse_page("<html><body><p>maintenance</p></body></html>", None).is_empty());
    }

    #[test]
    fn test_placeholder_items_fall_through_to_next_selector() {
        let body = r#"
            <ul id="list"><li>loading</li><li><a href="/e/0">更多</a></li></ul>
            <div class="card"><a href="/e/9">Winter Gala Concert</a></div>"#;
        let adapter = ListingAdapter::new(config(), DelayRange::none()).unwrap();
        let events = adapter.parse_page(body, None);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Winter Gala Concert");
        assert_eq!(events[0].url, "https://tickets.example/e/9");
    }

    #[test]
    fn test_short_badge_does_not_hide_title() {
        let mut cfg = config();
        cfg.selectors.title = strings(&["span.tag", "div.name"]);
        let body = r#"
            <ul id="list"><li><a href="/e/5"><span class="tag">熱賣</span>
              <div class="name">Midnight Orchestra Live</div></a></li></ul>"#;
        let adapter = ListingAdapter::new(cfg, DelayRange::none()).unwrap();
        let events = adapter.parse_page(body, None);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Midnight Orchestra Live");
    }

    #[test]
    fn test_link_filter() {
        let mut cfg = config();
        cfg.link_filter = Some("/e/3".into());
        let adapter = ListingAdapter::new(cfg, DelayRange::none()).unwrap();
        let events = adapter.parse_page(DRAMA, None);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Hamlet Live");
    }

    #[tokio::test]
    async fn test_extract_merges_categories_and_dedups() {
        let adapter = ListingAdapter::new(config(), DelayRange::none()).unwrap();
        let fetcher = FakeFetcher::new()
            .page("https://tickets.example/music", MUSIC)
            .page("https://tickets.example/drama", DRAMA);

        let extraction = adapter.extract(&fetcher).await.unwrap();
        assert_eq!(extraction.pages_ok, 2);
        assert_eq!(extraction.pages_failed, 0);
        let titles: Vec<_> = extraction.events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Jazz Night", "Piano Recital", "Hamlet Live"]);
    }

    #[tokio::test]
    async fn test_failed_category_does_not_stop_others() {
        let adapter = ListingAdapter::new(config(), DelayRange::none()).unwrap();
        let fetcher = FakeFetcher::new().page("https://tickets.example/drama", DRAMA);

        let extraction = adapter.extract(&fetcher).await.unwrap();
        assert_eq!(extraction.pages_ok, 1);
        assert_eq!(extraction.pages_failed, 1);
        assert_eq!(extraction.events.len(), 2);
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_all_pages_failed() {
        let adapter = ListingAdapter::new(config(), DelayRange::none()).unwrap();
        let fetcher = FakeFetcher::new().outcome(
            "https://tickets.example/drama",
            FetchStrategy::Http,
            Err(FetchFailure::Blocked { status: 403 }),
        );

        match adapter.extract(&fetcher).await {
            Err(AdapterError::AllPagesFailed { pages, last }) => {
                assert_eq!(pages, 2);
                assert_eq!(last, FetchFailure::Blocked { status: 403 });
            }
            other => panic!("expected AllPagesFailed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_category_delay_between_pages() {
        let adapter = ListingAdapter::new(config(), DelayRange::new(1000, 1000)).unwrap();
        let fetcher = FakeFetcher::new()
            .page("https://tickets.example/music", MUSIC)
            .page("https://tickets.example/drama", DRAMA);

        let start = tokio::time::Instant::now();
        adapter.extract(&fetcher).await.unwrap();
        assert_eq!(start.elapsed(), std::time::Duration::from_millis(1000));
    }
}
