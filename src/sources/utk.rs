//! Shared layout of the UTK ticketing system run by 寬宏, UDN and 年代.
//!
//! All three sites serve the same ASP.NET product list, one page per
//! category, so they share selectors and differ only in host and category ids.

use crate::domain::Platform;
use crate::fetcher::FetchStrategy;
use crate::sources::config::strings;
use crate::sources::{ListingPage, SelectorSet, SourceConfig};

pub(super) fn source(platform: Platform, base_url: &str, categories: &[(&str, &str)]) -> SourceConfig {
    SourceConfig {
        platform,
        enabled: true,
        base_url: base_url.to_string(),
        pages: categories
            .iter()
            .map(|(category, url)| ListingPage::category(category, url))
            .collect(),
        selectors: selectors(),
        link_filter: None,
        strategies: vec![FetchStrategy::Http, FetchStrategy::Stealth],
    }
}

fn selectors() -> SelectorSet {
    SelectorSet {
        items: strings(&["ul#product_list li", "div.product_list li", "div.product_item"]),
        title: strings(&["div.product_name a", "div.product_name", ".product_title"]),
        link: strings(&["div.product_name a", "div.product_img a", "a[href*='UTK02']", "a[href]"]),
        image: strings(&["div.product_img img.lazy", "div.product_img img"]),
        date: strings(&["div.product_date", ".product_time"]),
    }
}

#[cfg(test)]
pub(super) const FIXTURE: &str = r##"
<html><body>
<ul id="product_list">
  <li>
    <div class="product_img"><a href="UTK0201_.aspx?PRODUCT_ID=P0001">
      <img class="lazy" src="/images/loading.gif" data-src="/upload/P0001.jpg"></a></div>
    <div class="product_name"><a href="/application/UTK02/UTK0201_.aspx?PRODUCT_ID=P0001">2026 城市交響 新年音樂會</a></div>
    <div class="product_date">2026/01/01 (四) 19:30</div>
  </li>
  <li>
    <div class="product_img"><img class="lazy" data-src="https://cdn.example/P0002.png"></div>
    <div class="product_name"><a href="/application/UTK02/UTK0201_.aspx?PRODUCT_ID=P0002">莫內光影特展</a></div>
  </li>
  <li class="more"><a href="#">更多</a></li>
</ul>
</body></html>"##;

#[cfg(test)]
pub(super) fn assert_parses_fixture(source: SourceConfig, host: &str) {
    use crate::politeness::DelayRange;
    use crate::sources::ListingAdapter;

    let label = source.platform.label();
    let adapter = ListingAdapter::new(source, DelayRange::none()).unwrap();
    let events = adapter.parse_page(FIXTURE, Some("音樂會/演唱會"));

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].title, "2026 城市交響 新年音樂會");
    assert_eq!(
        events[0].url,
        format!("{}/application/UTK02/UTK0201_.aspx?PRODUCT_ID=P0001", host)
    );
    assert_eq!(events[0].image, format!("{}/upload/P0001.jpg", host));
    assert_eq!(events[0].start_time.as_deref(), Some("2026/01/01 (四) 19:30"));
    assert_eq!(events[0].platform, label);
    assert_eq!(events[1].title, "莫內光影特展");
    assert_eq!(events[1].image, "https://cdn.example/P0002.png");
    assert!(events.iter().all(|e| e.category.as_deref() == Some("音樂會/演唱會")));
}
