//! HTML helpers shared by the listing adapters.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use url::Url;

use crate::app::{Result, TicketFeedError};
use crate::sources::SelectorSet;

static HEADING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid heading selector"));

static ANY_IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("valid img selector"));

/// Lazy-load attributes first; many listings only put a placeholder in `src`.
const IMAGE_ATTRS: &[&str] = &["data-src", "data-original", "data-lazy-src", "src"];

/// A [`SelectorSet`] parsed once at adapter construction.
#[derive(Debug)]
pub struct CompiledSelectors {
    pub items: Vec<Selector>,
    pub title: Vec<Selector>,
    pub link: Vec<Selector>,
    pub image: Vec<Selector>,
    pub date: Vec<Selector>,
}

impl CompiledSelectors {
    pub fn compile(platform: &str, set: &SelectorSet) -> Result<Self> {
        let parse = |list: &[String]| -> Result<Vec<Selector>> {
            list.iter()
                .map(|raw| {
                    Selector::parse(raw).map_err(|e| TicketFeedError::Selector {
                        platform: platform.to_string(),
                        selector: raw.clone(),
                        reason: format!("{:?}", e),
                    })
                })
                .collect()
        };

        Ok(Self {
            items: parse(&set.items)?,
            title: parse(&set.title)?,
            link: parse(&set.link)?,
            image: parse(&set.image)?,
            date: parse(&set.date)?,
        })
    }
}

pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn inner_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// First descendant matching any of the selectors, tried in order.
pub fn first_match<'a>(element: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| element.select(selector).next())
}

/// First non-empty text among descendants matching the selectors.
pub fn first_text(element: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    first_text_where(element, selectors, |text| !text.is_empty())
}

/// First descendant text accepted by `accept`, selectors tried in order.
pub fn first_text_where(
    element: ElementRef<'_>,
    selectors: &[Selector],
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    selectors.iter().find_map(|selector| {
        element
            .select(selector)
            .map(inner_text)
            .find(|text| accept(text.as_str()))
    })
}

/// Title of a link accepted by `accept`: a nested heading wins over the
/// anchor's full text, which often carries badge or icon text.
pub fn link_title(link: ElementRef<'_>, accept: impl Fn(&str) -> bool) -> Option<String> {
    link.select(&HEADING)
        .map(inner_text)
        .find(|text| accept(text.as_str()))
        .or_else(|| Some(inner_text(link)).filter(|text| accept(text.as_str())))
}

/// The detail link of an entry. An entry that is itself an anchor is used
/// when no link selector matches.
pub fn entry_link<'a>(entry: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .flat_map(|selector| entry.select(selector))
        .find(|el| el.value().attr("href").is_some())
        .or_else(|| {
            (entry.value().name() == "a" && entry.value().attr("href").is_some()).then_some(entry)
        })
}

/// Thumbnail URL of an entry, resolved against `base`.
pub fn entry_image(entry: ElementRef<'_>, selectors: &[Selector], base: &Url) -> Option<String> {
    let img = first_match(entry, selectors).or_else(|| entry.select(&ANY_IMG).next())?;
    IMAGE_ATTRS
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty() && !v.starts_with("data:"))
        .and_then(|src| resolve_url(base, src))
}

/// Resolve an href (absolute, protocol-relative or site-relative) into one
/// canonical absolute http(s) URL without fragment.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.into())
}
