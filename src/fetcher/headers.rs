//! Browser-plausible request header sets.

use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.5 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36 Edg/123.0.0.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Pick a user agent from the pool; falls back to the built-in list when the
/// configured pool is empty.
pub fn pick_user_agent(pool: &[String]) -> &str {
    if pool.is_empty() {
        let idx = rand::rng().random_range(0..DEFAULT_USER_AGENTS.len());
        return DEFAULT_USER_AGENTS[idx];
    }
    let idx = rand::rng().random_range(0..pool.len());
    &pool[idx]
}

/// Headers for the plain HTTP session.
pub fn basic_headers(user_agent: &str, accept_language: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, USER_AGENT, user_agent);
    insert(&mut headers, ACCEPT, ACCEPT_HTML);
    insert(&mut headers, ACCEPT_LANGUAGE, accept_language);
    insert(&mut headers, CONNECTION, "keep-alive");
    headers
}

/// Headers for the stealth session: the basic set plus the client-hint and
/// fetch-metadata headers a real Chromium sends on a top-level navigation.
pub fn stealth_headers(user_agent: &str, accept_language: &str, referer: Option<&str>) -> HeaderMap {
    let mut headers = basic_headers(user_agent, accept_language);
    insert(&mut headers, UPGRADE_INSECURE_REQUESTS, "1");
    insert_named(&mut headers, "sec-fetch-dest", "document");
    insert_named(&mut headers, "sec-fetch-mode", "navigate");
    insert_named(
        &mut headers,
        "sec-fetch-site",
        if referer.is_some() { "same-origin" } else { "none" },
    );
    insert_named(&mut headers, "sec-fetch-user", "?1");

    if let Some((brands, platform)) = client_hints(user_agent) {
        insert_named(&mut headers, "sec-ch-ua", &brands);
        insert_named(&mut headers, "sec-ch-ua-mobile", "?0");
        insert_named(&mut headers, "sec-ch-ua-platform", platform);
    }

    if let Some(referer) = referer {
        insert(&mut headers, REFERER, referer);
    }
    headers
}

/// Client hints matching a Chromium user agent. Firefox and Safari send none.
fn client_hints(user_agent: &str) -> Option<(String, &'static str)> {
    let version = user_agent
        .split("Chrome/")
        .nth(1)?
        .split('.')
        .next()?
        .to_string();

    let brand = if user_agent.contains("Edg/") {
        "Microsoft Edge"
    } else {
        "Google Chrome"
    };

    let platform = if user_agent.contains("Windows") {
        "\"Windows\""
    } else if user_agent.contains("Macintosh") {
        "\"macOS\""
    } else {
        "\"Linux\""
    };

    Some((
        format!(
            "\"Chromium\";v=\"{version}\", \"{brand}\";v=\"{version}\", \"Not-A.Brand\";v=\"99\""
        ),
        platform,
    ))
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

fn insert_named(headers: &mut HeaderMap, name: &'static str, value: &str) {
    insert(headers, HeaderName::from_static(name), value);
}
