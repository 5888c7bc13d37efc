//! Fetch client shared by every source adapter.
//!
//! A page is fetched with one [`FetchStrategy`] at a time; adapters hand a
//! strategy chain to [`Fetcher::fetch_with_fallback`], which moves on to the
//! next strategy only when the failure says the site is pushing back
//! (blocked status, challenge page, strategy not available).
//!
//! ```text
//! http ──blocked──▶ stealth ──blocked──▶ browser
//! ```

pub mod blocked;
pub mod browser;
pub mod config;
pub mod headers;
pub mod http_fetcher;

pub use blocked::BlockDetector;
pub use browser::{ChromeRenderer, Renderer};
pub use config::{BrowserConfig, FetchConfig};
pub use http_fetcher::HttpFetcher;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// How a page gets fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Plain HTTP session with a rotated browser-like header set.
    Http,
    /// Cookie-keeping session with a full browser header profile that warms
    /// up on the site root before the real request.
    Stealth,
    /// Headless browser render with JS execution.
    Browser,
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchStrategy::Http => "http",
            FetchStrategy::Stealth => "stealth",
            FetchStrategy::Browser => "browser",
        };
        f.write_str(s)
    }
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct Document {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub body: String,
    pub strategy: FetchStrategy,
}

/// Typed failure outcome of a fetch. Never a panic, never an untyped error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("blocked with HTTP {status}")]
    Blocked { status: u16 },

    #[error("suspect page ({reason}, {bytes} bytes)")]
    Suspect { reason: String, bytes: usize },

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("gave up after {attempts} attempts: {reason}")]
    Transient { attempts: u32, reason: String },

    #[error("strategy {0} is not available")]
    Unavailable(FetchStrategy),

    #[error("render failed: {0}")]
    Render(String),
}

impl FetchFailure {
    /// Whether the next strategy in a chain should be tried.
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self,
            FetchFailure::Blocked { .. } | FetchFailure::Suspect { .. } | FetchFailure::Unavailable(_)
        )
    }
}

pub type FetchOutcome = std::result::Result<Document, FetchFailure>;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a single URL with one strategy.
    async fn fetch(&self, url: &str, strategy: FetchStrategy) -> FetchOutcome;

    /// Walk a strategy chain until one succeeds or a failure ends the chain.
    async fn fetch_with_fallback(&self, url: &str, strategies: &[FetchStrategy]) -> FetchOutcome {
        let chain: &[FetchStrategy] = if strategies.is_empty() {
            &[FetchStrategy::Http]
        } else {
            strategies
        };

        let mut last = FetchFailure::Unavailable(chain[0]);
        for (i, strategy) in chain.iter().enumerate() {
            match self.fetch(url, *strategy).await {
                Ok(doc) => return Ok(doc),
                Err(failure) if failure.allows_fallback() => {
                    if let Some(next) = chain.get(i + 1) {
                        warn!(%url, %strategy, %next, error = %failure, "Falling back to next fetch strategy");
                    }
                    last = failure;
                }
                Err(failure) => return Err(failure),
            }
        }

        Err(last)
    }

    /// Release long-lived resources (browser processes).
    async fn shutdown(&self) {}
}


#[cfg(test)]
mod tests {
    use super::testing::FakeFetcher;
    use super::*;

    fn doc(strategy: FetchStrategy) -> FetchOutcome {
        Ok(Document {
            url: "https://x/".into(),
            status: 200,
            body: "ok".into(),
            strategy,
        })
    }

    #[tokio::test]
    async fn test_fallback_on_block() {
        let fetcher = FakeFetcher::new()
            .outcome("https://x/", FetchStrategy::Http, Err(FetchFailure::Blocked { status: 403 }))
            .outcome("https://x/", FetchStrategy::Stealth, doc(FetchStrategy::Stealth));

        let result = fetcher
            .fetch_with_fallback("https://x/", &[FetchStrategy::Http, FetchStrategy::Stealth])
            .await
            .unwrap();
        assert_eq!(result.strategy, FetchStrategy::Stealth);
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_no_fallback_on_transient() {
        let fetcher = FakeFetcher::new()
            .outcome(
                "https://x/",
                FetchStrategy::Http,
                Err(FetchFailure::Transient {
                    attempts: 3,
                    reason: "HTTP 503".into(),
                }),
            )
            .outcome("https://x/", FetchStrategy::Browser, doc(FetchStrategy::Browser));

        let result = fetcher
            .fetch_with_fallback("https://x/", &[FetchStrategy::Http, FetchStrategy::Browser])
            .await;
        assert!(matches!(result, Err(FetchFailure::Transient { .. })));
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_chain_exhaustion_returns_last_failure() {
        let fetcher = FakeFetcher::new()
            .outcome("https://x/", FetchStrategy::Http, Err(FetchFailure::Blocked { status: 403 }))
            .outcome(
                "https://x/",
                FetchStrategy::Browser,
                Err(FetchFailure::Unavailable(FetchStrategy::Browser)),
            );

        let result = fetcher
            .fetch_with_fallback("https://x/", &[FetchStrategy::Http, FetchStrategy::Browser])
            .await;
        assert_eq!(result.unwrap_err(), FetchFailure::Unavailable(FetchStrategy::Browser));
    }

    #[tokio::test]
    async fn test_empty_chain_uses_http() {
        let fetcher = FakeFetcher::new().page("https://x/", "body");
        let result = fetcher.fetch_with_fallback("https://x/", &[]).await.unwrap();
        assert_eq!(result.body, "body");
    }

    #[test]
    fn test_fallback_eligibility() {
        assert!(FetchFailure::Blocked { status: 401 }.allows_fallback());
        assert!(FetchFailure::Suspect {
            reason: "captcha".into(),
            bytes: 10
        }
        .allows_fallback());
        assert!(!FetchFailure::Status { status: 404 }.allows_fallback());
        assert!(!FetchFailure::Render("x".into()).allows_fallback());
    }
}
