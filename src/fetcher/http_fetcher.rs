use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::app::Result;
use crate::fetcher::blocked::BlockDetector;
use crate::fetcher::headers::{basic_headers, pick_user_agent, stealth_headers};
use crate::fetcher::{
    BrowserConfig, ChromeRenderer, Document, FetchConfig, FetchFailure, FetchOutcome, FetchStrategy,
    Fetcher, Renderer,
};

/// What one HTTP attempt came back with, before retry policy is applied.
enum Attempt {
    Done(Document),
    Retry(String),
    Fail(FetchFailure),
}

/// reqwest-based fetch client with an optional headless-browser strategy.
pub struct HttpFetcher {
    plain: Client,
    stealth: Client,
    renderer: Option<Arc<dyn Renderer>>,
    config: FetchConfig,
    detector: BlockDetector,
    /// Origins the stealth session has already visited.
    warmed: Mutex<HashSet<String>>,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let plain = Self::builder(&config).build()?;
        let stealth = Self::builder(&config).cookie_store(true).build()?;

        Ok(Self {
            plain,
            stealth,
            renderer: None,
            detector: BlockDetector::from_config(&config),
            config,
            warmed: Mutex::new(HashSet::new()),
        })
    }

    fn builder(config: &FetchConfig) -> reqwest::ClientBuilder {
        let builder = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .gzip(true)
            .brotli(true);

        if config.system_proxy {
            builder
        } else {
            builder.no_proxy()
        }
    }

    /// Full client: both HTTP sessions plus a lazily launched Chrome renderer.
    pub fn with_browser(config: FetchConfig, browser: BrowserConfig) -> Result<Self> {
        let renderer: Arc<dyn Renderer> = Arc::new(ChromeRenderer::new(browser));
        Ok(Self::new(config)?.with_renderer(renderer))
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    async fn fetch_http(&self, url: &str, stealth: bool) -> FetchOutcome {
        let user_agent = pick_user_agent(&self.config.user_agents).to_string();

        if stealth {
            self.warm_up(url, &user_agent).await;
        }

        let attempts = self.config.max_retries + 1;
        let mut last_reason = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.config.backoff(attempt) + jitter();
                debug!(%url, attempt, ?delay, "Backing off before retry");
                tokio::time::sleep(delay).await;
            }

            let headers = if stealth {
                stealth_headers(&user_agent, &self.config.accept_language, origin(url).as_deref())
            } else {
                basic_headers(&user_agent, &self.config.accept_language)
            };
            let client = if stealth { &self.stealth } else { &self.plain };

            match self.attempt(client, url, headers, stealth).await {
                Attempt::Done(doc) => return self.inspect(doc),
                Attempt::Fail(failure) => {
                    warn!(%url, error = %failure, "Fetch failed");
                    return Err(failure);
                }
                Attempt::Retry(reason) => {
                    warn!(%url, attempt = attempt + 1, of = attempts, %reason, "Transient fetch error");
                    last_reason = reason;
                }
            }
        }

        Err(FetchFailure::Transient {
            attempts,
            reason: last_reason,
        })
    }

    async fn attempt(&self, client: &Client, url: &str, headers: HeaderMap, stealth: bool) -> Attempt {
        let response = match client.get(url).headers(headers).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                return Attempt::Retry(e.to_string())
            }
            Err(e) => return Attempt::Fail(FetchFailure::Transient {
                attempts: 1,
                reason: e.to_string(),
            }),
        };

        let status = response.status();
        if let Some(outcome) = classify_status(status) {
            return outcome;
        }

        let final_url = response.url().to_string();
        match response.text().await {
            Ok(body) => Attempt::Done(Document {
                url: final_url,
                status: status.as_u16(),
                body,
                strategy: if stealth {
                    FetchStrategy::Stealth
                } else {
                    FetchStrategy::Http
                },
            }),
            Err(e) => Attempt::Retry(format!("failed to read body: {}", e)),
        }
    }

    /// Visit the site root once per origin so the cookie jar holds whatever
    /// session cookies the challenge layer hands out.
    async fn warm_up(&self, url: &str, user_agent: &str) {
        let Some(origin) = origin(url) else {
            return;
        };

        {
            let mut warmed = self.warmed.lock().unwrap_or_else(|e| e.into_inner());
            if !warmed.insert(origin.clone()) {
                return;
            }
        }

        let headers = stealth_headers(user_agent, &self.config.accept_language, None);
        match self.stealth.get(&origin).headers(headers).send().await {
            Ok(resp) => debug!(%origin, status = resp.status().as_u16(), "Stealth session warmed up"),
            Err(e) => debug!(%origin, "Stealth warm-up failed: {}", e),
        }
    }

    async fn fetch_rendered(&self, url: &str) -> FetchOutcome {
        let Some(ref renderer) = self.renderer else {
            return Err(FetchFailure::Unavailable(FetchStrategy::Browser));
        };

        let user_agent = pick_user_agent(&self.config.user_agents).to_string();
        let body = renderer.render(url, &user_agent).await?;
        self.inspect(Document {
            url: url.to_string(),
            status: 200,
            body,
            strategy: FetchStrategy::Browser,
        })
    }

    fn inspect(&self, doc: Document) -> FetchOutcome {
        match self.detector.inspect(&doc.body) {
            Some(suspect) => {
                warn!(url = %doc.url, strategy = %doc.strategy, error = %suspect, "Response looks like a block page");
                Err(suspect)
            }
            None => Ok(doc),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, strategy: FetchStrategy) -> FetchOutcome {
        debug!(%url, %strategy, "Fetching");
        match strategy {
            FetchStrategy::Http => self.fetch_http(url, false).await,
            FetchStrategy::Stealth => self.fetch_http(url, true).await,
            FetchStrategy::Browser => self.fetch_rendered(url).await,
        }
    }

    async fn shutdown(&self) {
        if let Some(ref renderer) = self.renderer {
            renderer.shutdown().await;
        }
    }
}

/// Map a non-success status onto the retry policy. `None` means success.
fn classify_status(status: StatusCode) -> Option<Attempt> {
    if status.is_success() {
        return None;
    }
    let code = status.as_u16();
    Some(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Attempt::Fail(FetchFailure::Blocked { status: code })
        }
        StatusCode::TOO_MANY_REQUESTS => Attempt::Retry(format!("HTTP {}", code)),
        s if s.is_server_error() => Attempt::Retry(format!("HTTP {}", code)),
        _ => Attempt::Fail(FetchFailure::Status { status: code }),
    })
}

fn origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin
        .is_tuple()
        .then(|| format!("{}/", origin.ascii_serialization()))
}

fn jitter() -> Duration {
    Duration::from_millis(rand::rng().random_range(0..250))
}
