use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeLaunchConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::fetcher::{BrowserConfig, FetchFailure};

/// Render a page with JS execution and return the resulting DOM as HTML.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str, user_agent: &str) -> Result<String, FetchFailure>;

    /// Tear down any external process. Safe to call more than once.
    async fn shutdown(&self) {}
}

/// A launched Chrome process and the task pumping its CDP events.
struct ChromeSession {
    browser: Arc<Browser>,
    handler: JoinHandle<()>,
}

/// Chrome-based renderer using chromiumoxide.
///
/// The browser is launched on first use and kept for the rest of the run;
/// [`Renderer::shutdown`] closes it. Each render opens and always closes its
/// own tab.
pub struct ChromeRenderer {
    config: BrowserConfig,
    session: Mutex<Option<ChromeSession>>,
}

impl ChromeRenderer {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    async fn browser(&self) -> Result<Arc<Browser>, FetchFailure> {
        let mut guard = self.session.lock().await;
        if let Some(ref session) = *guard {
            return Ok(session.browser.clone());
        }

        let session = self.launch().await?;
        let browser = session.browser.clone();
        *guard = Some(session);
        Ok(browser)
    }

    async fn launch(&self) -> Result<ChromeSession, FetchFailure> {
        let mut builder = ChromeLaunchConfig::builder().request_timeout(self.config.timeout());
        for arg in &self.config.args {
            builder = builder.arg(arg.as_str());
        }
        if !self.config.headless {
            builder = builder.with_head();
        }

        let launch_config = builder
            .build()
            .map_err(|e| FetchFailure::Render(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(launch_config).await.map_err(|e| {
            FetchFailure::Render(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        info!("Headless browser launched");
        Ok(ChromeSession {
            browser: Arc::new(browser),
            handler,
        })
    }

    async fn render_in(&self, page: &Page, url: &str, user_agent: &str) -> Result<String, FetchFailure> {
        page.set_user_agent(user_agent)
            .await
            .map_err(|e| FetchFailure::Render(format!("Failed to set user agent: {}", e)))?;

        page.goto(url)
            .await
            .map_err(|e| FetchFailure::Render(format!("Navigation failed: {}", e)))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| FetchFailure::Render(format!("Navigation failed: {}", e)))?;

        // Client-side listings fill in after the load event
        tokio::time::sleep(self.config.wait_after_load()).await;

        page.content()
            .await
            .map_err(|e| FetchFailure::Render(format!("Failed to read page content: {}", e)))
    }
}

impl Drop for ChromeRenderer {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.handler.abort();
        }
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str, user_agent: &str) -> Result<String, FetchFailure> {
        if !self.config.enabled {
            return Err(FetchFailure::Unavailable(crate::fetcher::FetchStrategy::Browser));
        }

        let browser = self.browser().await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchFailure::Render(format!("Failed to create page: {}", e)))?;

        let result = tokio::time::timeout(self.config.timeout(), self.render_in(&page, url, user_agent))
            .await
            .unwrap_or_else(|_| {
                Err(FetchFailure::Render(format!(
                    "Timed out after {}s",
                    self.config.timeout_secs
                )))
            });

        // Close the tab on every path
        if let Err(e) = page.close().await {
            debug!("Failed to close page for {}: {}", url, e);
        }

        result
    }

    async fn shutdown(&self) {
        let Some(session) = self.session.lock().await.take() else {
            return;
        };

        let ChromeSession { browser, handler } = session;
        match Arc::try_unwrap(browser) {
            Ok(mut browser) => {
                if let Err(e) = browser.close().await {
                    warn!("Failed to close browser: {}", e);
                }
                let _ = browser.wait().await;
                info!("Headless browser closed");
            }
            Err(_) => {
                warn!("Browser still in use at shutdown; dropping handle");
            }
        }
        handler.abort();
    }
}
