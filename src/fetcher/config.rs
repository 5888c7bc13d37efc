use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::fetcher::headers::DEFAULT_USER_AGENTS;

/// HTTP session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds (default: 20)
    pub timeout_secs: u64,

    /// Connect timeout in seconds (default: 10)
    pub connect_timeout_secs: u64,

    /// Retries after the first attempt on 5xx / timeouts (default: 2)
    pub max_retries: u32,

    /// Base of the exponential backoff in milliseconds (default: 800)
    pub backoff_base_ms: u64,

    /// User agents to rotate through
    pub user_agents: Vec<String>,

    /// Accept-Language header value
    pub accept_language: String,

    /// Bodies shorter than this are treated as suspect (default: 1024)
    pub min_body_bytes: usize,

    /// Case-insensitive substrings that mark a challenge/block page
    pub block_markers: Vec<String>,

    /// Honour HTTP(S)_PROXY from the environment (default: true)
    pub system_proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            connect_timeout_secs: 10,
            max_retries: 2,
            backoff_base_ms: 800,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            accept_language: "zh-TW,zh;q=0.9,en-US;q=0.6".to_string(),
            min_body_bytes: 1024,
            block_markers: vec![
                "captcha".to_string(),
                "access denied".to_string(),
                "blocked".to_string(),
                "cf-challenge".to_string(),
                "challenge-platform".to_string(),
                "cf-browser-verification".to_string(),
                "just a moment...".to_string(),
                "attention required".to_string(),
            ],
            system_proxy: true,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Backoff before retry number `attempt` (1-based), without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1 << attempt.min(10)))
    }
}

/// Configuration for the headless-browser strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Allow the browser strategy at all (default: true)
    pub enabled: bool,

    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Page load timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Wait time after page load for client-side rendering in milliseconds (default: 1500)
    pub wait_after_load_ms: u64,

    /// Extra command-line arguments for Chrome
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            headless: true,
            timeout_secs: 30,
            wait_after_load_ms: 1500,
            args: vec![
                "--no-sandbox".to_string(),
                "--disable-gpu".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-software-rasterizer".to_string(),
            ],
        }
    }
}

impl BrowserConfig {
    /// Get the page load timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the wait time after load as a Duration
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }
}
