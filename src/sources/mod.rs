//! Source adapters: one per ticketing platform.
//!
//! All eight built-in platforms are listing pages scraped with CSS selectors,
//! so they share one engine ([`ListingAdapter`]) and differ only in their
//! [`SourceConfig`] data.

pub mod config;
pub mod extract;
pub mod listing;

mod era;
mod eventgo;
mod ibon;
mod kham;
mod kktix;
mod opentix;
mod tixcraft;
mod udn;
mod utk;

pub use config::{ListingPage, SelectorSet, SourceConfig};
pub use listing::ListingAdapter;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::error;

use crate::domain::{Platform, RawEvent};
use crate::fetcher::{FetchFailure, Fetcher};
use crate::politeness::DelayRange;

/// Why an adapter produced nothing usable.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("all {pages} listing pages failed, last error: {last}")]
    AllPagesFailed { pages: usize, last: FetchFailure },

    #[error("{0}")]
    Other(String),
}

/// What an adapter brought back from one run.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub events: Vec<RawEvent>,
    pub pages_ok: usize,
    pub pages_failed: usize,
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Display label of the platform, written to every record.
    fn platform(&self) -> &str;

    /// Scrape every listing page of the platform. Page-level failures are
    /// contained; an error means the adapter has nothing at all.
    async fn extract(&self, fetcher: &dyn Fetcher) -> Result<Extraction, AdapterError>;
}

/// Built-in sub-configurations in default execution order.
pub fn builtin_sources() -> Vec<SourceConfig> {
    Platform::ALL.into_iter().map(builtin_source).collect()
}

pub fn builtin_source(platform: Platform) -> SourceConfig {
    match platform {
        Platform::Opentix => opentix::source(),
        Platform::Kham => kham::source(),
        Platform::Udn => udn::source(),
        Platform::Ibon => ibon::source(),
        Platform::Kktix => kktix::source(),
        Platform::Tixcraft => tixcraft::source(),
        Platform::Era => era::source(),
        Platform::Eventgo => eventgo::source(),
    }
}

/// Build adapters for the given configurations. An invalid configuration
/// (bad base URL, unparsable selector) is logged and skipped so the other
/// platforms still run.
pub fn build_adapters(
    sources: &[SourceConfig],
    category_delay: DelayRange,
) -> Vec<Arc<dyn SourceAdapter>> {
    sources
        .iter()
        .filter(|source| source.enabled)
        .filter_map(
            |source| match ListingAdapter::new(source.clone(), category_delay) {
                Ok(adapter) => Some(Arc::new(adapter) as Arc<dyn SourceAdapter>),
                Err(e) => {
                    error!(platform = %source.platform, error = %e, "Skipping misconfigured source");
                    None
                }
            },
        )
        .collect()
}
