use std::sync::Arc;

use tracing::debug;

use crate::app::error::Result;
use crate::config::{Config, Settings};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::normalizer::Normalizer;
use crate::pipeline::Pipeline;
use crate::sources;
use crate::store::{EventStore, SqliteStore};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub fetcher: Arc<dyn Fetcher>,
    pub normalizer: Normalizer,
}

impl AppContext {
    pub fn new(config: Config, settings: &Settings) -> Result<Self> {
        if let Some(parent) = settings.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %settings.database_path.display(), "Opening event store");

        let store = Arc::new(SqliteStore::new(&settings.database_path)?);
        Self::with_store(config, store)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::with_store(config, store)
    }

    fn with_store(config: Config, store: Arc<SqliteStore>) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::with_browser(
            config.fetch.clone(),
            config.browser.clone(),
        )?);
        let normalizer = Normalizer::new(config.normalize.clone());

        Ok(Self {
            config,
            store,
            fetcher,
            normalizer,
        })
    }

    /// A pipeline over the enabled sources of the current configuration.
    pub fn pipeline(&self) -> Pipeline {
        let adapters =
            sources::build_adapters(&self.config.sources, self.config.pipeline.category_delay);
        let store: Arc<dyn EventStore> = self.store.clone();

        Pipeline::new(
            adapters,
            self.fetcher.clone(),
            self.normalizer.clone(),
            store,
            self.config.pipeline.clone(),
        )
    }
}
