//! Configuration management for ticketfeed.
//!
//! Tunables are read from a TOML file: `--config <path>`, else
//! `$TICKETFEED_CONFIG`, else `~/.config/ticketfeed/config.toml`. A missing
//! file means defaults. The store connection string always comes from the
//! `DATABASE_URL` environment variable.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fetcher::{BrowserConfig, FetchConfig};
use crate::normalizer::NormalizeConfig;
use crate::pipeline::PipelineConfig;
use crate::sources::{self, SourceConfig};

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const CONFIG_PATH_ENV: &str = "TICKETFEED_CONFIG";

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub browser: BrowserConfig,
    pub pipeline: PipelineConfig,
    pub normalize: NormalizeConfig,
    /// Per-adapter sub-configuration, in execution order.
    pub sources: Vec<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            browser: BrowserConfig::default(),
            pipeline: PipelineConfig::default(),
            normalize: NormalizeConfig::default(),
            sources: sources::builtin_sources(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit path or the default locations.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_config_path(),
        };

        match path {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) if explicit.is_some() => Err(ConfigError::Io {
                path,
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `$TICKETFEED_CONFIG`, falling back to `~/.config/ticketfeed/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|d| d.join("ticketfeed").join("config.toml"))
    }
}

/// Process-level settings that never live in the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(DATABASE_URL_ENV).ok();
        Self::from_database_url(raw.as_deref())
    }

    /// Accepts `sqlite://path`, `sqlite:path` or a bare filesystem path.
    pub fn from_database_url(raw: Option<&str>) -> Result<Self, ConfigError> {
        let raw = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let path = raw
            .strip_prefix("sqlite://")
            .or_else(|| raw.strip_prefix("sqlite:"))
            .unwrap_or(raw);

        if path.is_empty() || path.contains("://") {
            return Err(ConfigError::UnsupportedDatabaseUrl(raw.to_string()));
        }

        Ok(Self {
            database_path: PathBuf::from(path),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable {DATABASE_URL_ENV} is not set")]
    MissingDatabaseUrl,

    #[error("Unsupported database URL: {0} (expected sqlite://<path> or a file path)")]
    UnsupportedDatabaseUrl(String),

    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
