use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::politeness::DelayRange;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Adapters allowed to run at the same time (default: 3)
    pub workers: usize,

    /// Wall-clock budget for the fetch phase in seconds (default: 900)
    pub deadline_secs: u64,

    /// Pause a worker takes after an adapter before picking up the next one
    pub adapter_delay: DelayRange,

    /// Pause between the listing pages of one adapter
    pub category_delay: DelayRange,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            deadline_secs: 900,
            adapter_delay: DelayRange::new(1000, 2200),
            category_delay: DelayRange::new(1000, 2000),
        }
    }
}

impl PipelineConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.workers, 3);
        assert_eq!(config.deadline(), Duration::from_secs(900));
        assert_eq!(config.category_delay, DelayRange::new(1000, 2000));
    }

    #[test]
    fn test_partial_toml() {
        let config: PipelineConfig = toml::from_str(
            r#"
            workers = 1
            [adapter_delay]
            min_ms = 0
            max_ms = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.workers, 1);
        assert_eq!(config.adapter_delay, DelayRange::new(0, 10));
        assert_eq!(config.deadline_secs, 900);
    }
}
