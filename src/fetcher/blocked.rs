use crate::fetcher::{FetchConfig, FetchFailure};

/// Content-based detection of anti-bot challenge pages served with a 2xx.
#[derive(Debug, Clone)]
pub struct BlockDetector {
    min_bytes: usize,
    markers: Vec<String>,
}

impl BlockDetector {
    pub fn new(min_bytes: usize, markers: &[String]) -> Self {
        Self {
            min_bytes,
            markers: markers
                .iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.min_body_bytes, &config.block_markers)
    }

    /// `Some(Suspect)` when the body is implausibly short or carries a
    /// challenge marker.
    pub fn inspect(&self, body: &str) -> Option<FetchFailure> {
        let bytes = body.len();
        if bytes < self.min_bytes {
            return Some(FetchFailure::Suspect {
                reason: format!("body shorter than {} bytes", self.min_bytes),
                bytes,
            });
        }

        let lower = body.to_lowercase();
        self.markers
            .iter()
            .find(|marker| lower.contains(marker.as_str()))
            .map(|marker| FetchFailure::Suspect {
                reason: format!("marker '{}'", marker),
                bytes,
            })
    }
}
