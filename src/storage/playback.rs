use std::sync::Arc;

use crate::error::Result;
use crate::storage::kv::KeyValueStore;

/// Remembers the last playback position per media source.
#[derive(Clone)]
pub struct PlaybackPositions {
    store: Arc<dyn KeyValueStore>,
}

impl PlaybackPositions {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(source: &str) -> String {
        format!("video-time-{}", source)
    }

    /// The saved position for `source`, in seconds.
    ///
    /// Unparseable or negative values are ignored.
    pub fn resume_at(&self, source: &str) -> Option<f64> {
        self.store
            .get(&Self::key(source))
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
    }

    pub fn save(&self, source: &str, seconds: f64) -> Result<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Ok(());
        }
        self.store.set(&Self::key(source), &seconds.to_string())
    }
}
