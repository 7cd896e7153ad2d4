use serde::{Deserialize, Serialize};

/// A video as listed by the catalog API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub category: String,
    /// Path of the media file relative to the server's `/stream/` root.
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

impl Video {
    /// The `duration | size` line shown under a catalog card.
    pub fn summary_line(&self) -> String {
        format!(
            "{} | {}",
            self.duration.as_deref().unwrap_or("0:00"),
            self.size.as_deref().unwrap_or("0MB")
        )
    }
}
