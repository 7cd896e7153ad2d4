use std::env;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};

/// The default API base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
/// How long a notification stays visible, in milliseconds.
pub const DEFAULT_NOTIFICATION_DISMISS_MS: u64 = 4000;

/// The client's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The base URL every API endpoint is joined to.
    pub api_base_url: String,
    /// Where the persistent key-value state is kept.
    pub state_file: PathBuf,
    /// How long a notification stays visible.
    pub notification_dismiss: Duration,
    /// Where streamed videos are saved.
    pub download_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            state_file: PathBuf::from(".vidcat-state.json"),
            notification_dismiss: Duration::from_millis(DEFAULT_NOTIFICATION_DISMISS_MS),
            download_dir: PathBuf::from("downloads"),
        }
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            anyhow::bail!("API_BASE_URL must start with http:// or https://");
        }

        let dismiss_ms: u64 = env::var("NOTIFICATION_DISMISS_MS")
            .unwrap_or_else(|_| DEFAULT_NOTIFICATION_DISMISS_MS.to_string())
            .parse()
            .context("Invalid NOTIFICATION_DISMISS_MS")?;

        Ok(Self {
            api_base_url,
            state_file: env::var("STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".vidcat-state.json")),
            notification_dismiss: Duration::from_millis(dismiss_ms),
            download_dir: env::var("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("downloads")),
        })
    }
}
