use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub api_base_url: String,
    pub request_timeout: Option<Duration>,

    // Local state (token storage)
    pub state_dir: PathBuf,

    // Editing
    pub default_lang: String,

    // Preview
    pub sanitize_preview: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_base_url =
            std::env::var("NEWS_ADMIN_API_URL").context("NEWS_ADMIN_API_URL not set")?;

        Ok(Self {
            api_base_url: normalize_base_url(&api_base_url),
            request_timeout: std::env::var("NEWS_ADMIN_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs),

            state_dir: std::env::var("NEWS_ADMIN_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".news-admin")),

            default_lang: std::env::var("NEWS_ADMIN_DEFAULT_LANG")
                .unwrap_or_else(|_| "en".to_string()),

            sanitize_preview: std::env::var("NEWS_ADMIN_SANITIZE_PREVIEW")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// Config pointing at a given server with every other setting defaulted.
    pub fn for_server(api_base_url: &str) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url),
            request_timeout: None,
            state_dir: PathBuf::from(".news-admin"),
            default_lang: "en".to_string(),
            sanitize_preview: false,
        }
    }
}

/// Strip trailing slashes so paths can be appended as `{base}/news`.
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
