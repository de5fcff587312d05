use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Application configuration loaded from environment variables.
/// The OpenRouter key is optional here: a missing key only fails the
/// generation call that needs it, not startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub openrouter_referer: String,
    pub openrouter_app_title: String,
    pub openrouter_timeout: Option<Duration>,
    pub state_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let openrouter_timeout = match std::env::var("OPENROUTER_TIMEOUT_SECONDS") {
            Ok(raw) => Some(Duration::from_secs(
                raw.parse::<u64>()
                    .context("OPENROUTER_TIMEOUT_SECONDS must be a whole number of seconds")?,
            )),
            Err(_) => None,
        };

        Ok(Config {
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            openrouter_base_url: optional_env("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            openrouter_referer: optional_env("OPENROUTER_REFERER")
                .unwrap_or_else(|| "https://cognitive-knobs.app".to_string()),
            openrouter_app_title: optional_env("OPENROUTER_APP_TITLE")
                .unwrap_or_else(|| "Cognitive Knobs".to_string()),
            openrouter_timeout,
            state_dir: optional_env("KNOBS_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "4175".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Config pointing at a local provider stub, used by handler tests.
    #[cfg(test)]
    pub fn for_tests(base_url: &str, api_key: Option<&str>) -> Self {
        Config {
            openrouter_api_key: api_key.map(str::to_string),
            openrouter_base_url: base_url.to_string(),
            openrouter_referer: "https://cognitive-knobs.app".to_string(),
            openrouter_app_title: "Cognitive Knobs".to_string(),
            openrouter_timeout: Some(Duration::from_secs(5)),
            state_dir: PathBuf::from("./data"),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

/// Blank values count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
