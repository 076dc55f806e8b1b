use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Remote translations
    pub translations_base_url: String,
    pub fetch_timeout: Duration,
    pub cache_bust: bool,

    // Preference persistence
    pub preference_file: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let fetch_timeout_secs: u64 = match std::env::var("TRANSLATIONS_FETCH_TIMEOUT_SECS") {
            Ok(v) => v
                .parse()
                .context("TRANSLATIONS_FETCH_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => 5,
        };

        Ok(Self {
            translations_base_url: std::env::var("TRANSLATIONS_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            cache_bust: std::env::var("TRANSLATIONS_CACHE_BUST")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),

            preference_file: std::env::var("PREFERENCE_FILE")
                .unwrap_or_else(|_| "data/preferences.json".to_string()),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
