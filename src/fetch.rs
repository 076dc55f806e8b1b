use crate::config::Config;
use crate::error::TranslationError;
use crate::i18n::TranslationBundle;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

/// Capability to fetch a language's bundle from outside the process.
#[async_trait]
pub trait BundleSource: Send + Sync {
    /// Fetch and parse the bundle for `code`.
    ///
    /// Network errors and non-success responses are `Fetch` errors; a payload
    /// that is not a JSON object is a `Parse` error.
    async fn fetch(&self, code: &str) -> Result<TranslationBundle, TranslationError>;
}

/// Fetches `translations/{code}.json` relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpBundleSource {
    client: reqwest::Client,
    base_url: String,
    cache_bust: bool,
}

impl HttpBundleSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            cache_bust: true,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .context("Failed to build HTTP client for translations")?;

        Ok(Self::new(client, config.translations_base_url.clone())
            .with_cache_bust(config.cache_bust))
    }

    /// Append a `v={unix millis}` query parameter to every request so
    /// intermediate caches never serve a stale bundle.
    pub fn with_cache_bust(mut self, cache_bust: bool) -> Self {
        self.cache_bust = cache_bust;
        self
    }

    pub fn bundle_url(&self, code: &str) -> String {
        format!(
            "{}/translations/{}.json",
            self.base_url.trim_end_matches('/'),
            code
        )
    }
}

#[async_trait]
impl BundleSource for HttpBundleSource {
    async fn fetch(&self, code: &str) -> Result<TranslationBundle, TranslationError> {
        let url = self.bundle_url(code);
        debug!("Fetching {} translations from {}", code, url);

        let mut request = self.client.get(&url);
        if self.cache_bust {
            request = request.query(&[("v", Utc::now().timestamp_millis())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TranslationError::fetch(code, e))?;

        if !response.status().is_success() {
            return Err(TranslationError::fetch(
                code,
                format!("HTTP {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::fetch(code, e))?;

        TranslationBundle::parse(code, &body)
    }
}

/// A source for hosts without any remote translations. Every fetch fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSource;

#[async_trait]
impl BundleSource for UnavailableSource {
    async fn fetch(&self, code: &str) -> Result<TranslationBundle, TranslationError> {
        Err(TranslationError::fetch(code, "no remote translation source"))
    }
}
