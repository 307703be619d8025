//! Configuration for the exporter and its host pipeline

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL the flattened telemetry is pushed to. Endpoints containing
    /// "catalyst" select the legacy query-parameter upload.
    pub url: String,

    /// Site24x7 device key sent with every upload.
    pub api_key: String,

    /// Accept invalid TLS certificates from the endpoint.
    pub insecure: bool,

    /// Path of a local file that archives payloads and delivery outcomes.
    /// Empty disables the archive.
    pub path: String,

    /// Time limit for a single upload request.
    pub request_timeout: Duration,

    /// Maximum retry attempts for a failed upload, applied by the host
    /// pipeline around the exporter.
    pub max_retries: u32,

    /// Base backoff between retries; doubles with each attempt.
    pub retry_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            insecure: false,
            path: String::new(),
            request_timeout: Duration::from_secs(5),
            max_retries: 3,
            retry_backoff_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(url) = env::var("SITE24X7_URL") {
            config.url = url;
        }

        if let Ok(api_key) = env::var("SITE24X7_API_KEY") {
            config.api_key = api_key;
        }

        if let Ok(insecure) = env::var("SITE24X7_INSECURE") {
            config.insecure = insecure.to_lowercase() == "true";
        }

        if let Ok(path) = env::var("SITE24X7_PATH") {
            config.path = path;
        }

        if let Ok(timeout) = env::var("HTTP_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.request_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(max_retries) = env::var("MAX_RETRIES") {
            if let Ok(retries) = max_retries.parse() {
                config.max_retries = retries;
            }
        }

        if let Ok(backoff) = env::var("RETRY_BACKOFF_MS") {
            if let Ok(ms) = backoff.parse() {
                config.retry_backoff_ms = ms;
            }
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("url must be non-empty".to_string());
        }

        if self.api_key.is_empty() {
            return Err("api key must be non-empty".to_string());
        }

        Ok(())
    }
}
