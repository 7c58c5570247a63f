//! Client configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Well-known storage key for the persisted auth token.
pub const DEFAULT_TOKEN_STORAGE_KEY: &str = "token";

/// How long a finished (or failed) upload keeps its progress bar visible.
pub const DEFAULT_PROGRESS_RESET_DELAY_MS: u32 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Token storage key must not be empty")]
    EmptyStorageKey,
}

/// Settings for an Image Service client.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Absolute API origin, e.g. `https://api.example.com/`. Empty means
    /// paths are issued relative to the page origin.
    pub base_url: String,
    pub token_storage_key: String,
    pub progress_reset_delay_ms: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token_storage_key: DEFAULT_TOKEN_STORAGE_KEY.to_string(),
            progress_reset_delay_ms: DEFAULT_PROGRESS_RESET_DELAY_MS,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Check the config before any request is built from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        self.parsed_base_url().map(|_| ())
    }

    /// Parsed base URL, or `None` for same-origin relative requests.
    pub fn parsed_base_url(&self) -> Result<Option<Url>, ConfigError> {
        let raw = self.base_url.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        // Without a trailing slash, Url::join would replace the last segment.
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        let url = Url::parse(&normalized).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }
        Ok(Some(url))
    }
}
