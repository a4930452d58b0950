//! Client configuration.
//!
//! # Design
//! Only the service base URL is configurable. It comes from the environment
//! with a logged fallback to the local development server, so a missing
//! variable never stops the client from starting.

use std::env;

use tracing::info;

pub const BASE_URL_VAR: &str = "FEATURE_API_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/v1";

/// Where the feature service lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Reads `FEATURE_API_URL`, falling back to the local development server.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(BASE_URL_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| {
                info!("{BASE_URL_VAR} not set, using default: {DEFAULT_BASE_URL}");
                DEFAULT_BASE_URL.to_string()
            });
        Self { base_url }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
