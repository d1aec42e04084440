//! Backend endpoint configuration shared by client frontends.
//!
//! Frontends resolve a single API base URL (explicit flag, environment, or a
//! stored profile) and derive every REST endpoint from it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Environment variable holding the backend base URL
pub const API_URL_ENV: &str = "CARNET_API_URL";

/// Client configuration persisted per profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl ClientConfig {
    /// Normalized base URL, if one is configured
    pub fn api_base_url(&self) -> Option<String> {
        normalize_text_option(self.api_base_url.clone())
    }
}

/// Pick the base URL by priority: explicit value, environment, stored config.
pub fn resolve_api_base_url(
    explicit: Option<String>,
    env_value: Option<String>,
    stored: &ClientConfig,
) -> Result<String> {
    let raw = normalize_text_option(explicit)
        .or_else(|| normalize_text_option(env_value))
        .or_else(|| stored.api_base_url())
        .ok_or_else(|| {
            Error::Config(format!(
                "API base URL is not configured. Set {API_URL_ENV} or run `carnet config set-url`."
            ))
        })?;
    normalize_api_base_url(&raw)
}

/// Trim whitespace and trailing slashes, and require an http(s) scheme.
pub fn normalize_api_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("API base URL must not be empty".to_string()));
    }
    if !is_http_url(trimmed) {
        return Err(Error::Config(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// REST endpoints derived from the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub base: String,
    pub login: String,
    pub notes: String,
    pub categories: String,
    pub tasks: String,
}

impl ApiEndpoints {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = normalize_api_base_url(base_url)?;
        Ok(Self {
            login: format!("{base}/login"),
            notes: format!("{base}/notes"),
            categories: format!("{base}/categories"),
            tasks: format!("{base}/tasks"),
            base,
        })
    }

    pub fn note(&self, id: impl std::fmt::Display) -> String {
        format!("{}/{id}", self.notes)
    }

    pub fn task(&self, id: impl std::fmt::Display) -> String {
        format!("{}/{id}", self.tasks)
    }

    pub fn task_toggle(&self, id: impl std::fmt::Display) -> String {
        format!("{}/{id}/toggle", self.tasks)
    }
}
