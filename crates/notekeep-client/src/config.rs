//! Client configuration.

use notekeep_core::defaults;

/// Connection settings for [`NotekeepClient`](crate::NotekeepClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, without the `/api` suffix.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Header carrying the caller id.
    pub user_id_header: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::CLIENT_API_URL.to_string(),
            timeout_seconds: defaults::CLIENT_TIMEOUT_SECS,
            user_id_header: defaults::USER_ID_HEADER.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read `NOTEKEEP_API_URL`, `NOTEKEEP_TIMEOUT_SECS` and
    /// `NOTEKEEP_USER_ID_HEADER`, falling back to defaults.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            base_url: std::env::var("NOTEKEEP_API_URL").unwrap_or(base.base_url),
            timeout_seconds: std::env::var("NOTEKEEP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.timeout_seconds),
            user_id_header: std::env::var("NOTEKEEP_USER_ID_HEADER")
                .unwrap_or(base.user_id_header),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Absolute URL for an API path such as `/api/notes`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
