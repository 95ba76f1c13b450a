//! Server configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | `postgres://localhost/notekeep` |
//! | `HOST` / `PORT` | `0.0.0.0` / `5000` |
//! | `ALLOWED_ORIGINS` | `http://localhost:4200,http://localhost:3000` |
//! | `USER_ID_HEADER` | `x-user-id` |
//! | `RATE_LIMIT_ENABLED` | `true` |
//! | `RATE_LIMIT_REQUESTS` / `RATE_LIMIT_PERIOD_SECS` | `100` / `60` |
//! | `BODY_LIMIT_BYTES` | 1 MiB |
//!
//! Pool sizing comes from [`PoolConfig::from_env`].

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};

use notekeep_core::defaults;
use notekeep_core::{Error, Result};
use notekeep_db::PoolConfig;

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:4200,http://localhost:3000";

/// Global request quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub period: Duration,
}

impl RateLimitConfig {
    /// `requests` per `period_secs`, spread evenly over the period.
    ///
    /// Rejects quotas the limiter cannot express: zero requests, a zero
    /// period, or so many requests that the per-request interval rounds to zero.
    pub fn new(requests: u32, period_secs: u64) -> Result<Self> {
        if requests == 0 || period_secs == 0 {
            return Err(Error::Config(
                "RATE_LIMIT_REQUESTS and RATE_LIMIT_PERIOD_SECS must be non-zero".to_string(),
            ));
        }
        let period = Duration::from_secs(period_secs);
        if (period / requests).is_zero() {
            return Err(Error::Config(format!(
                "RATE_LIMIT_REQUESTS={} is too many for a {}s period",
                requests, period_secs
            )));
        }
        Ok(Self { requests, period })
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<HeaderValue>,
    /// Header carrying the authenticated caller id, set by the upstream gateway.
    pub user_id_header: HeaderName,
    /// `None` disables rate limiting.
    pub rate_limit: Option<RateLimitConfig>,
    pub body_limit_bytes: usize,
    pub pool: PoolConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            database_url: defaults::DATABASE_URL.to_string(),
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            allowed_origins: parse_allowed_origins(DEFAULT_ALLOWED_ORIGINS),
            user_id_header: HeaderName::from_static(defaults::USER_ID_HEADER),
            rate_limit: Some(RateLimitConfig {
                requests: defaults::RATE_LIMIT_REQUESTS,
                period: Duration::from_secs(defaults::RATE_LIMIT_PERIOD_SECS),
            }),
            body_limit_bytes: defaults::BODY_LIMIT_BYTES,
            pool: PoolConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let base = Self::default();

        let port = match std::env::var("PORT") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{}'", v)))?,
            Err(_) => base.port,
        };

        let user_id_header = match std::env::var("USER_ID_HEADER") {
            Ok(v) => HeaderName::from_bytes(v.trim().to_ascii_lowercase().as_bytes())
                .map_err(|_| Error::Config(format!("USER_ID_HEADER is not a header name: '{}'", v)))?,
            Err(_) => base.user_id_header,
        };

        let rate_limit_enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);
        let rate_limit = if rate_limit_enabled {
            let requests: u32 = env_parse("RATE_LIMIT_REQUESTS")?
                .unwrap_or(defaults::RATE_LIMIT_REQUESTS);
            let period_secs: u64 = env_parse("RATE_LIMIT_PERIOD_SECS")?
                .unwrap_or(defaults::RATE_LIMIT_PERIOD_SECS);
            Some(RateLimitConfig::new(requests, period_secs)?)
        } else {
            None
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(base.database_url),
            host: std::env::var("HOST").unwrap_or(base.host),
            port,
            allowed_origins: parse_allowed_origins(
                &std::env::var("ALLOWED_ORIGINS").unwrap_or_default(),
            ),
            user_id_header,
            rate_limit,
            body_limit_bytes: env_parse("BODY_LIMIT_BYTES")?.unwrap_or(base.body_limit_bytes),
            pool: PoolConfig::from_env(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", key, v))),
        Err(_) => Ok(None),
    }
}

/// Parse a comma-separated origin whitelist. Invalid entries are skipped;
/// an empty list falls back to the local development origins.
pub fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    let source = if origins.trim().is_empty() {
        DEFAULT_ALLOWED_ORIGINS
    } else {
        origins
    };

    source
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins() {
        let origins = parse_allowed_origins("https://notes.example.com, http://localhost:4200 ,");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://notes.example.com");
        assert_eq!(origins[1], "http://localhost:4200");
    }

    #[test]
    fn test_parse_allowed_origins_defaults_when_empty() {
        let origins = parse_allowed_origins("   ");
        assert_eq!(origins.len(), 2);
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.user_id_header.as_str(), "x-user-id");
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert!(config.rate_limit.is_some());
    }

    #[test]
    fn test_rate_limit_quota_must_be_expressible() {
        let quota = RateLimitConfig::new(100, 60).unwrap();
        assert_eq!(quota.period, Duration::from_secs(60));
        assert!(crate::middleware::rate_limit::build_limiter(quota).is_some());

        assert!(matches!(RateLimitConfig::new(0, 60), Err(Error::Config(_))));
        assert!(matches!(RateLimitConfig::new(100, 0), Err(Error::Config(_))));
        // a sub-nanosecond interval would leave the limiter unbuilt
        assert!(matches!(
            RateLimitConfig::new(u32::MAX, 1),
            Err(Error::Config(_))
        ));
        assert!(RateLimitConfig::new(1_000_000_000, 1).is_ok());
    }
}
