//! PostgreSQL pool setup and health reporting.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use notekeep_core::{Error, Result};

/// Pool sizing and timeouts.
///
/// Every request handler holds at most one connection at a time, so
/// `max_connections` is also the ceiling on concurrent note mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long `acquire` waits for a free connection.
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(30 * 60)),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `DB_MAX_CONNECTIONS`, `DB_MIN_CONNECTIONS` and
    /// `DB_CONNECT_TIMEOUT_SECS` when set. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(n) = env_parse::<u32>("DB_MAX_CONNECTIONS") {
            config = config.max_connections(n);
        }
        if let Some(n) = env_parse::<u32>("DB_MIN_CONNECTIONS") {
            config = config.min_connections(n);
        }
        if let Some(secs) = env_parse::<u64>("DB_CONNECT_TIMEOUT_SECS") {
            config = config.acquire_timeout(Duration::from_secs(secs));
        }
        config
    }

    /// At least one connection; `min_connections` is lowered to fit.
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n.max(1);
        self.min_connections = self.min_connections.min(self.max_connections);
        self
    }

    /// Capped at `max_connections`.
    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n.min(self.max_connections);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Connect with the default [`PoolConfig`].
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();
    info!(
        subsystem = "database",
        component = "pool",
        op = "create",
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        "Creating database connection pool"
    );

    let pool = config
        .options()
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    let stats = PoolStats::of(&pool);
    info!(
        subsystem = "database",
        component = "pool",
        op = "established",
        pool_size = stats.size,
        pool_idle = stats.idle,
        duration_ms = start.elapsed().as_millis() as u64,
        "Database connection pool established"
    );
    Ok(pool)
}

/// Point-in-time connection counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
}

impl PoolStats {
    pub fn of(pool: &PgPool) -> Self {
        Self {
            size: pool.size(),
            idle: pool.num_idle() as u32,
        }
    }

    /// Every open connection is checked out.
    pub fn is_saturated(&self) -> bool {
        self.size > 0 && self.idle == 0
    }
}

/// Log pool counts, warning when the pool is saturated.
pub fn log_pool_metrics(pool: &PgPool) -> PoolStats {
    let stats = PoolStats::of(pool);
    debug!(
        subsystem = "database",
        component = "pool",
        op = "metrics",
        pool_size = stats.size,
        pool_idle = stats.idle,
        "Pool health check"
    );
    if stats.is_saturated() {
        warn!(
            subsystem = "database",
            component = "pool",
            pool_size = stats.size,
            "Connection pool has no idle connections"
        );
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_lifetime, Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_builder_keeps_min_below_max() {
        let config = PoolConfig::new()
            .min_connections(5)
            .max_connections(3)
            .acquire_timeout(Duration::from_secs(60))
            .max_lifetime(None);

        assert_eq!(config.max_connections, 3);
        assert_eq!(config.min_connections, 3);
        assert_eq!(config.acquire_timeout, Duration::from_secs(60));
        assert!(config.max_lifetime.is_none());

        assert_eq!(PoolConfig::new().max_connections(0).max_connections, 1);
        assert_eq!(PoolConfig::new().min_connections(50).min_connections, 10);
    }

    #[test]
    fn test_saturation() {
        assert!(PoolStats { size: 4, idle: 0 }.is_saturated());
        assert!(!PoolStats { size: 4, idle: 1 }.is_saturated());
        assert!(!PoolStats { size: 0, idle: 0 }.is_saturated());
    }
}
