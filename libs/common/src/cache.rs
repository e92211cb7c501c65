//! Redis access for the session store
//!
//! Only the handful of string operations sessions need: write with expiry,
//! read while sliding the expiry forward, and delete.

use anyhow::{Context, Result};
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::{debug, info};

const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    /// Read `REDIS_URL`, falling back to a local instance
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        Ok(Self { url })
    }
}

/// Cloneable Redis handle
///
/// Opening the client only parses the URL; connections are made per call.
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())
            .with_context(|| format!("invalid Redis URL {}", config.url))?;
        info!("Redis client ready for {}", config.url);
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .context("failed to connect to Redis")
    }

    /// Store `value` under `key`, expiring after `ttl_seconds`
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    /// Read `key` and, if present, reset its expiry to `ttl_seconds`
    ///
    /// Both commands run in one MULTI/EXEC block.
    pub async fn get_and_refresh(&self, key: &str, ttl_seconds: u64) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);

        let (value, refreshed): (Option<String>, bool) = redis::pipe()
            .atomic()
            .get(key)
            .expire(key, ttl)
            .query_async(&mut conn)
            .await?;

        debug!("Read {} (expiry refreshed: {})", key, refreshed);
        Ok(value)
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    /// PING round trip
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection().await?;
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(reply == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_url() {
        let config = RedisConfig {
            url: "not a redis url".to_string(),
        };
        assert!(RedisPool::new(&config).is_err());
    }

    #[test]
    fn test_accepts_local_url() {
        let config = RedisConfig {
            url: DEFAULT_REDIS_URL.to_string(),
        };
        assert!(RedisPool::new(&config).is_ok());
    }
}
