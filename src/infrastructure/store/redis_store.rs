//! Redis-backed store implementations.

use super::service::{CodeStore, QuotaStore, StoreError, StoreResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Key prefix for quota counters. Never shared with [`CODE_PREFIX`].
const QUOTA_PREFIX: &str = "quota:";
/// Key prefix for code→URL mappings. Never shared with [`QUOTA_PREFIX`].
const CODE_PREFIX: &str = "code:";

/// Connects to Redis and validates the connection with a PING.
///
/// The returned [`ConnectionManager`] multiplexes one connection and is
/// cheap to clone; both store namespaces share it.
///
/// # Errors
///
/// Returns [`StoreError::ConnectionError`] if the URL is invalid, the
/// connection cannot be established, or the PING health check fails.
pub async fn connect(redis_url: &str) -> StoreResult<ConnectionManager> {
    info!("Connecting to Redis");

    let client = Client::open(redis_url).map_err(|e| {
        StoreError::ConnectionError(format!("Failed to create Redis client: {}", e))
    })?;

    let manager = ConnectionManager::new(client)
        .await
        .map_err(|e| StoreError::ConnectionError(format!("Failed to connect to Redis: {}", e)))?;

    let mut test_conn = manager.clone();
    test_conn
        .ping::<()>()
        .await
        .map_err(|e| StoreError::ConnectionError(format!("Redis PING failed: {}", e)))?;

    info!("✓ Connected to Redis");

    Ok(manager)
}

/// Redis implementation of the quota counter namespace.
pub struct RedisQuotaStore {
    client: ConnectionManager,
}

impl RedisQuotaStore {
    pub fn new(client: ConnectionManager) -> Self {
        Self { client }
    }

    fn build_key(&self, client_id: &str) -> String {
        format!("{}{}", QUOTA_PREFIX, client_id)
    }
}

#[async_trait]
impl QuotaStore for RedisQuotaStore {
    async fn get(&self, client_id: &str) -> StoreResult<Option<String>> {
        let key = self.build_key(client_id);
        let mut conn = self.client.clone();

        conn.get::<_, Option<String>>(&key)
            .await
            .map_err(|e| StoreError::OperationError(format!("GET {} failed: {}", key, e)))
    }

    async fn set(&self, client_id: &str, remaining: i64, window: Duration) -> StoreResult<()> {
        let key = self.build_key(client_id);
        let mut conn = self.client.clone();

        debug!(
            "Quota SET: {} -> {} (window: {}s)",
            key,
            remaining,
            window.as_secs()
        );

        conn.set_ex::<_, _, ()>(&key, remaining, window.as_secs())
            .await
            .map_err(|e| StoreError::OperationError(format!("SETEX {} failed: {}", key, e)))
    }

    async fn decrement(&self, client_id: &str) -> StoreResult<i64> {
        let key = self.build_key(client_id);
        let mut conn = self.client.clone();

        conn.decr::<_, _, i64>(&key, 1)
            .await
            .map_err(|e| StoreError::OperationError(format!("DECR {} failed: {}", key, e)))
    }

    async fn time_to_live(&self, client_id: &str) -> StoreResult<Option<Duration>> {
        let key = self.build_key(client_id);
        let mut conn = self.client.clone();

        let ttl = conn
            .ttl::<_, i64>(&key)
            .await
            .map_err(|e| StoreError::OperationError(format!("TTL {} failed: {}", key, e)))?;

        // -2 = key missing, -1 = key without expiry
        if ttl < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(ttl as u64)))
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}

/// Redis implementation of the code→URL mapping namespace.
pub struct RedisCodeStore {
    client: ConnectionManager,
}

impl RedisCodeStore {
    pub fn new(client: ConnectionManager) -> Self {
        Self { client }
    }

    fn build_key(&self, code: &str) -> String {
        format!("{}{}", CODE_PREFIX, code)
    }
}

#[async_trait]
impl CodeStore for RedisCodeStore {
    async fn get(&self, code: &str) -> StoreResult<Option<String>> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(url)) => {
                debug!("Code HIT: {} -> {}", code, url);
                Ok(Some(url))
            }
            Ok(None) => {
                debug!("Code MISS: {}", code);
                Ok(None)
            }
            Err(e) => Err(StoreError::OperationError(format!(
                "GET {} failed: {}",
                key, e
            ))),
        }
    }

    async fn set_if_absent(
        &self,
        code: &str,
        target_url: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        // SET key value NX EX seconds: nil reply means a live entry exists.
        let reply: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(target_url)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::OperationError(format!("SET NX {} failed: {}", key, e)))?;

        let written = reply.is_some();
        if written {
            debug!(
                "Code SET: {} -> {} (TTL: {}s)",
                code,
                target_url,
                ttl.as_secs()
            );
        }
        Ok(written)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
