//! Store traits and error types for the two TTL key-value namespaces.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Store connection error: {}", e),
            Self::OperationError(e) => write!(f, "Store operation error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for the per-client quota counter namespace.
///
/// Values are integers with a window TTL. `decrement` must be atomic so the
/// aggregate count stays correct under concurrent requests from one client.
/// Unlike a cache, failures are fail-closed: every error propagates so the
/// caller can surface an infrastructure error instead of silently admitting.
///
/// # Implementations
///
/// - [`crate::infrastructure::store::RedisQuotaStore`] - Redis-backed counters
/// - [`crate::infrastructure::store::MemoryStore`] - in-process store for tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Returns the raw counter value for a client, or `None` when the key
    /// is absent or its window has expired.
    ///
    /// The value is returned unparsed; interpreting (and repairing) it is
    /// the rate limiter's job.
    async fn get(&self, client_id: &str) -> StoreResult<Option<String>>;

    /// Seeds the counter to `remaining` with a fresh `window` TTL.
    async fn set(&self, client_id: &str, remaining: i64, window: Duration) -> StoreResult<()>;

    /// Atomically decrements the counter by one and returns the new value.
    ///
    /// Follows Redis `DECR` semantics: a missing key counts from zero.
    async fn decrement(&self, client_id: &str) -> StoreResult<i64>;

    /// Returns the residual window TTL, or `None` when the key is absent
    /// or carries no expiry.
    async fn time_to_live(&self, client_id: &str) -> StoreResult<Option<Duration>>;

    /// Checks if the store backend is reachable.
    async fn health_check(&self) -> bool;
}

/// Trait for the code→URL mapping namespace.
///
/// Entries are immutable once written and disappear only through TTL expiry.
///
/// # Implementations
///
/// - [`crate::infrastructure::store::RedisCodeStore`] - Redis-backed mappings
/// - [`crate::infrastructure::store::MemoryStore`] - in-process store for tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Returns the target URL for a code, or `None` when the code is absent
    /// or expired.
    async fn get(&self, code: &str) -> StoreResult<Option<String>>;

    /// Stores `code → target_url` with the given TTL only if no live entry
    /// exists for the code.
    ///
    /// Returns `true` when the mapping was written, `false` on collision.
    /// The check and the write are a single atomic operation, so allocation
    /// decisions never race between two round trips.
    async fn set_if_absent(
        &self,
        code: &str,
        target_url: &str,
        ttl: Duration,
    ) -> StoreResult<bool>;

    /// Checks if the store backend is reachable.
    async fn health_check(&self) -> bool;
}
