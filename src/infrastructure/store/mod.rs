//! TTL key-value store layer backing quota counters and code mappings.
//!
//! Provides two traits with Redis-backed production implementations:
//! - [`QuotaStore`] - integer counters with a window TTL (rate limiting)
//! - [`CodeStore`] - code→URL mappings with per-entry expiry
//!
//! [`MemoryStore`] implements both for tests and Redis-less development.

mod memory_store;
mod redis_store;
mod service;

pub use memory_store::MemoryStore;
pub use redis_store::{RedisCodeStore, RedisQuotaStore, connect};
pub use service::{CodeStore, QuotaStore, StoreError, StoreResult};

#[cfg(test)]
pub use service::{MockCodeStore, MockQuotaStore};
