//! In-process store implementation for tests and Redis-less development.

use super::service::{CodeStore, QuotaStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// A single-process TTL key-value store.
///
/// Implements both [`QuotaStore`] and [`CodeStore`] with the same expiry and
/// decrement semantics as the Redis implementations. Two instances give two
/// independent namespaces.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    fn write(&self, key: &str, value: String, ttl: Option<Duration>) {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );
    }
}

#[async_trait]
impl QuotaStore for MemoryStore {
    async fn get(&self, client_id: &str) -> StoreResult<Option<String>> {
        Ok(self.read(client_id))
    }

    async fn set(&self, client_id: &str, remaining: i64, window: Duration) -> StoreResult<()> {
        self.write(client_id, remaining.to_string(), Some(window));
        Ok(())
    }

    async fn decrement(&self, client_id: &str) -> StoreResult<i64> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");

        let (current, expires_at) = match entries.get(client_id) {
            Some(entry) if !entry.is_expired() => {
                let parsed = entry.value.parse::<i64>().map_err(|_| {
                    StoreError::OperationError(format!(
                        "value at {} is not an integer",
                        client_id
                    ))
                })?;
                (parsed, entry.expires_at)
            }
            // DECR on a missing key counts from zero and sets no expiry.
            _ => (0, None),
        };

        let next = current - 1;
        entries.insert(
            client_id.to_string(),
            Entry {
                value: next.to_string(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn time_to_live(&self, client_id: &str) -> StoreResult<Option<Duration>> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        Ok(entries.get(client_id).and_then(|entry| {
            entry
                .expires_at
                .map(|at| at.saturating_duration_since(Instant::now()))
                .filter(|d| !d.is_zero())
        }))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[async_trait]
impl CodeStore for MemoryStore {
    async fn get(&self, code: &str) -> StoreResult<Option<String>> {
        Ok(self.read(code))
    }

    async fn set_if_absent(
        &self,
        code: &str,
        target_url: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        if let Some(entry) = entries.get(code)
            && !entry.is_expired()
        {
            return Ok(false);
        }
        entries.insert(
            code.to_string(),
            Entry {
                value: target_url.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(true)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
