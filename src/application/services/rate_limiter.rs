//! Per-client admission control over the quota store.

use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::infrastructure::store::QuotaStore;
use serde_json::json;
use tracing::warn;

/// Fixed quota window. A client's counter expires this long after seeding,
/// at which point the next request starts a fresh window.
pub const QUOTA_WINDOW: Duration = Duration::from_secs(30 * 60);

/// Outcome of an admission check.
#[derive(Debug, PartialEq, Eq)]
pub enum Admission {
    /// The client may proceed; `remaining` is the quota before this request
    /// consumes anything.
    Admitted { remaining: i64 },
    /// The quota is exhausted; `reset` is the time until the window expires.
    Denied { reset: Duration },
}

/// Remaining quota and reset time reported after a consumed request.
#[derive(Debug, Clone, Copy)]
pub struct QuotaStatus {
    pub remaining: i64,
    pub reset: Duration,
}

/// Service deciding whether a client may allocate another short code.
///
/// Owns the quota namespace exclusively. Counters are created lazily on the
/// first observation of a client, decremented once per successful
/// allocation, and reset by natural window expiry.
pub struct RateLimiter {
    store: Arc<dyn QuotaStore>,
    default_quota: i64,
}

impl RateLimiter {
    /// Creates a rate limiter over an injected quota store handle.
    pub fn new(store: Arc<dyn QuotaStore>, default_quota: i64) -> Self {
        Self {
            store,
            default_quota,
        }
    }

    /// Decides whether `client_id` may proceed with an allocation.
    ///
    /// Seeds the counter with the default quota on first observation and
    /// after window expiry. A counter holding a non-integer value is
    /// repaired by reseeding rather than surfaced as an error.
    ///
    /// Admission never consumes quota; [`Self::commit`] does, and only the
    /// orchestrator calls it, after the allocation has actually succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] when the store cannot be reached.
    /// Store failure is never treated as an admission.
    pub async fn admit(&self, client_id: &str) -> Result<Admission, AppError> {
        let raw = self
            .store
            .get(client_id)
            .await
            .map_err(store_unavailable)?;

        let Some(raw) = raw else {
            return self.seed(client_id).await;
        };

        match raw.trim().parse::<i64>() {
            Err(_) => {
                warn!(client = client_id, value = %raw, "repairing corrupted quota counter");
                self.seed(client_id).await
            }
            Ok(remaining) if remaining <= 0 => {
                let reset = self
                    .store
                    .time_to_live(client_id)
                    .await
                    .map_err(store_unavailable)?
                    .unwrap_or(QUOTA_WINDOW);
                Ok(Admission::Denied { reset })
            }
            Ok(remaining) => Ok(Admission::Admitted { remaining }),
        }
    }

    /// Consumes one unit of quota after a confirmed successful allocation.
    ///
    /// Returns the remaining quota (clamped at zero for reporting) and the
    /// residual window TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] when the store cannot be reached.
    pub async fn commit(&self, client_id: &str) -> Result<QuotaStatus, AppError> {
        let remaining = self
            .store
            .decrement(client_id)
            .await
            .map_err(store_unavailable)?;

        let reset = self
            .store
            .time_to_live(client_id)
            .await
            .map_err(store_unavailable)?
            .unwrap_or_default();

        Ok(QuotaStatus {
            remaining: remaining.max(0),
            reset,
        })
    }

    /// Reports whether the quota store answers a health ping.
    pub async fn store_healthy(&self) -> bool {
        self.store.health_check().await
    }

    async fn seed(&self, client_id: &str) -> Result<Admission, AppError> {
        self.store
            .set(client_id, self.default_quota, QUOTA_WINDOW)
            .await
            .map_err(store_unavailable)?;

        Ok(Admission::Admitted {
            remaining: self.default_quota,
        })
    }
}

fn store_unavailable(e: crate::infrastructure::store::StoreError) -> AppError {
    AppError::unavailable("Quota store unavailable", json!({ "reason": e.to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::{MemoryStore, MockQuotaStore, StoreError};
    use mockall::predicate::eq;

    const QUOTA: i64 = 10;

    fn limiter_with(store: MockQuotaStore) -> RateLimiter {
        RateLimiter::new(Arc::new(store), QUOTA)
    }

    #[tokio::test]
    async fn test_first_admit_seeds_default_quota() {
        let mut store = MockQuotaStore::new();
        store
            .expect_get()
            .with(eq("1.2.3.4"))
            .times(1)
            .returning(|_| Ok(None));
        store
            .expect_set()
            .with(eq("1.2.3.4"), eq(QUOTA), eq(QUOTA_WINDOW))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let admission = limiter_with(store).admit("1.2.3.4").await.unwrap();

        assert_eq!(admission, Admission::Admitted { remaining: QUOTA });
    }

    #[tokio::test]
    async fn test_corrupted_counter_is_reseeded() {
        let mut store = MockQuotaStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some("garbage".to_string())));
        store
            .expect_set()
            .with(eq("1.2.3.4"), eq(QUOTA), eq(QUOTA_WINDOW))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let admission = limiter_with(store).admit("1.2.3.4").await.unwrap();

        assert_eq!(admission, Admission::Admitted { remaining: QUOTA });
    }

    #[tokio::test]
    async fn test_exhausted_quota_is_denied_with_reset() {
        let mut store = MockQuotaStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some("0".to_string())));
        store
            .expect_time_to_live()
            .times(1)
            .returning(|_| Ok(Some(Duration::from_secs(600))));
        store.expect_decrement().times(0);

        let admission = limiter_with(store).admit("1.2.3.4").await.unwrap();

        match admission {
            Admission::Denied { reset } => {
                assert!(reset > Duration::ZERO);
                assert!(reset <= QUOTA_WINDOW);
            }
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_negative_counter_is_denied() {
        let mut store = MockQuotaStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some("-2".to_string())));
        store
            .expect_time_to_live()
            .times(1)
            .returning(|_| Ok(Some(Duration::from_secs(60))));

        let admission = limiter_with(store).admit("1.2.3.4").await.unwrap();

        assert!(matches!(admission, Admission::Denied { .. }));
    }

    #[tokio::test]
    async fn test_admit_does_not_decrement() {
        let mut store = MockQuotaStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some("5".to_string())));
        store.expect_decrement().times(0);

        let admission = limiter_with(store).admit("1.2.3.4").await.unwrap();

        assert_eq!(admission, Admission::Admitted { remaining: 5 });
    }

    #[tokio::test]
    async fn test_denied_without_ttl_reports_full_window() {
        let mut store = MockQuotaStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some("0".to_string())));
        store.expect_time_to_live().times(1).returning(|_| Ok(None));

        let admission = limiter_with(store).admit("1.2.3.4").await.unwrap();

        assert_eq!(
            admission,
            Admission::Denied {
                reset: QUOTA_WINDOW
            }
        );
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_unavailable() {
        let mut store = MockQuotaStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Err(StoreError::ConnectionError("refused".to_string())));

        let err = limiter_with(store).admit("1.2.3.4").await.unwrap_err();

        assert!(matches!(err, AppError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_commit_counts_down_against_real_store() {
        let store = Arc::new(MemoryStore::new());
        let limiter = RateLimiter::new(store, 3);

        // Seed via first admission, then consume the whole window.
        assert_eq!(
            limiter.admit("client").await.unwrap(),
            Admission::Admitted { remaining: 3 }
        );

        for expected in [2, 1, 0] {
            match limiter.admit("client").await.unwrap() {
                Admission::Admitted { .. } => {}
                other => panic!("expected admission, got {:?}", other),
            }
            let status = limiter.commit("client").await.unwrap();
            assert_eq!(status.remaining, expected);
            assert!(status.reset <= QUOTA_WINDOW);
        }

        // Quota gone: denial, repeatedly, without further decrement.
        for _ in 0..2 {
            assert!(matches!(
                limiter.admit("client").await.unwrap(),
                Admission::Denied { .. }
            ));
        }
    }

    #[tokio::test]
    async fn test_commit_clamps_reported_remaining_at_zero() {
        let mut store = MockQuotaStore::new();
        store.expect_decrement().times(1).returning(|_| Ok(-1));
        store
            .expect_time_to_live()
            .times(1)
            .returning(|_| Ok(Some(Duration::from_secs(60))));

        let status = limiter_with(store).commit("1.2.3.4").await.unwrap();

        assert_eq!(status.remaining, 0);
    }
}
