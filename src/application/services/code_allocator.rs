//! Short code allocation and resolution over the code store.

use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::infrastructure::store::CodeStore;
use crate::utils::code_generator::generate_code;
use serde_json::json;

/// Mapping lifetime applied when the caller does not request one.
pub const DEFAULT_TTL_HOURS: u64 = 24;

/// A successfully stored code→URL mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub code: String,
    pub target_url: String,
    /// Effective lifetime in hours, after defaulting.
    pub ttl_hours: u64,
}

/// Service turning a validated URL into a resolvable short code.
///
/// Owns the code namespace exclusively. Mappings are immutable once written
/// and removed only by store expiry; a live code is never overwritten.
pub struct CodeAllocator {
    store: Arc<dyn CodeStore>,
}

impl CodeAllocator {
    /// Creates an allocator over an injected code store handle.
    pub fn new(store: Arc<dyn CodeStore>) -> Self {
        Self { store }
    }

    /// Allocates a short code for `target_url`.
    ///
    /// A non-empty `requested_code` is used verbatim; otherwise a random
    /// 6-character candidate is generated. `ttl_hours == 0` selects the
    /// 24-hour default. The candidate is persisted with the store's atomic
    /// set-if-absent, which doubles as the collision check.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeTaken`] when a live mapping already exists
    /// for the candidate, and [`AppError::Internal`] when the store write
    /// fails.
    pub async fn allocate(
        &self,
        target_url: &str,
        requested_code: Option<&str>,
        ttl_hours: u64,
    ) -> Result<Allocation, AppError> {
        let code = match requested_code {
            Some(requested) if !requested.is_empty() => requested.to_string(),
            _ => generate_code(),
        };

        let ttl_hours = if ttl_hours == 0 {
            DEFAULT_TTL_HOURS
        } else {
            ttl_hours
        };
        let ttl = Duration::from_secs(ttl_hours.saturating_mul(3600));

        let written = self
            .store
            .set_if_absent(&code, target_url, ttl)
            .await
            .map_err(|e| {
                AppError::internal(
                    "Failed to store short code",
                    json!({ "reason": e.to_string() }),
                )
            })?;

        if !written {
            return Err(AppError::code_taken(
                "Short code already in use",
                json!({ "code": code }),
            ));
        }

        Ok(Allocation {
            code,
            target_url: target_url.to_string(),
            ttl_hours,
        })
    }

    /// Reports whether the code store answers a health ping.
    pub async fn store_healthy(&self) -> bool {
        self.store.health_check().await
    }

    /// Resolves a short code to its target URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown or expired codes and
    /// [`AppError::Internal`] when the store cannot be read.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        self.store
            .get(code)
            .await
            .map_err(|e| {
                AppError::internal(
                    "Failed to look up short code",
                    json!({ "reason": e.to_string() }),
                )
            })?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::{MemoryStore, MockCodeStore, StoreError};
    use crate::utils::code_generator::CODE_LENGTH;

    fn allocator() -> CodeAllocator {
        CodeAllocator::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_custom_code_used_verbatim() {
        let allocation = allocator()
            .allocate("http://example.com", Some("abc123"), 0)
            .await
            .unwrap();

        assert_eq!(allocation.code, "abc123");
        assert_eq!(allocation.target_url, "http://example.com");
    }

    #[tokio::test]
    async fn test_missing_code_generates_candidate() {
        let allocation = allocator()
            .allocate("http://example.com", None, 0)
            .await
            .unwrap();

        assert_eq!(allocation.code.len(), CODE_LENGTH);
    }

    #[tokio::test]
    async fn test_empty_code_generates_candidate() {
        let allocation = allocator()
            .allocate("http://example.com", Some(""), 0)
            .await
            .unwrap();

        assert_eq!(allocation.code.len(), CODE_LENGTH);
    }

    #[tokio::test]
    async fn test_zero_expiry_defaults_to_24_hours() {
        let allocation = allocator()
            .allocate("http://example.com", Some("abc123"), 0)
            .await
            .unwrap();

        assert_eq!(allocation.ttl_hours, DEFAULT_TTL_HOURS);
    }

    #[tokio::test]
    async fn test_requested_expiry_is_kept() {
        let allocation = allocator()
            .allocate("http://example.com", Some("abc123"), 48)
            .await
            .unwrap();

        assert_eq!(allocation.ttl_hours, 48);
    }

    #[tokio::test]
    async fn test_second_allocation_of_same_code_is_rejected() {
        let allocator = allocator();

        allocator
            .allocate("http://example.com", Some("abc123"), 0)
            .await
            .unwrap();

        let err = allocator
            .allocate("http://other.com", Some("abc123"), 0)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::CodeTaken { .. }));

        // The original mapping is untouched.
        let resolved = allocator.resolve("abc123").await.unwrap();
        assert_eq!(resolved, "http://example.com");
    }

    #[tokio::test]
    async fn test_allocate_then_resolve_roundtrip() {
        let allocator = allocator();

        let allocation = allocator
            .allocate("http://example.com", None, 0)
            .await
            .unwrap();

        let resolved = allocator.resolve(&allocation.code).await.unwrap();
        assert_eq!(resolved, "http://example.com");
    }

    #[tokio::test]
    async fn test_resolve_unknown_code() {
        let err = allocator().resolve("nosuch").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_expired_code() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_if_absent("gone00", "http://example.com", Duration::from_millis(5))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let allocator = CodeAllocator::new(store);
        let err = allocator.resolve("gone00").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_store_write_failure_is_internal() {
        let mut store = MockCodeStore::new();
        store
            .expect_set_if_absent()
            .times(1)
            .returning(|_, _, _| Err(StoreError::OperationError("write failed".to_string())));

        let allocator = CodeAllocator::new(Arc::new(store));
        let err = allocator
            .allocate("http://example.com", Some("abc123"), 0)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }
}
