//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::services::{CodeAllocator, RateLimiter};
use crate::utils::domain_guard::DomainGuard;

/// Handles and settings shared by every request.
///
/// Cloned per request; all fields are cheap to clone. No mutable state
/// lives here — everything mutable is behind the store handles.
#[derive(Clone)]
pub struct AppState {
    pub rate_limiter: Arc<RateLimiter>,
    pub allocator: Arc<CodeAllocator>,
    pub domain_guard: Arc<DomainGuard>,
    /// Public prefix used to build full short links.
    pub base_url: String,
    /// When true, the client identity is read from forwarded headers.
    pub behind_proxy: bool,
}
