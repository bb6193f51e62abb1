#![allow(dead_code)]

use axum::Router;
use axum::routing::{get, post};
use axum_test::TestServer;
use std::net::SocketAddr;
use std::sync::Arc;

use shortly::api::handlers::{health_handler, redirect_handler, shorten_handler};
use shortly::application::services::{CodeAllocator, RateLimiter};
use shortly::infrastructure::store::MemoryStore;
use shortly::state::AppState;
use shortly::utils::domain_guard::DomainGuard;

pub const TEST_QUOTA: i64 = 5;
pub const BASE_URL: &str = "http://sho.rt";

pub struct TestContext {
    pub state: AppState,
    pub quota_store: Arc<MemoryStore>,
    pub code_store: Arc<MemoryStore>,
}

pub fn create_test_state() -> TestContext {
    create_test_state_with_quota(TEST_QUOTA)
}

pub fn create_test_state_with_quota(quota: i64) -> TestContext {
    let quota_store = Arc::new(MemoryStore::new());
    let code_store = Arc::new(MemoryStore::new());

    let state = AppState {
        rate_limiter: Arc::new(RateLimiter::new(quota_store.clone(), quota)),
        allocator: Arc::new(CodeAllocator::new(code_store.clone())),
        domain_guard: Arc::new(DomainGuard::new(
            BASE_URL,
            vec!["blocked.example".to_string()],
        )),
        base_url: BASE_URL.to_string(),
        behind_proxy: false,
    };

    TestContext {
        state,
        quota_store,
        code_store,
    }
}

/// Spins up a test server over a real HTTP transport so the shorten handler
/// sees a peer address for the quota key.
pub fn create_test_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/api/v1/shorten", post(shorten_handler))
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    TestServer::builder()
        .http_transport()
        .build(app.into_make_service_with_connect_info::<SocketAddr>())
        .unwrap()
}
