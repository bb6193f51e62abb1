//! HTTP server initialization and runtime setup.
//!
//! Handles store connections, service wiring, and Axum server lifecycle.

use crate::application::services::{CodeAllocator, RateLimiter};
use crate::config::Config;
use crate::infrastructure::store::{self, RedisCodeStore, RedisQuotaStore};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::domain_guard::DomainGuard;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use redis::aio::ConnectionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Redis connection (with bounded retry/backoff)
/// - Quota and code stores over the shared connection
/// - Rate limiter and code allocator services
/// - Axum HTTP server with graceful shutdown on SIGINT
///
/// # Errors
///
/// Returns an error if:
/// - Redis is unreachable after all retries
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let manager = connect_with_retry(&config.redis_url).await?;

    let quota_store = Arc::new(RedisQuotaStore::new(manager.clone()));
    let code_store = Arc::new(RedisCodeStore::new(manager));

    let rate_limiter = Arc::new(RateLimiter::new(quota_store, config.default_quota));
    let allocator = Arc::new(CodeAllocator::new(code_store));
    let domain_guard = Arc::new(DomainGuard::new(
        &config.base_url,
        config.blocked_domains.clone(),
    ));

    let state = AppState {
        rate_limiter,
        allocator,
        domain_guard,
        base_url: config.base_url.clone(),
        behind_proxy: config.behind_proxy,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Connects to Redis, retrying with exponential backoff.
///
/// Five attempts starting at 200ms; a store that is still down afterwards
/// fails startup rather than serving requests that cannot be admitted.
async fn connect_with_retry(redis_url: &str) -> Result<ConnectionManager> {
    let strategy = ExponentialBackoff::from_millis(200).factor(2).take(5);

    let manager = Retry::spawn(strategy, || async {
        match store::connect(redis_url).await {
            Ok(manager) => Ok(manager),
            Err(e) => {
                tracing::warn!("Redis connection attempt failed: {}", e);
                Err(e)
            }
        }
    })
    .await?;

    Ok(manager)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown signal handler: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
