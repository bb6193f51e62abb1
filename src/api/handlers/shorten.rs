//! Handler for the link shortening endpoint.

use axum::{Json, extract::ConnectInfo, extract::State, http::HeaderMap};
use serde_json::json;
use std::net::SocketAddr;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::services::rate_limiter::Admission;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::code_generator::validate_custom_code;
use crate::utils::url_normalizer::normalize_url;

/// Allocates a short code for a target URL.
///
/// # Endpoint
///
/// `POST /api/v1/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "short": "my-link",   // optional
///   "expiry": 48          // optional, hours
/// }
/// ```
///
/// # Sequence
///
/// 1. Payload validation (400 on failure)
/// 2. Quota admission for the client identity (503 when exhausted, with
///    reset minutes; 503 when the quota store is unreachable)
/// 3. URL validation and scheme enforcement (400)
/// 4. Domain guard (503 with a domain-rejection code)
/// 5. Custom code validation when one was requested (400)
/// 6. Code allocation (403 on collision, 500 on store write failure)
/// 7. Quota consumption — only after the allocation succeeded, so a failed
///    allocation never costs quota
///
/// # Response
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "short": "http://sho.rt/abc123",
///   "expiry": 48,
///   "rate_left": 9,
///   "rate_limit_reset": 30
/// }
/// ```
pub async fn shorten_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let client = client_ip(&headers, Some(addr), state.behind_proxy);

    let admission = state.rate_limiter.admit(&client).await?;
    if let Admission::Denied { reset } = admission {
        return Err(AppError::rate_limited(reset));
    }

    let target_url = normalize_url(&payload.url)
        .map_err(|e| AppError::bad_request("Invalid URL", json!({ "reason": e.to_string() })))?;

    if state.domain_guard.is_blocked(&target_url) {
        return Err(AppError::domain_blocked(
            "This domain cannot be shortened",
            json!({ "url": target_url }),
        ));
    }

    if let Some(code) = payload.short.as_deref() {
        validate_custom_code(code)?;
    }

    let allocation = state
        .allocator
        .allocate(&target_url, payload.short.as_deref(), payload.expiry)
        .await?;

    let quota = state.rate_limiter.commit(&client).await?;

    Ok(Json(ShortenResponse {
        short: format!(
            "{}/{}",
            state.base_url.trim_end_matches('/'),
            allocation.code
        ),
        url: allocation.target_url,
        expiry: allocation.ttl_hours,
        rate_left: quota.remaining,
        rate_limit_reset: AppError::reset_minutes(quota.reset),
    }))
}
