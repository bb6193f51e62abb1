//! Application error taxonomy and HTTP mapping.
//!
//! Every failure a handler can produce is an [`AppError`] variant with a
//! machine-distinguishable `code` and a JSON `details` payload. The only
//! condition that is never surfaced is a corrupted quota counter, which the
//! rate limiter repairs in place.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

#[derive(Debug)]
pub enum AppError {
    /// Malformed payload, invalid URL, or invalid custom code (400).
    Validation { message: String, details: Value },
    /// Requested or generated code is already live in the store (403).
    CodeTaken { message: String, details: Value },
    /// Unknown or expired short code (404).
    NotFound { message: String, details: Value },
    /// Target host is the service itself or on the blocklist (503).
    DomainBlocked { message: String, details: Value },
    /// Quota exhausted; carries the time until the window resets (503).
    RateLimited { reset: Duration },
    /// Quota store unreachable; the request was never admitted (503).
    Unavailable { message: String, details: Value },
    /// Code store write failed or another backend fault (500).
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn code_taken(message: impl Into<String>, details: Value) -> Self {
        Self::CodeTaken {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn domain_blocked(message: impl Into<String>, details: Value) -> Self {
        Self::DomainBlocked {
            message: message.into(),
            details,
        }
    }
    pub fn rate_limited(reset: Duration) -> Self {
        Self::RateLimited { reset }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Converts a residual window TTL into whole minutes for responses.
    ///
    /// Rounds up so a live window never reports a zero reset time.
    pub fn reset_minutes(reset: Duration) -> u64 {
        reset.as_secs().div_ceil(60)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { message, .. }
            | Self::CodeTaken { message, .. }
            | Self::NotFound { message, .. }
            | Self::DomainBlocked { message, .. }
            | Self::Unavailable { message, .. }
            | Self::Internal { message, .. } => write!(f, "{}", message),
            Self::RateLimited { reset } => write!(
                f,
                "Rate limit exceeded, resets in {} minute(s)",
                Self::reset_minutes(*reset)
            ),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::CodeTaken { message, details } => {
                (StatusCode::FORBIDDEN, "code_taken", message, details)
            }
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::DomainBlocked { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "domain_blocked",
                message,
                details,
            ),
            AppError::RateLimited { reset } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "rate_limited",
                "Rate limit exceeded".to_string(),
                json!({ "rate_limit_reset": Self::reset_minutes(reset) }),
            ),
            AppError::Unavailable { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                message,
                details,
            ),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::bad_request(
            "Request validation failed",
            serde_json::to_value(&errors).unwrap_or_else(|_| json!({})),
        )
    }
}
