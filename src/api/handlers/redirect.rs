//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Looks the code up in the code store and answers with a
/// `307 Temporary Redirect` to the stored URL, byte-for-byte as it was
/// allocated. Expired codes read as absent.
///
/// # Errors
///
/// Returns 404 Not Found for unknown or expired codes and 500 when the
/// store cannot be read.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let target_url = state.allocator.resolve(&code).await?;

    debug!("Redirecting {} -> {}", code, target_url);

    Ok(Redirect::temporary(&target_url))
}
