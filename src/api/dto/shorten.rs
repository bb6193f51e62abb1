//! DTOs for the link shortening endpoint.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

/// Compiled regex for custom code validation.
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The target URL. A missing scheme is filled in with `http://`.
    #[validate(length(min = 1, message = "URL must not be empty"))]
    pub url: String,

    /// Optional custom short code (validated for length and characters).
    #[serde(default)]
    #[validate(length(min = 1, max = 32))]
    #[validate(regex(path = "*CUSTOM_CODE_REGEX"))]
    pub short: Option<String>,

    /// Requested lifetime in hours. Zero or missing selects the 24-hour default.
    #[serde(default)]
    pub expiry: u64,
}

/// Response for a successful allocation.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    /// The URL that was stored, after scheme enforcement.
    pub url: String,
    /// Full short link: configured public base URL + `/` + code.
    pub short: String,
    /// Effective lifetime in hours.
    pub expiry: u64,
    /// Allocations left in the client's current quota window.
    pub rate_left: i64,
    /// Minutes until the quota window resets.
    pub rate_limit_reset: u64,
}
