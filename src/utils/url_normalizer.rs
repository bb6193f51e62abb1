//! URL validation and scheme enforcement.
//!
//! Target URLs are stored the way the caller sent them, except that a
//! missing scheme is filled in with `http://`. A stored URL therefore
//! resolves back byte-for-byte, which full canonicalization would break.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,
}

/// Validates a target URL and enforces an explicit scheme.
///
/// # Rules
///
/// 1. Inputs without a scheme get `http://` prepended
/// 2. Only HTTP and HTTPS are allowed; `javascript:`, `data:`, `file:` and
///    friends are rejected
/// 3. The URL must parse and carry a host
/// 4. Everything else (case, ports, fragments, query) is preserved verbatim
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for unparseable URLs.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("example.com").unwrap(), "http://example.com");
/// assert_eq!(normalize_url("http://example.com").unwrap(), "http://example.com");
/// assert!(normalize_url("ftp://example.com").is_err());
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("http://{}", input)
    };

    let url =
        Url::parse(&candidate).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if url.host_str().is_none() {
        return Err(UrlNormalizationError::InvalidFormat(
            "URL has no host".to_string(),
        ));
    }

    Ok(candidate)
}
