//! Client identity extraction from the connection and request headers.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Determines the client identity used as the quota key.
///
/// By default this is the peer socket address. When `behind_proxy` is
/// enabled, `X-Forwarded-For` (first hop) and `X-Real-IP` take precedence;
/// enable that only when the service runs behind a trusted reverse proxy,
/// since the headers are otherwise caller-controlled.
///
/// Falls back to `"unknown"` when no peer address is available.
pub fn client_ip(headers: &HeaderMap, addr: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy {
        if let Some(forwarded) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }

        if let Some(real_ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return real_ip.to_string();
        }
    }

    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.1:50000".parse().unwrap())
    }

    #[test]
    fn test_peer_address_by_default() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, peer(), false), "10.0.0.1");
    }

    #[test]
    fn test_forwarded_header_ignored_without_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));

        assert_eq!(client_ip(&headers, peer(), false), "10.0.0.1");
    }

    #[test]
    fn test_forwarded_header_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 10.0.0.1"),
        );

        assert_eq!(client_ip(&headers, peer(), true), "1.2.3.4");
    }

    #[test]
    fn test_real_ip_fallback_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("5.6.7.8"));

        assert_eq!(client_ip(&headers, peer(), true), "5.6.7.8");
    }

    #[test]
    fn test_behind_proxy_without_headers_uses_peer() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, peer(), true), "10.0.0.1");
    }

    #[test]
    fn test_no_peer_address() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, None, false), "unknown");
    }
}
