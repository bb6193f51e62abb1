//! Target-domain screening for shorten requests.

use url::Url;

/// Rejects target URLs pointing at the service itself or at blocklisted hosts.
///
/// Shortening the shortener's own domain would create redirect loops, so the
/// host of the configured public base URL is always refused, alongside any
/// explicitly configured blocklist entries.
pub struct DomainGuard {
    own_host: Option<String>,
    blocked: Vec<String>,
}

impl DomainGuard {
    /// Builds a guard from the public base URL and a blocklist.
    ///
    /// Hosts are compared case-insensitively with any `www.` prefix stripped.
    pub fn new(base_url: &str, blocked_domains: Vec<String>) -> Self {
        let own_host = Url::parse(base_url)
            .ok()
            .and_then(|u| u.host_str().map(canonical_host));

        let blocked = blocked_domains
            .iter()
            .map(|d| canonical_host(d.trim()))
            .filter(|d| !d.is_empty())
            .collect();

        Self { own_host, blocked }
    }

    /// Returns `true` when the URL's host must not be shortened.
    ///
    /// URLs that do not parse are not this guard's concern; they were
    /// already rejected by URL validation.
    pub fn is_blocked(&self, target_url: &str) -> bool {
        let Some(host) = Url::parse(target_url)
            .ok()
            .and_then(|u| u.host_str().map(canonical_host))
        else {
            return false;
        };

        if self.own_host.as_deref() == Some(host.as_str()) {
            return true;
        }

        self.blocked.iter().any(|b| b == &host)
    }
}

fn canonical_host(host: &str) -> String {
    let lowered = host.to_ascii_lowercase();
    lowered
        .strip_prefix("www.")
        .unwrap_or(&lowered)
        .to_string()
}
