//! Redirect target validation.
//!
//! User-supplied `next` values and `Referer` headers are only followed when
//! they stay on this site: a rooted relative path, or an absolute http(s) URL
//! whose authority is the request's own host or a configured allowed host.

use url::{form_urlencoded, Url};

/// Path of the book catalogue, the fallback for every redirect
pub const CATALOGUE_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Default)]
pub struct RedirectPolicy {
    /// Extra hosts (optionally with port) accepted in absolute URLs
    allowed_hosts: Vec<String>,
}

impl RedirectPolicy {
    pub fn new(allowed_hosts: Vec<String>) -> Self {
        Self {
            allowed_hosts: allowed_hosts
                .into_iter()
                .map(|host| host.trim().to_ascii_lowercase())
                .filter(|host| !host.is_empty())
                .collect(),
        }
    }

    /// True when redirecting to `target` keeps the user on an allowed host
    pub fn is_safe(&self, target: &str, request_host: Option<&str>) -> bool {
        if target.is_empty() || target.chars().any(|c| c.is_control() || c == '\\') {
            return false;
        }

        if target.starts_with('/') {
            // "//host" is scheme-relative and leaves the site
            return !target.starts_with("//");
        }

        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(_) => return false,
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        if !url.username().is_empty() || url.password().is_some() {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
        .to_ascii_lowercase();

        let request_host = request_host.map(str::to_ascii_lowercase);
        request_host.as_deref() == Some(authority.as_str())
            || self.allowed_hosts.iter().any(|allowed| *allowed == authority)
    }

    /// The first candidate if it is safe, otherwise `fallback`
    pub fn resolve(&self, candidate: Option<&str>, request_host: Option<&str>, fallback: &str) -> String {
        match candidate.map(str::trim) {
            Some(target) if self.is_safe(target, request_host) => target.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Login page URL that returns to `next` after a successful login
pub fn login_url(next: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{}?next={}", LOGIN_PATH, encoded)
}
