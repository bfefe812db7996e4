//! Download link resolution
//!
//! The page's download links point at an obfuscation endpoint that answers
//! with either a redirect or a `Link` header naming the real file. One
//! non-following GET is issued per link and the target is normalized with
//! its tracking query string removed.
//!
//! Resolution is best effort: every failure yields an empty string.

use super::track::LinkRef;
use crate::Result;
use hype_common::config::HttpConfig;
use reqwest::header::{LINK, LOCATION};
use reqwest::{redirect, StatusCode, Url};
use tracing::{debug, warn};

/// Resolves obfuscated download references to canonical URLs
#[derive(Clone)]
pub struct LinkResolver {
    http_client: reqwest::Client,
}

impl LinkResolver {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self { http_client })
    }

    /// Canonical URL behind `link`, or `""` if none can be derived
    pub async fn resolve(&self, link: &LinkRef) -> String {
        let response = match self.http_client.get(&link.href).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Link request for {} failed: {}", link.label, e);
                return String::new();
            }
        };

        let headers = response.headers();
        let location = headers.get(LOCATION).and_then(|v| v.to_str().ok());
        let link_header = headers.get(LINK).and_then(|v| v.to_str().ok());

        let resolved = canonical_href(response.status(), location, link_header);
        if resolved.is_empty() {
            debug!("No download URL for {} ({})", link.label, response.status());
        }
        resolved
    }
}

/// Derive the canonical URL from one response's status and headers
///
/// A 3xx status takes the `Location` header; anything else falls back to the
/// first `Link` header entry (`<url>; rel=...`).
pub fn canonical_href(status: StatusCode, location: Option<&str>, link: Option<&str>) -> String {
    let candidate = if status.is_redirection() {
        location
    } else {
        link.and_then(link_target)
    };

    candidate.map(strip_query).unwrap_or_default()
}

/// URL part of a `Link` header value
fn link_target(header: &str) -> Option<&str> {
    let first = header.split(';').next()?.trim();
    let first = first.strip_prefix('<').unwrap_or(first);
    Some(first.strip_suffix('>').unwrap_or(first))
}

/// Normalized absolute URL with the query removed; `""` if not a valid URL
fn strip_query(href: &str) -> String {
    match Url::parse(href.trim()) {
        Ok(mut url) => {
            url.set_query(None);
            url.to_string()
        }
        Err(_) => String::new(),
    }
}
