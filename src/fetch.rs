//! Async HTTP client for the upstream RC-search pages.
//!
//! Not a browser, just a single GET with a fixed browser-like header
//! set. No retries: a lookup either completes within the timeout or
//! fails.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Upstream host serving the RC-search pages.
pub const DEFAULT_BASE_URL: &str = "https://vahanx.in";

/// The upstream serves its mobile layout to this user agent; the
/// selectors downstream are written against that layout.
const UA: &str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 \
                  (KHTML, like Gecko) Chrome/138.0.0.0 Mobile Safari/537.36";
const REFERRER: &str = "https://vahanx.in/";
const LANGUAGES: &str = "en-US,en;q=0.9";

/// Outbound request timeout.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the fetch stage.
///
/// Fetching is the only fallible part of a lookup; extraction further
/// down is total and degrades to absent fields instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    /// The configured base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Client for fetching RC-search pages.
#[derive(Debug, Clone)]
pub struct PageClient {
    client: reqwest::Client,
    base_url: String,
}

impl PageClient {
    /// Create a client against the production host.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom host.
    ///
    /// Tests point this at a local mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(UA));
        headers.insert(REFERER, HeaderValue::from_static(REFERRER));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(LANGUAGES));

        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Build the lookup URL for a registration number.
    ///
    /// The RC goes in as an encoded path segment, so separators in the
    /// input cannot change the upstream route.
    fn lookup_url(&self, rc: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithoutBase)?
            .pop_if_empty()
            .extend(["rc-search", rc]);
        Ok(url)
    }

    /// Fetch the RC-search page for a registration number.
    ///
    /// Returns the raw HTML body. Non-2xx statuses are errors; there
    /// is exactly one attempt per lookup.
    pub async fn fetch_page(&self, rc: &str) -> Result<String> {
        let url = self.lookup_url(rc)?;
        tracing::debug!(%url, "fetching RC page");

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        Ok(resp.text().await?)
    }
}

impl Default for PageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PageClient::new();
        let _ = client;
    }

    #[test]
    fn test_lookup_url_plain() {
        let client = PageClient::with_base_url("https://vahanx.in");
        let url = client.lookup_url("MH12DE1433").unwrap();
        assert_eq!(url.as_str(), "https://vahanx.in/rc-search/MH12DE1433");
    }

    #[test]
    fn test_lookup_url_encodes_separators() {
        let client = PageClient::with_base_url("https://vahanx.in");
        let url = client.lookup_url("MH12/../admin").unwrap();
        assert_eq!(
            url.as_str(),
            "https://vahanx.in/rc-search/MH12%2F..%2Fadmin"
        );
    }

    #[test]
    fn test_lookup_url_custom_base() {
        let client = PageClient::with_base_url("http://127.0.0.1:9000");
        let url = client.lookup_url("KA01AB1234").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/rc-search/KA01AB1234");
    }

    #[test]
    fn test_error_display_includes_status() {
        let err = FetchError::Status { status: 503 };
        assert!(err.to_string().contains("503"));
    }
}
