use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::feed::signature::declares_feed_type;

const MAX_REDIRECTS: usize = 10;

/// Errors that can occur while fetching a single URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, redirect loop, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request and body read together exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Response body exceeded the configured size limit
    #[error("Response too large (exceeds {0} bytes)")]
    TooLarge(usize),
}

impl FetchError {
    /// Transport failures are worth another attempt; an oversized body is not.
    pub(crate) fn is_transient(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Timeout(_))
    }
}

/// HTTP settings shared by every request of a run.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub user_agent: String,
    pub timeout: Duration,
    /// Total attempts per URL, including the first one.
    pub attempts: u32,
    pub retry_delay: Duration,
    pub max_body_bytes: usize,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Config::default().fetch_policy()
    }
}

/// A fetched response, reduced to what the feed heuristics look at.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code; non-2xx responses are still pages
    pub status: u16,
    /// Lower-cased `Content-Type` header, empty when absent
    pub content_type: String,
    /// Body decoded as UTF-8 (lossy), without a leading BOM
    pub body: String,
}

impl Page {
    /// True when the `Content-Type` mentions xml, rss or atom.
    pub fn declares_feed_type(&self) -> bool {
        declares_feed_type(&self.content_type)
    }

    /// True when the response is served as HTML or the body contains `<html`.
    pub fn looks_like_html(&self) -> bool {
        self.content_type.contains("text/html") || self.body.to_lowercase().contains("<html")
    }
}

/// Retrying HTTP GET helper.
///
/// Every request carries the configured `User-Agent` and `Accept: */*`,
/// follows up to 10 redirects, and is bounded by the policy timeout. Transport
/// errors are retried up to `attempts` times with a fixed pause in between.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    policy: FetchPolicy,
}

impl Fetcher {
    /// Builds the HTTP client for `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the client cannot be built (for
    /// example, a user agent that is not a valid header value).
    pub fn new(policy: FetchPolicy) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let client = reqwest::Client::builder()
            .user_agent(policy.user_agent.as_str())
            .default_headers(headers)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client, policy })
    }

    /// Fetches `url`, retrying transport failures.
    ///
    /// Any HTTP status counts as a successful fetch. After the last failed
    /// attempt the error of that attempt is returned.
    pub async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let mut attempt: u32 = 1;

        loop {
            match self.fetch_once(url).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && attempt < self.policy.attempts => {
                    tracing::debug!(
                        url = %url,
                        attempt = attempt,
                        delay_ms = self.policy.retry_delay.as_millis() as u64,
                        error = %e,
                        "Fetch failed, retrying"
                    );
                    tokio::time::sleep(self.policy.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Page, FetchError> {
        tokio::time::timeout(self.policy.timeout, self.request(url))
            .await
            .map_err(|_| FetchError::Timeout(self.policy.timeout))?
    }

    async fn request(&self, url: &str) -> Result<Page, FetchError> {
        let response = self.client.get(url).send().await?;

        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        let bytes = read_limited_bytes(response, self.policy.max_body_bytes).await?;

        tracing::trace!(
            url = %final_url,
            status = status,
            content_type = %content_type,
            bytes = bytes.len(),
            "Fetched"
        );

        Ok(Page {
            url: final_url,
            status,
            content_type,
            body: decode_body(&bytes),
        })
    }
}

/// Reads the response body as a stream, failing once it exceeds `limit`.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::TooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::TooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

fn decode_body(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_owned(),
        None => text.into_owned(),
    }
}
