//! HTML page fetching and anchor-link extraction.
//!
//! Fetching and parsing are deliberately split: [`PageFetcher::fetch_page`]
//! is the only async/network step and returns the raw body, while
//! [`extract_anchors`] / [`extract_links`] are pure functions over that body.
//! (`scraper::Html` is not `Send`, so the parsed document must never be held
//! across an await point; extracting into plain `String`s before returning
//! keeps callers free to run on any executor thread.)

use std::sync::LazyLock;
use std::time::Duration;

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, instrument, trace};
use url::Url;

/// Default HTTP connect timeout for page fetches.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout for page fetches. Pages are small; this is far
/// below the artifact-download timeout in the download module.
const READ_TIMEOUT_SECS: u64 = 60;

#[allow(clippy::expect_used)]
static CONTENT_ANCHORS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("#content a[href]").expect("static selector is valid")
});

#[allow(clippy::expect_used)]
static TABLE_ROW_ANCHORS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("tr a[href]").expect("static selector is valid")
});

/// Errors surfaced by page fetching.
///
/// None of these are fatal to the overall pipeline: the download engine
/// converts any of them into an empty link set, and the catalog caller shows
/// a "no courses" style message.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The page URL is malformed.
    #[error("invalid page URL: {url}")]
    InvalidUrl {
        /// The offending URL string.
        url: String,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response is not an HTML document.
    #[error("unsupported content type {content_type:?} fetching {url}")]
    UnsupportedContentType {
        /// The URL that returned the wrong content type.
        url: String,
        /// The Content-Type header value (empty when absent).
        content_type: String,
    },

    /// The request timed out.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Any other network-level failure (DNS, connection refused, TLS, body
    /// read errors).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying error.
        #[source]
        source: reqwest::Error,
    },
}

impl ScrapeError {
    fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }
}

/// Which anchors on a page are candidate links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkScope {
    /// Anchors inside the page's content section (`#content a[href]`) —
    /// used for the course catalog page.
    ContentAnchors,
    /// Anchors inside table rows (`tr a[href]`) — used for a lecture
    /// listing page.
    TableRowAnchors,
}

impl LinkScope {
    fn selector(self) -> &'static Selector {
        match self {
            Self::ContentAnchors => &CONTENT_ANCHORS,
            Self::TableRowAnchors => &TABLE_ROW_ANCHORS,
        }
    }
}

/// An anchor extracted from a page: its raw href and its visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The href attribute, verbatim (possibly relative, possibly blank).
    pub href: String,
    /// The anchor's text content, whitespace-trimmed.
    pub text: String,
}

/// Extracts all anchors matching `scope` from an HTML document, in document
/// order.
#[must_use]
pub fn extract_anchors(html: &str, scope: LinkScope) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    document
        .select(scope.selector())
        .map(|element| {
            let href = element.value().attr("href").unwrap_or_default().to_string();
            let text = element.text().collect::<String>().trim().to_string();
            trace!(href, text, "extracted anchor");
            Anchor { href, text }
        })
        .collect()
}

/// Extracts just the href strings matching `scope`, in document order.
#[must_use]
pub fn extract_links(html: &str, scope: LinkScope) -> Vec<String> {
    extract_anchors(html, scope)
        .into_iter()
        .map(|anchor| anchor.href)
        .collect()
}

/// Async HTTP fetcher for HTML pages.
///
/// Create once and reuse; the underlying reqwest client pools connections.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFetcher {
    /// Creates a fetcher with default timeouts (30 s connect, 60 s read).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a fetcher with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied
    /// configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches `url` and returns the HTML body text.
    ///
    /// # Errors
    ///
    /// Returns a [`ScrapeError`] for a malformed URL, non-2xx status,
    /// non-HTML content type, timeout, or network failure.
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        if Url::parse(url).is_err() {
            return Err(ScrapeError::invalid_url(url));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::http_status(url, status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.to_ascii_lowercase().contains("html") {
            return Err(ScrapeError::UnsupportedContentType {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::network(url, e))?;
        debug!(url, bytes = body.len(), "page fetched");
        Ok(body)
    }

    /// Fetches `url` and extracts the hrefs matching `scope`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`fetch_page`](Self::fetch_page).
    #[instrument(skip(self))]
    pub async fn fetch_links(
        &self,
        url: &str,
        scope: LinkScope,
    ) -> Result<Vec<String>, ScrapeError> {
        let body = self.fetch_page(url).await?;
        let links = extract_links(&body, scope);
        debug!(url, count = links.len(), "links extracted");
        Ok(links)
    }
}
