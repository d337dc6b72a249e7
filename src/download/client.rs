//! HTTP client wrapper for streaming artifact downloads.
//!
//! Downloads go straight from the response body stream to a buffered file
//! writer, so artifact size never pressures memory. A failed stream deletes
//! the partial file: each download either completes or leaves nothing behind.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;

/// HTTP client for downloading files with streaming support.
///
/// Create once and reuse across a batch; the underlying reqwest client pools
/// connections.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts (30 s connect,
    /// 5 min read).
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

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied timeout
    /// configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Downloads `url` to exactly `dest_path`, creating or truncating it.
    ///
    /// Returns the number of bytes written. If streaming fails partway, the
    /// partial file is removed before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the URL is invalid, the request fails
    /// (network error, timeout), the server returns a non-2xx status, the
    /// file cannot be created, or writing to disk fails.
    #[instrument(skip(self), fields(url = %url, path = %dest_path.display()))]
    pub async fn download_to_path(
        &self,
        url: &str,
        dest_path: &Path,
    ) -> Result<u64, DownloadError> {
        if Url::parse(url).is_err() {
            return Err(DownloadError::invalid_url(url));
        }

        debug!("starting download");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let file = File::create(dest_path)
            .await
            .map_err(|e| DownloadError::create(dest_path, e))?;

        let stream_result = stream_to_file(file, response, url, dest_path).await;
        if stream_result.is_err() {
            debug!("cleaning up partial file after error");
            let _ = tokio::fs::remove_file(dest_path).await;
        }
        let bytes_written = stream_result?;

        info!(bytes = bytes_written, "download complete");
        Ok(bytes_written)
    }
}

/// Streams the response body to the file, returning bytes written.
///
/// Extracted so the caller can clean up the partial file on error.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    dest_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(dest_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(dest_path, e))?;

    Ok(bytes_written)
}
