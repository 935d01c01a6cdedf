//! Document download from a web address

use std::time::Duration;

use pdflens_domain::{DocumentFetcher, FetchError};
use tracing::debug;
use url::Url;

/// Fetches PDFs over HTTP(S) with a per-call wall-clock bound
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher that reuses an existing HTTP client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        debug!("Fetching {} (timeout {}s)", url, timeout.as_secs());

        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_pdf_content_type(content_type) {
                return Err(FetchError::ContentTypeMismatch(content_type.to_string()));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

/// A missing content type is accepted; a present one must be PDF or raw bytes
fn is_pdf_content_type(content_type: &str) -> bool {
    content_type.contains("application/pdf") || content_type.contains("octet-stream")
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(timeout)
    } else {
        FetchError::Transport(e.to_string())
    }
}
