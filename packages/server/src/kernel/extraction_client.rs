//! Client for the synchronous extraction proxy.
//!
//! `GET {base_url}/{target_url}` returns the page as plain text/markdown.
//! The body is read incrementally and capped at `max_bytes`.

use std::time::Duration;

use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::common::ApiKey;
use crate::domains::content::{ContentError, ContentResult};

pub const DEFAULT_EXTRACTION_BASE_URL: &str = "https://r.jina.ai";

/// Default cap on extracted bytes (5 MiB).
pub const DEFAULT_MAX_EXTRACTION_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ExtractionClient {
    client: reqwest::Client,
    api_key: Option<ApiKey>,
    base_url: String,
    max_bytes: u64,
}

impl ExtractionClient {
    pub fn new(api_key: Option<ApiKey>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            base_url: DEFAULT_EXTRACTION_BASE_URL.to_string(),
            max_bytes: DEFAULT_MAX_EXTRACTION_BYTES,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Fetch the extracted text of an already-normalized URL.
    pub async fn extract(&self, target_url: &str) -> ContentResult<String> {
        let endpoint = format!("{}/{}", self.base_url, target_url);

        let mut request = self.client.get(&endpoint);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose());
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, target_url, "Extraction request failed");
            ContentError::Upstream(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, target_url, "Extraction service returned an error");
            return Err(ContentError::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(ContentError::TooLarge {
                    max_bytes: self.max_bytes,
                });
            }
        }

        let text = read_capped(response.bytes_stream(), self.max_bytes).await?;
        debug!(target_url, bytes = text.len(), "Extraction completed");
        Ok(text)
    }
}

/// Drain a body stream into text, failing as soon as it passes `max_bytes`.
///
/// Chunked responses carry no length up front, so the cap is enforced here.
async fn read_capped<S, B, E>(mut stream: S, max_bytes: u64) -> ContentResult<String>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut bytes = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ContentError::Upstream(e.to_string()))?;
        let chunk = chunk.as_ref();
        if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
            return Err(ContentError::TooLarge { max_bytes });
        }
        bytes.extend_from_slice(chunk);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
