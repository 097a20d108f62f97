//! Pure Firecrawl REST API client.
//!
//! A minimal client for the Firecrawl v0 crawl API. Supports submitting a
//! crawl job and reading its status. Polling policy is left to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use firecrawl_client::{CrawlStatus, FirecrawlClient};
//!
//! let client = FirecrawlClient::new("fc-your-key".into());
//!
//! let job_id = client.start_crawl("https://example.com").await?;
//! match client.crawl_status(&job_id).await? {
//!     CrawlStatus::Completed { documents } => println!("{} pages", documents.len()),
//!     other => println!("still {}", other.label()),
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{FirecrawlError, Result};
pub use types::{CrawlDocument, CrawlRequest, CrawlStarted, CrawlStatus, DocumentMetadata};

const BASE_URL: &str = "https://api.firecrawl.dev";

#[derive(Clone)]
pub struct FirecrawlClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl FirecrawlClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host (proxies, self-hosted Firecrawl, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a crawl job. Returns immediately with the job identifier.
    pub async fn start_crawl(&self, url: &str) -> Result<String> {
        let input = CrawlRequest {
            url: url.to_string(),
        };

        let endpoint = format!("{}/v0/crawl", self.base_url);
        let resp = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.token)
            .json(&input)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(FirecrawlError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let started: CrawlStarted =
            serde_json::from_str(&body).map_err(|_| FirecrawlError::Malformed {
                status: status.as_u16(),
                body: body.clone(),
            })?;
        if started.job_id.trim().is_empty() {
            return Err(FirecrawlError::Malformed {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(job_id = %started.job_id, url, "Crawl job submitted");
        Ok(started.job_id)
    }

    /// Read the current status of a crawl job. One request, no retries.
    pub async fn crawl_status(&self, job_id: &str) -> Result<CrawlStatus> {
        let endpoint = format!("{}/v0/crawl/status/{}", self.base_url, job_id);
        let resp = self
            .client
            .get(&endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(FirecrawlError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let crawl_status = CrawlStatus::from_body(&body);
        tracing::debug!(job_id, status = %crawl_status.label(), "Crawl status fetched");
        Ok(crawl_status)
    }
}
