use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::error::{ContentError, ContentResult};
use super::models::{ContentPayload, ContentStrategy};
use crate::common::{normalize_url, validate_url};
use crate::domains::crawling::{CrawlScope, JobPoller};
use crate::kernel::{BaseContentSource, ExtractionClient};

/// Content from an asynchronous crawl job (submit, poll, first result).
#[derive(Clone)]
pub struct CrawlContentSource {
    poller: JobPoller,
}

impl CrawlContentSource {
    pub fn new(poller: JobPoller) -> Self {
        Self { poller }
    }
}

#[async_trait]
impl BaseContentSource for CrawlContentSource {
    async fn fetch_content(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> ContentResult<ContentPayload> {
        let url = normalize_url(url);
        self.poller.crawl(&url, CrawlScope::SinglePage, cancel).await
    }

    fn strategy(&self) -> ContentStrategy {
        ContentStrategy::Crawl
    }
}

/// Content from one synchronous call to the extraction proxy.
#[derive(Clone)]
pub struct ExtractionContentSource {
    client: ExtractionClient,
}

impl ExtractionContentSource {
    pub fn new(client: ExtractionClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BaseContentSource for ExtractionContentSource {
    async fn fetch_content(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> ContentResult<ContentPayload> {
        let url = normalize_url(url);
        validate_url(&url)?;

        let text = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ContentError::Cancelled),
            text = self.client.extract(&url) => text?,
        };

        info!(url = %url, bytes = text.len(), "Content extracted");
        Ok(ContentPayload::new(text, url))
    }

    fn strategy(&self) -> ContentStrategy {
        ContentStrategy::Extract
    }
}
