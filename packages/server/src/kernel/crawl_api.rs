use async_trait::async_trait;
use firecrawl_client::{CrawlStatus, FirecrawlClient, FirecrawlError};

use super::BaseCrawlApi;

/// Firecrawl client implementation of BaseCrawlApi
#[async_trait]
impl BaseCrawlApi for FirecrawlClient {
    async fn submit_crawl(&self, url: &str) -> Result<String, FirecrawlError> {
        self.start_crawl(url).await
    }

    async fn crawl_status(&self, job_id: &str) -> Result<CrawlStatus, FirecrawlError> {
        FirecrawlClient::crawl_status(self, job_id).await
    }
}
