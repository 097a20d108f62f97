// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE seams only. The polling state machine and the chat
// gate are domain logic built on top of them.
//
// Naming convention: Base* for trait names (e.g., BaseCrawlApi, BaseContentSource)

use std::pin::Pin;

use async_trait::async_trait;
use firecrawl_client::{CrawlStatus, FirecrawlError};
use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::domains::chat::{ChatError, ChatTurn, DecodingParams};
use crate::domains::content::{ContentPayload, ContentResult, ContentStrategy};

// =============================================================================
// Crawl API Trait (Infrastructure - hosted asynchronous crawler)
// =============================================================================

#[async_trait]
pub trait BaseCrawlApi: Send + Sync {
    /// Submit a crawl job, returning the upstream job identifier
    async fn submit_crawl(&self, url: &str) -> Result<String, FirecrawlError>;

    /// Read the job status once (no retries)
    async fn crawl_status(&self, job_id: &str) -> Result<CrawlStatus, FirecrawlError>;
}

// =============================================================================
// Content Source Trait (one polymorphic capability for both strategies)
// =============================================================================

#[async_trait]
pub trait BaseContentSource: Send + Sync {
    /// Acquire the text of `url`. Observes `cancel` at every suspension point.
    async fn fetch_content(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> ContentResult<ContentPayload>;

    /// The strategy this source implements
    fn strategy(&self) -> ContentStrategy;
}

// =============================================================================
// Completion Backend Trait (Infrastructure - streaming language model)
// =============================================================================

/// Ordered text chunks of one completion. A chunk error is terminal.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

#[async_trait]
pub trait BaseCompletionBackend: Send + Sync {
    /// Open a streaming completion over the full ordered transcript.
    ///
    /// Fails without a stream when the provider rejects the request.
    async fn stream_completion(
        &self,
        turns: &[ChatTurn],
        params: &DecodingParams,
    ) -> Result<TokenStream, ChatError>;

    /// Model identifier, for logs and health output
    fn model(&self) -> &str;
}
