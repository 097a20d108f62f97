// TestDependencies - mock implementations for testing
//
// Scripted stand-ins for the crawl service, the content source and the
// completion backend. Every mock records the calls it received.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use firecrawl_client::{CrawlStatus, FirecrawlError};
use futures::stream;
use tokio_util::sync::CancellationToken;

use super::{BaseCompletionBackend, BaseContentSource, BaseCrawlApi, TokenStream};
use crate::domains::chat::{ChatError, ChatTurn, DecodingParams};
use crate::domains::content::{ContentError, ContentPayload, ContentResult, ContentStrategy};

// =============================================================================
// Mock Crawl API
// =============================================================================

/// Crawl service with a scripted status sequence.
///
/// Once the script runs out every poll reports `active`.
pub struct MockCrawlApi {
    job_id: String,
    submit_error: Mutex<Option<FirecrawlError>>,
    statuses: Mutex<VecDeque<Result<CrawlStatus, FirecrawlError>>>,
    submit_calls: Arc<Mutex<Vec<String>>>,
    status_calls: Arc<Mutex<Vec<String>>>,
}

impl MockCrawlApi {
    pub fn new() -> Self {
        Self {
            job_id: "job-1".to_string(),
            submit_error: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            submit_calls: Arc::new(Mutex::new(Vec::new())),
            status_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_job_id(mut self, job_id: &str) -> Self {
        self.job_id = job_id.to_string();
        self
    }

    /// Fail the next submission with `error`
    pub fn with_submit_error(self, error: FirecrawlError) -> Self {
        *self.submit_error.lock().unwrap() = Some(error);
        self
    }

    /// Queue one poll response
    pub fn with_status(self, status: Result<CrawlStatus, FirecrawlError>) -> Self {
        self.statuses.lock().unwrap().push_back(status);
        self
    }

    /// URLs that were submitted
    pub fn submit_calls(&self) -> Vec<String> {
        self.submit_calls.lock().unwrap().clone()
    }

    /// Job ids that were polled, one entry per poll
    pub fn status_calls(&self) -> Vec<String> {
        self.status_calls.lock().unwrap().clone()
    }
}

impl Default for MockCrawlApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseCrawlApi for MockCrawlApi {
    async fn submit_crawl(&self, url: &str) -> Result<String, FirecrawlError> {
        self.submit_calls.lock().unwrap().push(url.to_string());

        if let Some(error) = self.submit_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.job_id.clone())
    }

    async fn crawl_status(&self, job_id: &str) -> Result<CrawlStatus, FirecrawlError> {
        self.status_calls.lock().unwrap().push(job_id.to_string());

        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(CrawlStatus::Pending {
                    status: "active".to_string(),
                    current: None,
                    total: None,
                })
            })
    }
}

// =============================================================================
// Mock Content Source
// =============================================================================

/// Content source returning a fixed text, or a scripted error
pub struct MockContentSource {
    text: String,
    error: Mutex<Option<ContentError>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockContentSource {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            error: Mutex::new(None),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the next fetch with `error`
    pub fn with_error(self, error: ContentError) -> Self {
        *self.error.lock().unwrap() = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseContentSource for MockContentSource {
    async fn fetch_content(
        &self,
        url: &str,
        _cancel: &CancellationToken,
    ) -> ContentResult<ContentPayload> {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(error) = self.error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(ContentPayload::new(self.text.clone(), url))
    }

    fn strategy(&self) -> ContentStrategy {
        ContentStrategy::Extract
    }
}

// =============================================================================
// Mock Completion Backend
// =============================================================================

/// One scripted completion outcome
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Stream these chunks, then end cleanly
    Chunks(Vec<String>),
    /// Stream these chunks, then fail with a transport error
    FailAfter(Vec<String>, String),
    /// Reject the request before any stream is opened
    Reject { status: u16, body: String },
}

impl ScriptedReply {
    pub fn chunks(chunks: &[&str]) -> Self {
        ScriptedReply::Chunks(chunks.iter().map(|c| c.to_string()).collect())
    }

    pub fn fail_after(chunks: &[&str], error: &str) -> Self {
        ScriptedReply::FailAfter(
            chunks.iter().map(|c| c.to_string()).collect(),
            error.to_string(),
        )
    }

    pub fn reject(status: u16, body: &str) -> Self {
        ScriptedReply::Reject {
            status,
            body: body.to_string(),
        }
    }
}

/// Completion backend replaying scripted replies in order.
///
/// When the script runs out it answers with the refusal sentence.
pub struct MockCompletionBackend {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Arc<Mutex<Vec<(Vec<ChatTurn>, DecodingParams)>>>,
}

impl MockCompletionBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_reply(self, reply: ScriptedReply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Transcripts and decoding parameters received, one entry per request
    pub fn calls(&self) -> Vec<(Vec<ChatTurn>, DecodingParams)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockCompletionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseCompletionBackend for MockCompletionBackend {
    async fn stream_completion(
        &self,
        turns: &[ChatTurn],
        params: &DecodingParams,
    ) -> Result<TokenStream, ChatError> {
        self.calls.lock().unwrap().push((turns.to_vec(), *params));

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::chunks(&[crate::domains::chat::REFUSAL_MESSAGE]));

        let items: Vec<Result<String, ChatError>> = match reply {
            ScriptedReply::Chunks(chunks) => chunks.into_iter().map(Ok).collect(),
            ScriptedReply::FailAfter(chunks, error) => chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(ChatError::StreamTransport(error))))
                .collect(),
            ScriptedReply::Reject { status, body } => {
                return Err(ChatError::Backend { status, body });
            }
        };

        Ok(Box::pin(stream::iter(items)))
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
