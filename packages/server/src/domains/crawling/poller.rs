//! Drives a crawl job from submission to a terminal status.
//!
//! Polls are strictly sequential: the first one is issued immediately, then
//! one per interval. Transport errors and unreadable status bodies are logged
//! and retried on the next tick. The loop ends on `completed`, on `failed`, on
//! the wall-clock deadline, on the attempt cap, or when the caller cancels.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::job::{CrawlJob, CrawlScope, JobStatus};
use crate::common::validate_url;
use crate::domains::content::{ContentError, ContentPayload, ContentResult};
use crate::kernel::BaseCrawlApi;
use firecrawl_client::CrawlStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct PollOptions {
    /// Delay between polls. No backoff.
    pub interval: Duration,
    /// Maximum wall-clock time spent polling.
    pub timeout: Option<Duration>,
    /// Maximum number of status requests.
    pub max_attempts: Option<u32>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Some(Duration::from_secs(300)),
            max_attempts: None,
        }
    }
}

#[derive(Clone)]
pub struct JobPoller {
    api: Arc<dyn BaseCrawlApi>,
    options: PollOptions,
}

impl JobPoller {
    pub fn new(api: Arc<dyn BaseCrawlApi>, options: PollOptions) -> Self {
        Self { api, options }
    }

    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    /// Validate `url` and submit a crawl job for it.
    ///
    /// Nothing is sent upstream when validation fails.
    pub async fn submit(&self, url: &str, scope: CrawlScope) -> ContentResult<CrawlJob> {
        let submitted_url = url.trim().to_string();
        validate_url(&submitted_url)?;

        if scope == CrawlScope::MultiPage {
            return Err(ContentError::Unsupported(
                "Multi-page crawling is coming soon. Please use single page mode.".to_string(),
            ));
        }

        let job_id = self.api.submit_crawl(&submitted_url).await.map_err(|e| {
            warn!(url = %submitted_url, error = %e, "Crawl submission failed");
            ContentError::from(e)
        })?;

        info!(job_id = %job_id, url = %submitted_url, "Crawl job submitted");
        Ok(CrawlJob::new(job_id, submitted_url))
    }

    /// Poll `job` until it reaches a terminal status.
    pub async fn await_completion(
        &self,
        mut job: CrawlJob,
        cancel: &CancellationToken,
    ) -> ContentResult<ContentPayload> {
        let deadline = self.options.timeout.map(|t| Instant::now() + t);
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(&job, attempts - 1)),
                _ = wait_for_deadline(deadline) => return Err(self.timed_out(&job, attempts - 1)),
                response = self.api.crawl_status(job.id()) => response,
            };

            match response {
                Ok(status) => {
                    self.log_status(&job, &status, attempts);
                    match job.observe(&status) {
                        JobStatus::Completed => {
                            let fallback_url = job.submitted_url().to_string();
                            let payload = job
                                .into_result()
                                .unwrap_or_else(|| ContentPayload::empty(fallback_url));
                            info!(
                                attempts,
                                bytes = payload.len(),
                                source_url = %payload.source_url(),
                                "Crawl completed"
                            );
                            return Ok(payload);
                        }
                        JobStatus::Failed => {
                            let reason = job.failure().unwrap_or("crawl failed").to_string();
                            warn!(job_id = %job.id(), attempts, reason = %reason, "Crawl failed");
                            return Err(ContentError::CrawlFailed {
                                job_id: job.id().to_string(),
                                reason,
                            });
                        }
                        JobStatus::Pending => {}
                    }
                }
                Err(e) => {
                    warn!(job_id = %job.id(), attempts, error = %e, "Crawl status poll failed, retrying");
                }
            }

            if let Some(max) = self.options.max_attempts {
                if attempts >= max {
                    return Err(self.timed_out(&job, attempts));
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(&job, attempts)),
                _ = wait_for_deadline(deadline) => return Err(self.timed_out(&job, attempts)),
                _ = sleep(self.options.interval) => {}
            }
        }
    }

    /// `submit` followed by `await_completion`.
    pub async fn crawl(
        &self,
        url: &str,
        scope: CrawlScope,
        cancel: &CancellationToken,
    ) -> ContentResult<ContentPayload> {
        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ContentError::Cancelled),
            job = self.submit(url, scope) => job?,
        };
        self.await_completion(job, cancel).await
    }

    fn log_status(&self, job: &CrawlJob, status: &CrawlStatus, attempts: u32) {
        match status {
            CrawlStatus::Pending {
                status,
                current,
                total,
            } => {
                if attempts % 6 == 0 {
                    info!(job_id = %job.id(), status = %status, current = ?current, total = ?total, "Crawl in progress");
                } else {
                    debug!(job_id = %job.id(), status = %status, attempts, "Crawl pending");
                }
            }
            CrawlStatus::Malformed { raw } => {
                warn!(job_id = %job.id(), attempts, body = %raw, "Unreadable crawl status, retrying");
            }
            _ => {}
        }
    }

    fn cancelled(&self, job: &CrawlJob, attempts: u32) -> ContentError {
        info!(job_id = %job.id(), attempts, "Crawl polling cancelled");
        ContentError::Cancelled
    }

    fn timed_out(&self, job: &CrawlJob, attempts: u32) -> ContentError {
        warn!(job_id = %job.id(), attempts, "Crawl polling gave up");
        ContentError::PollTimeout {
            job_id: job.id().to_string(),
            attempts,
        }
    }
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::MockCrawlApi;
    use firecrawl_client::{CrawlDocument, FirecrawlError};

    fn pending() -> CrawlStatus {
        CrawlStatus::Pending {
            status: "active".into(),
            current: Some(0),
            total: Some(1),
        }
    }

    fn completed(text: &str) -> CrawlStatus {
        CrawlStatus::Completed {
            documents: vec![CrawlDocument {
                content: Some(text.into()),
                ..Default::default()
            }],
        }
    }

    fn poller(api: &Arc<MockCrawlApi>, options: PollOptions) -> JobPoller {
        JobPoller::new(api.clone(), options)
    }

    #[tokio::test]
    async fn invalid_url_never_reaches_the_network() {
        let api = Arc::new(MockCrawlApi::new());
        let poller = poller(&api, PollOptions::default());

        for url in ["", "not a url", "ftp://example.com", "https://"] {
            let result = poller.submit(url, CrawlScope::SinglePage).await;
            assert!(
                matches!(result, Err(ContentError::InvalidUrl { .. })),
                "{url:?} should be rejected"
            );
        }
        assert_eq!(api.submit_calls().len(), 0);
    }

    #[tokio::test]
    async fn multi_page_is_unsupported() {
        let api = Arc::new(MockCrawlApi::new());
        let poller = poller(&api, PollOptions::default());

        let result = poller.submit("https://example.com", CrawlScope::MultiPage).await;

        assert!(matches!(result, Err(ContentError::Unsupported(_))));
        assert_eq!(api.submit_calls().len(), 0);
    }

    #[tokio::test]
    async fn submit_returns_job_id() {
        let api = Arc::new(MockCrawlApi::new().with_job_id("job-42"));
        let poller = poller(&api, PollOptions::default());

        let job = poller.submit("https://example.com/page", CrawlScope::SinglePage).await.unwrap();

        assert_eq!(job.id(), "job-42");
        assert_eq!(job.status(), JobStatus::Pending);
        assert_eq!(api.submit_calls(), vec!["https://example.com/page".to_string()]);
    }

    #[tokio::test]
    async fn submission_rejection_carries_upstream_status() {
        let api = Arc::new(MockCrawlApi::new().with_submit_error(FirecrawlError::Api {
            status: 402,
            message: "Payment required".into(),
        }));
        let poller = poller(&api, PollOptions::default());

        match poller.submit("https://example.com", CrawlScope::SinglePage).await {
            Err(ContentError::Submission { status, body }) => {
                assert_eq!(status, 402);
                assert_eq!(body, "Payment required");
            }
            other => panic!("expected submission error, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pending_pending_completed_takes_three_polls() {
        let api = Arc::new(
            MockCrawlApi::new()
                .with_status(Ok(pending()))
                .with_status(Ok(pending()))
                .with_status(Ok(completed("Paris is the capital of France."))),
        );
        let poller = poller(&api, PollOptions::default());
        let started = Instant::now();

        let payload = poller
            .crawl("https://example.com", CrawlScope::SinglePage, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(payload.text(), "Paris is the capital of France.");
        assert_eq!(api.status_calls().len(), 3);
        // Immediate first poll, then two intervals
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn completed_without_data_is_empty_payload() {
        let api = Arc::new(
            MockCrawlApi::new().with_status(Ok(CrawlStatus::Completed { documents: vec![] })),
        );
        let poller = poller(&api, PollOptions::default());

        let payload = poller
            .crawl("https://example.com", CrawlScope::SinglePage, &CancellationToken::new())
            .await
            .unwrap();

        assert!(payload.is_empty());
        assert_eq!(payload.text(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_ends_polling() {
        let api = Arc::new(
            MockCrawlApi::new()
                .with_job_id("job-7")
                .with_status(Ok(pending()))
                .with_status(Ok(CrawlStatus::Failed {
                    reason: "blocked by robots.txt".into(),
                })),
        );
        let poller = poller(&api, PollOptions::default());

        match poller
            .crawl("https://example.com", CrawlScope::SinglePage, &CancellationToken::new())
            .await
        {
            Err(ContentError::CrawlFailed { job_id, reason }) => {
                assert_eq!(job_id, "job-7");
                assert_eq!(reason, "blocked by robots.txt");
            }
            other => panic!("expected crawl failure, got {:?}", other),
        }
        assert_eq!(api.status_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried() {
        let api = Arc::new(
            MockCrawlApi::new()
                .with_status(Err(FirecrawlError::Api {
                    status: 503,
                    message: "unavailable".into(),
                }))
                .with_status(Ok(CrawlStatus::Malformed {
                    raw: "<html>".into(),
                }))
                .with_status(Ok(completed("done"))),
        );
        let poller = poller(&api, PollOptions::default());

        let payload = poller
            .crawl("https://example.com", CrawlScope::SinglePage, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(payload.text(), "done");
        assert_eq!(api.status_calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_cap_gives_poll_timeout() {
        let api = Arc::new(MockCrawlApi::new().with_job_id("job-9"));
        let options = PollOptions {
            max_attempts: Some(4),
            ..PollOptions::default()
        };
        let poller = poller(&api, options);

        match poller
            .crawl("https://example.com", CrawlScope::SinglePage, &CancellationToken::new())
            .await
        {
            Err(ContentError::PollTimeout { job_id, attempts }) => {
                assert_eq!(job_id, "job-9");
                assert_eq!(attempts, 4);
            }
            other => panic!("expected poll timeout, got {:?}", other),
        }
        assert_eq!(api.status_calls().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_gives_poll_timeout() {
        let api = Arc::new(MockCrawlApi::new());
        let options = PollOptions {
            timeout: Some(Duration::from_secs(12)),
            ..PollOptions::default()
        };
        let poller = poller(&api, options);

        let result = poller
            .crawl("https://example.com", CrawlScope::SinglePage, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ContentError::PollTimeout { attempts: 3, .. })));
        // Polls at 0s, 5s, 10s
        assert_eq!(api.status_calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let api = Arc::new(MockCrawlApi::new());
        let poller = poller(&api, PollOptions::default());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(7)).await;
            trigger.cancel();
        });

        let result = poller
            .crawl("https://example.com", CrawlScope::SinglePage, &cancel)
            .await;

        assert!(matches!(result, Err(ContentError::Cancelled)));
        assert_eq!(api.status_calls().len(), 2);
    }

    #[tokio::test]
    async fn already_cancelled_makes_no_calls() {
        let api = Arc::new(MockCrawlApi::new());
        let poller = poller(&api, PollOptions::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = poller
            .crawl("https://example.com", CrawlScope::SinglePage, &cancel)
            .await;

        assert!(matches!(result, Err(ContentError::Cancelled)));
        assert!(api.submit_calls().is_empty());
        assert!(api.status_calls().is_empty());
    }
}
