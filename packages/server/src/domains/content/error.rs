use thiserror::Error;

pub type ContentResult<T> = std::result::Result<T, ContentError>;

/// Errors raised while acquiring page content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Local validation failure. No network call was made.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Feature exists in the API surface but is not available yet.
    #[error("{0}")]
    Unsupported(String),

    /// The crawl service rejected the job submission.
    #[error("crawl submission rejected ({status}): {body}")]
    Submission { status: u16, body: String },

    /// The extraction service rejected the request.
    #[error("content extraction failed ({status}): {body}")]
    Fetch { status: u16, body: String },

    /// The upstream service could not be reached.
    #[error("upstream unreachable: {0}")]
    Upstream(String),

    /// The crawl service reported the job as failed.
    #[error("crawl job {job_id} failed: {reason}")]
    CrawlFailed { job_id: String, reason: String },

    /// The job did not reach a terminal status in time.
    #[error("crawl job {job_id} still pending after {attempts} polls")]
    PollTimeout { job_id: String, attempts: u32 },

    /// The caller abandoned the acquisition.
    #[error("content acquisition cancelled")]
    Cancelled,

    /// Extracted content exceeded the configured size cap.
    #[error("extracted content exceeds {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },
}

impl ContentError {
    pub fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        ContentError::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<firecrawl_client::FirecrawlError> for ContentError {
    /// Submission-side mapping. Poll errors are handled by the poller itself.
    fn from(err: firecrawl_client::FirecrawlError) -> Self {
        use firecrawl_client::FirecrawlError;

        match err {
            FirecrawlError::Api { status, message } => ContentError::Submission {
                status,
                body: message,
            },
            FirecrawlError::Malformed { status, body } => ContentError::Submission { status, body },
            FirecrawlError::Network(e) => ContentError::Upstream(e.to_string()),
        }
    }
}
