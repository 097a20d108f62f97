use thiserror::Error;

pub type ChatResult<T> = std::result::Result<T, ChatError>;

/// Chat errors.
#[derive(Debug, Error)]
pub enum ChatError {
    /// No usable page content yet. Acquire content before asking again.
    #[error("No crawl data available. Please crawl a website first.")]
    ContextNotReady,

    /// The question was empty or whitespace.
    #[error("Message must not be empty")]
    EmptyMessage,

    /// The completion provider rejected the request.
    #[error("Completion backend error ({status}): {body}")]
    Backend { status: u16, body: String },

    /// The completion provider could not be reached.
    #[error("Completion backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The answer stream broke after it started.
    #[error("Answer stream interrupted: {0}")]
    StreamTransport(String),
}
