//! Error types for the Firecrawl client.

use thiserror::Error;

/// Result type for Firecrawl client operations.
pub type Result<T> = std::result::Result<T, FirecrawlError>;

/// Firecrawl client errors.
#[derive(Debug, Error)]
pub enum FirecrawlError {
    /// Non-2xx response. Carries the upstream status and body verbatim.
    #[error("Firecrawl API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection failed, timed out, or the body could not be read.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 2xx response whose body did not have the expected shape.
    #[error("Unexpected response ({status}): {body}")]
    Malformed { status: u16, body: String },
}
