use serde::{Deserialize, Serialize};

/// Body for `POST /v0/crawl`.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlRequest {
    pub url: String,
}

/// Response from `POST /v0/crawl`.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlStarted {
    #[serde(rename = "jobId")]
    pub job_id: String,
}

/// A single crawled page from a completed job.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CrawlDocument {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub metadata: Option<DocumentMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "sourceURL", default)]
    pub source_url: Option<String>,
}

/// Raw shape of `GET /v0/crawl/status/{jobId}`. Everything but `status` is optional.
#[derive(Debug, Deserialize)]
struct CrawlStatusRaw {
    status: String,
    #[serde(default)]
    current: Option<u32>,
    #[serde(default)]
    total: Option<u32>,
    #[serde(default)]
    data: Option<Vec<CrawlDocument>>,
    #[serde(default)]
    error: Option<String>,
}

/// Crawl job status, validated at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlStatus {
    /// The job finished. `documents` may be empty.
    Completed { documents: Vec<CrawlDocument> },
    /// Still running (`active`, `paused`, `waiting`, ...).
    Pending {
        status: String,
        current: Option<u32>,
        total: Option<u32>,
    },
    /// The service reports the job as failed.
    Failed { reason: String },
    /// The body was not a recognisable status document.
    Malformed { raw: String },
}

impl CrawlStatus {
    /// Classify a status response body.
    pub fn from_body(body: &str) -> Self {
        let raw = match serde_json::from_str::<CrawlStatusRaw>(body) {
            Ok(raw) => raw,
            Err(_) => {
                return CrawlStatus::Malformed {
                    raw: body.to_string(),
                }
            }
        };

        match raw.status.as_str() {
            "completed" => CrawlStatus::Completed {
                documents: raw.data.unwrap_or_default(),
            },
            "failed" => CrawlStatus::Failed {
                reason: raw.error.unwrap_or_else(|| "crawl failed".to_string()),
            },
            "" => CrawlStatus::Malformed {
                raw: body.to_string(),
            },
            _ => CrawlStatus::Pending {
                status: raw.status,
                current: raw.current,
                total: raw.total,
            },
        }
    }

    /// Status label as reported upstream.
    pub fn label(&self) -> &str {
        match self {
            CrawlStatus::Completed { .. } => "completed",
            CrawlStatus::Pending { status, .. } => status,
            CrawlStatus::Failed { .. } => "failed",
            CrawlStatus::Malformed { .. } => "malformed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CrawlStatus::Completed { .. } | CrawlStatus::Failed { .. })
    }
}

impl CrawlDocument {
    /// Extracted text: `content` first, falling back to `markdown`.
    pub fn text(&self) -> Option<&str> {
        [self.content.as_deref(), self.markdown.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
    }
}
