use firecrawl_client::CrawlStatus;
use serde::{Deserialize, Serialize};

use crate::domains::content::ContentPayload;

/// How much of a site to crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrawlScope {
    #[default]
    #[serde(rename = "single")]
    SinglePage,
    /// Site-wide crawling. Accepted on the wire, rejected on submission.
    #[serde(rename = "multi")]
    MultiPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// A submitted crawl job as seen by the poller.
///
/// Status only moves forward: once `Completed` or `Failed`, later
/// observations are ignored.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    id: String,
    submitted_url: String,
    status: JobStatus,
    result: Option<ContentPayload>,
    failure: Option<String>,
}

impl CrawlJob {
    pub fn new(id: impl Into<String>, submitted_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            submitted_url: submitted_url.into(),
            status: JobStatus::Pending,
            result: None,
            failure: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn submitted_url(&self) -> &str {
        &self.submitted_url
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn result(&self) -> Option<&ContentPayload> {
        self.result.as_ref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Apply one poll response. Returns the status after the update.
    pub fn observe(&mut self, status: &CrawlStatus) -> JobStatus {
        if self.status.is_terminal() {
            return self.status;
        }

        match status {
            CrawlStatus::Completed { documents } => {
                // Only the first document is used, even if the crawler returned more
                let payload = match documents.first() {
                    Some(doc) => {
                        let source_url = doc
                            .metadata
                            .as_ref()
                            .and_then(|m| m.source_url.clone())
                            .unwrap_or_else(|| self.submitted_url.clone());
                        ContentPayload::new(doc.text().unwrap_or_default(), source_url)
                    }
                    None => ContentPayload::empty(self.submitted_url.clone()),
                };
                self.result = Some(payload);
                self.status = JobStatus::Completed;
            }
            CrawlStatus::Failed { reason } => {
                self.failure = Some(reason.clone());
                self.status = JobStatus::Failed;
            }
            CrawlStatus::Pending { .. } | CrawlStatus::Malformed { .. } => {}
        }

        self.status
    }

    /// Take the payload out of a completed job.
    pub fn into_result(self) -> Option<ContentPayload> {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firecrawl_client::{CrawlDocument, DocumentMetadata};

    fn pending() -> CrawlStatus {
        CrawlStatus::Pending {
            status: "active".into(),
            current: None,
            total: None,
        }
    }

    #[test]
    fn completed_uses_first_document() {
        let mut job = CrawlJob::new("job-1", "https://example.com");
        let status = CrawlStatus::Completed {
            documents: vec![
                CrawlDocument {
                    content: Some("first".into()),
                    markdown: None,
                    metadata: Some(DocumentMetadata {
                        title: None,
                        source_url: Some("https://example.com/".into()),
                    }),
                },
                CrawlDocument {
                    content: Some("second".into()),
                    ..Default::default()
                },
            ],
        };

        assert_eq!(job.observe(&status), JobStatus::Completed);
        let payload = job.result().unwrap();
        assert_eq!(payload.text(), "first");
        assert_eq!(payload.source_url(), "https://example.com/");
    }

    #[test]
    fn completed_without_documents_is_empty_payload() {
        let mut job = CrawlJob::new("job-1", "https://example.com");
        job.observe(&CrawlStatus::Completed { documents: vec![] });

        let payload = job.into_result().unwrap();
        assert!(payload.is_empty());
        assert_eq!(payload.source_url(), "https://example.com");
    }

    #[test]
    fn terminal_status_never_reverts() {
        let mut job = CrawlJob::new("job-1", "https://example.com");
        assert_eq!(job.observe(&pending()), JobStatus::Pending);
        assert_eq!(
            job.observe(&CrawlStatus::Failed {
                reason: "blocked".into()
            }),
            JobStatus::Failed
        );
        assert_eq!(job.observe(&pending()), JobStatus::Failed);
        assert_eq!(
            job.observe(&CrawlStatus::Completed { documents: vec![] }),
            JobStatus::Failed
        );
        assert_eq!(job.failure(), Some("blocked"));
        assert!(job.result().is_none());
    }

    #[test]
    fn scope_wire_names() {
        let scope: CrawlScope = serde_json::from_str(r#""multi""#).unwrap();
        assert_eq!(scope, CrawlScope::MultiPage);
        assert_eq!(serde_json::to_string(&CrawlScope::SinglePage).unwrap(), r#""single""#);
    }
}
