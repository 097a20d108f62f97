//! Raw crawl job endpoints.
//!
//! POST /api/crawl             submit a job, returns `{ jobId }`
//! GET  /api/crawl/status/:id  one status read, no retries
//!
//! Clients that prefer not to poll themselves use POST /api/content instead.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    Json,
};
use firecrawl_client::{CrawlDocument, CrawlStatus};
use serde::{Deserialize, Serialize};

use crate::domains::crawling::CrawlScope;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCrawlRequest {
    url: Option<String>,
    #[serde(default)]
    page_type: CrawlScope,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCrawlResponse {
    job_id: String,
}

#[derive(Serialize)]
pub struct CrawlStatusResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Vec<CrawlDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn start_crawl_handler(
    Extension(state): Extension<AxumAppState>,
    body: Result<Json<StartCrawlRequest>, JsonRejection>,
) -> Result<Json<StartCrawlResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let url = body
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("URL is required"))?;

    let poller = state.server_deps.job_poller().ok_or_else(crawl_disabled)?;
    let job = poller.submit(&url, body.page_type).await?;

    Ok(Json(StartCrawlResponse {
        job_id: job.id().to_string(),
    }))
}

pub async fn crawl_status_handler(
    Extension(state): Extension<AxumAppState>,
    Path(job_id): Path<String>,
) -> Result<Json<CrawlStatusResponse>, ApiError> {
    let api = state
        .server_deps
        .crawl_api
        .as_ref()
        .ok_or_else(crawl_disabled)?;

    let status = api.crawl_status(&job_id).await?;
    tracing::debug!(job_id = %job_id, status = %status.label(), "Crawl status read");

    let response = match status {
        CrawlStatus::Completed { documents } => CrawlStatusResponse {
            status: "completed".to_string(),
            current: None,
            total: None,
            data: Some(documents),
            error: None,
        },
        CrawlStatus::Pending {
            status,
            current,
            total,
        } => CrawlStatusResponse {
            status,
            current,
            total,
            data: None,
            error: None,
        },
        CrawlStatus::Failed { reason } => CrawlStatusResponse {
            status: "failed".to_string(),
            current: None,
            total: None,
            data: None,
            error: Some(reason),
        },
        CrawlStatus::Malformed { .. } => {
            return Err(ApiError::new(
                StatusCode::BAD_GATEWAY,
                "Unreadable status response from Firecrawl API",
            ));
        }
    };

    Ok(Json(response))
}

fn crawl_disabled() -> ApiError {
    ApiError::new(
        StatusCode::NOT_IMPLEMENTED,
        "Crawl API is not enabled for this deployment",
    )
}
