use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

#[derive(Deserialize)]
pub struct ContentRequest {
    url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    content: String,
    source_url: String,
}

/// Run the configured content source end to end.
///
/// With the crawl strategy this holds the request open while the job is
/// polled. A client disconnect drops the handler future, and the drop guard
/// cancels polling.
pub async fn content_handler(
    Extension(state): Extension<AxumAppState>,
    body: Result<Json<ContentRequest>, JsonRejection>,
) -> Result<Json<ContentResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let url = body
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("URL is required"))?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let payload = state
        .server_deps
        .content_source
        .fetch_content(&url, &cancel)
        .await?;

    tracing::info!(
        source_url = %payload.source_url(),
        bytes = payload.len(),
        strategy = %state.server_deps.content_source.strategy(),
        "Content acquired"
    );

    Ok(Json(ContentResponse {
        content: payload.text().to_string(),
        source_url: payload.source_url().to_string(),
    }))
}
