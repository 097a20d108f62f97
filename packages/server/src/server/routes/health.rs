use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::domains::content::ContentStrategy;
use crate::server::app::AxumAppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    strategy: ContentStrategy,
    model: String,
}

/// Health check endpoint
///
/// Reports the active content strategy and completion model. Upstream
/// services are not contacted.
pub async fn health_handler(Extension(state): Extension<AxumAppState>) -> Json<HealthResponse> {
    let deps = &state.server_deps;

    Json(HealthResponse {
        status: "ok".to_string(),
        strategy: deps.content_source.strategy(),
        model: deps.completion.model().to_string(),
    })
}
