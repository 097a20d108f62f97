//! HTTP rendering of domain errors.
//!
//! Every failure becomes `{ "message": ... }` with a status code. Upstream
//! rejections keep the upstream status and body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use firecrawl_client::FirecrawlError;
use serde_json::json;

use crate::domains::chat::ChatError;
use crate::domains::content::ContentError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn upstream(status: u16, message: String) -> Self {
        let status = StatusCode::from_u16(status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        Self::new(status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "Request failed");
        } else {
            tracing::debug!(status = %self.status, message = %self.message, "Request rejected");
        }
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        let message = err.to_string();
        match err {
            ContentError::InvalidUrl { .. } => Self::bad_request(message),
            ContentError::Unsupported(_) => Self::new(StatusCode::NOT_IMPLEMENTED, message),
            ContentError::Submission { status, body } => {
                Self::upstream(status, format!("Error from Firecrawl API: {}", body))
            }
            ContentError::Fetch { status, body } => {
                Self::upstream(status, format!("Error from extraction API: {}", body))
            }
            ContentError::PollTimeout { .. } => Self::new(StatusCode::GATEWAY_TIMEOUT, message),
            ContentError::Cancelled => Self::new(StatusCode::SERVICE_UNAVAILABLE, message),
            ContentError::Upstream(_)
            | ContentError::CrawlFailed { .. }
            | ContentError::TooLarge { .. } => Self::new(StatusCode::BAD_GATEWAY, message),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        let message = err.to_string();
        match err {
            ChatError::ContextNotReady | ChatError::EmptyMessage => Self::bad_request(message),
            ChatError::Backend { status, body } => Self::upstream(status, body),
            ChatError::BackendUnavailable(_) | ChatError::StreamTransport(_) => {
                Self::new(StatusCode::BAD_GATEWAY, message)
            }
        }
    }
}

impl From<FirecrawlError> for ApiError {
    fn from(err: FirecrawlError) -> Self {
        match err {
            FirecrawlError::Api { status, message } => {
                Self::upstream(status, format!("Error from Firecrawl API: {}", message))
            }
            other => Self::new(StatusCode::BAD_GATEWAY, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_preserved() {
        let err = ApiError::from(ContentError::Submission {
            status: 402,
            body: "Payment required".into(),
        });
        assert_eq!(err.status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(err.message, "Error from Firecrawl API: Payment required");
    }

    #[test]
    fn non_error_upstream_status_becomes_bad_gateway() {
        let err = ApiError::from(ChatError::Backend {
            status: 200,
            body: "odd".into(),
        });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn local_failures_are_client_errors() {
        assert_eq!(
            ApiError::from(ContentError::invalid_url("x", "bad")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(ChatError::ContextNotReady).status, StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ContentError::Unsupported("soon".into())).status,
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            ApiError::from(ContentError::PollTimeout {
                job_id: "j".into(),
                attempts: 3
            })
            .status,
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
