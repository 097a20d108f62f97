//! Test harness: the full router wired to mock dependencies.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so no socket is bound.
//! Run with `RUST_LOG=debug cargo test -- --nocapture` to see server logs.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use webscribe_core::kernel::{
    BaseCrawlApi, MockCompletionBackend, MockContentSource, MockCrawlApi, ServerDeps,
};
use webscribe_core::server::build_app;

pub struct TestHarness {
    pub crawl_api: Arc<MockCrawlApi>,
    pub content_source: Arc<MockContentSource>,
    pub completion: Arc<MockCompletionBackend>,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_mocks(
            MockCrawlApi::new(),
            MockContentSource::new("Paris is the capital of France."),
            MockCompletionBackend::new(),
        )
    }

    pub fn with_mocks(
        crawl_api: MockCrawlApi,
        content_source: MockContentSource,
        completion: MockCompletionBackend,
    ) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let crawl_api = Arc::new(crawl_api);
        let content_source = Arc::new(content_source);
        let completion = Arc::new(completion);

        let deps = ServerDeps::new(
            Some(crawl_api.clone() as Arc<dyn BaseCrawlApi>),
            content_source.clone(),
            completion.clone(),
        );

        Self {
            crawl_api,
            content_source,
            completion,
            router: build_app(deps, vec!["http://localhost:3000".to_string()]),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
