//! Pure OpenAI-compatible chat completions client
//!
//! A clean, minimal client for the `/chat/completions` endpoint with no
//! domain-specific logic. Works against OpenAI and any provider exposing the
//! same wire format (Gemini's OpenAI-compatible endpoint, local gateways).
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use openai_client::{OpenAIClient, ChatRequest, Message};
//!
//! let client = OpenAIClient::from_env()?;
//!
//! let mut stream = client.chat_completion_stream(
//!     ChatRequest::new("gpt-4o-mini")
//!         .message(Message::user("Hello!"))
//!         .temperature(0.7),
//! ).await?;
//!
//! while let Some(chunk) = stream.next().await {
//!     print!("{}", chunk?.delta);
//! }
//! ```

pub mod error;
pub mod streaming;
pub mod types;

pub use error::{OpenAIError, Result};
pub use streaming::{ChatCompletionChunk, ChatCompletionStream};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// Pure chat completions API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Gemini, Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Streaming chat completion.
    ///
    /// Send messages and get a stream of token chunks back.
    /// Uses SSE (server-sent events) from the API. Returns an error without
    /// a stream when the provider rejects the request.
    pub async fn chat_completion_stream(
        &self,
        request: ChatRequest,
    ) -> Result<streaming::ChatCompletionStream> {
        use reqwest::header;

        // Build JSON body with stream: true
        let mut body = serde_json::to_value(&request)
            .map_err(|e| OpenAIError::Parse(format!("Failed to serialize request: {}", e)))?;
        body["stream"] = serde_json::Value::Bool(true);

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Streaming request failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Streaming API error");
            return Err(OpenAIError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        debug!(model = %request.model, messages = request.messages.len(), "Completion stream opened");
        Ok(streaming::ChatCompletionStream::new(response.bytes_stream()))
    }
}
