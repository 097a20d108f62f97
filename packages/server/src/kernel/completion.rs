//! OpenAI-compatible completion backend.
//!
//! Any provider speaking the chat completions protocol works here; the
//! default deployment points at Gemini's OpenAI-compatible endpoint.

use async_trait::async_trait;
use futures::StreamExt;
use openai_client::{ChatRequest, Message, OpenAIClient, OpenAIError};
use tracing::debug;

use super::{BaseCompletionBackend, TokenStream};
use crate::domains::chat::{ChatError, ChatRole, ChatTurn, DecodingParams};

pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_COMPLETION_MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Clone)]
pub struct OpenAICompletionBackend {
    client: OpenAIClient,
    model: String,
}

impl OpenAICompletionBackend {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn build_request(&self, turns: &[ChatTurn], params: &DecodingParams) -> ChatRequest {
        let mut request = turns.iter().fold(ChatRequest::new(&self.model), |request, turn| {
            let message = match turn.role {
                ChatRole::System => Message::system(&turn.content),
                ChatRole::User => Message::user(&turn.content),
                ChatRole::Assistant => Message::assistant(&turn.content),
            };
            request.message(message)
        });

        request = request.temperature(params.temperature).top_p(params.top_p);
        if ChatRequest::uses_max_completion_tokens(&self.model) {
            request.max_completion_tokens(params.max_output_tokens)
        } else {
            request.max_tokens(params.max_output_tokens)
        }
    }
}

#[async_trait]
impl BaseCompletionBackend for OpenAICompletionBackend {
    async fn stream_completion(
        &self,
        turns: &[ChatTurn],
        params: &DecodingParams,
    ) -> Result<TokenStream, ChatError> {
        let request = self.build_request(turns, params);

        let mut upstream = self
            .client
            .chat_completion_stream(request)
            .await
            .map_err(|e| match e {
                OpenAIError::Status { status, body } => ChatError::Backend { status, body },
                other => ChatError::BackendUnavailable(other.to_string()),
            })?;

        let model = self.model.clone();
        let chunks = async_stream::stream! {
            let mut received = 0usize;
            while let Some(chunk) = upstream.next().await {
                match chunk {
                    Ok(chunk) if chunk.done => {
                        debug!(model = %model, bytes = received, "Completion stream finished");
                        return;
                    }
                    Ok(chunk) => {
                        if chunk.delta.is_empty() {
                            continue;
                        }
                        received += chunk.delta.len();
                        yield Ok(chunk.delta);
                    }
                    Err(e) => {
                        yield Err(ChatError::StreamTransport(e.to_string()));
                        return;
                    }
                }
            }
            // Body ended without the [DONE] sentinel
            yield Err(ChatError::StreamTransport(
                "stream closed before completion".to_string(),
            ));
        };

        Ok(Box::pin(chunks))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
