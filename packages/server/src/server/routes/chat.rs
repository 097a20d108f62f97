//! Streaming chat endpoint.
//!
//! POST /api/chat { messages, context, sourceUrl? }
//!
//! Stateless: the client sends the page content and the conversation so far
//! with every request. The handler rebuilds a `ChatSession` from them, asks
//! the trailing user message, and streams the answer as SSE:
//!
//! - `delta`  `{"delta": "..."}` for each chunk, in arrival order
//! - `done`   once, on clean completion
//! - `error`  `{"message": "..."}` once, if the stream breaks mid-way
//!
//! Failures before the first chunk (missing context, provider rejection)
//! are plain JSON errors with a status code instead of an event stream.

use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;

use crate::domains::chat::{relay, ChatRole, ChatSession, ChatTurn, RelayEvent};
use crate::domains::content::ContentPayload;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStreamRequest {
    #[serde(default)]
    messages: Vec<ChatTurn>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    source_url: Option<String>,
}

pub async fn chat_handler(
    Extension(state): Extension<AxumAppState>,
    body: Result<Json<ChatStreamRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let deps = &state.server_deps;

    let mut messages = body.messages;
    let question = match messages.pop() {
        Some(turn) if turn.role == ChatRole::User => turn.content,
        _ => return Err(ApiError::bad_request("Last message must be from the user")),
    };

    let mut session = ChatSession::new(deps.chat_options.clone());
    if let Some(context) = body.context {
        session.set_content(ContentPayload::new(context, body.source_url.unwrap_or_default()));
    }
    session.restore_history(messages)?;

    tracing::info!(
        session_id = %session.id(),
        turns = session.transcript().len(),
        model = deps.completion.model(),
        "Chat request"
    );

    let answer = session
        .into_answer(deps.completion.as_ref(), &question)
        .await?;

    let events = relay(answer).map(|event| Ok::<_, Infallible>(to_sse_event(event)));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: RelayEvent) -> Event {
    let sse = Event::default().event(event.name());
    let sse = match event {
        RelayEvent::Delta(delta) => sse.json_data(json!({ "delta": delta })),
        RelayEvent::Done => Ok(sse.data("[DONE]")),
        RelayEvent::Error(message) => sse.json_data(json!({ "message": message })),
    };

    sse.unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}
