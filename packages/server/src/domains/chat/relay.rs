//! Forward an answer stream to a consumer as ordered events.
//!
//! Every chunk becomes a `Delta` in arrival order. The sequence always ends
//! with exactly one terminal event: `Done` on a clean end, `Error` on the
//! first failure. Nothing follows the terminal event.

use futures::{Stream, StreamExt};
use serde::Serialize;

use super::error::ChatResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum RelayEvent {
    Delta(String),
    Done,
    Error(String),
}

impl RelayEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RelayEvent::Delta(_))
    }

    /// Event name on the wire (SSE `event:` field).
    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::Delta(_) => "delta",
            RelayEvent::Done => "done",
            RelayEvent::Error(_) => "error",
        }
    }
}

/// Wrap `chunks` so the consumer sees deltas followed by one terminal event.
///
/// Dropping the returned stream drops `chunks`, which releases the upstream
/// connection.
pub fn relay<S>(mut chunks: S) -> impl Stream<Item = RelayEvent> + Send
where
    S: Stream<Item = ChatResult<String>> + Unpin + Send,
{
    async_stream::stream! {
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(text) => {
                    if !text.is_empty() {
                        yield RelayEvent::Delta(text);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Relaying answer failure to client");
                    yield RelayEvent::Error(e.to_string());
                    return;
                }
            }
        }
        yield RelayEvent::Done;
    }
}
