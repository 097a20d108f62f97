//! SSE streaming parser for chat completions.
//!
//! Converts a raw byte stream into `ChatCompletionChunk` values.
//! Handles `data: [DONE]`, lines split across network reads (including
//! multi-byte characters cut in half), and buffering.

use bytes::Bytes;
use futures::stream::{Stream, TryStreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::OpenAIError;

/// A single chunk from a streaming chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletionChunk {
    /// The text delta for this chunk.
    pub delta: String,
    /// Whether the stream is done.
    pub done: bool,
}

/// Raw streaming chunk from the API.
#[derive(Debug, serde::Deserialize)]
struct StreamChunkRaw {
    #[serde(default)]
    choices: Vec<StreamChoiceRaw>,
}

#[derive(Debug, serde::Deserialize)]
struct StreamChoiceRaw {
    #[serde(default)]
    delta: Option<DeltaRaw>,
}

#[derive(Debug, serde::Deserialize)]
struct DeltaRaw {
    #[serde(default)]
    content: Option<String>,
}

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, String>> + Send>>;

/// Stream adapter that converts raw SSE bytes into `ChatCompletionChunk` values.
///
/// Owns the underlying response body; dropping the stream releases the connection.
pub struct ChatCompletionStream {
    inner: ByteStream,
    buffer: Vec<u8>,
    finished: bool,
}

impl ChatCompletionStream {
    /// Wrap any byte stream. Transport errors are carried as their display text.
    pub fn new<E>(byte_stream: impl Stream<Item = Result<Bytes, E>> + Send + 'static) -> Self
    where
        E: std::fmt::Display + 'static,
    {
        Self {
            inner: Box::pin(byte_stream.map_err(|e| e.to_string())),
            buffer: Vec::new(),
            finished: false,
        }
    }
}

impl Stream for ChatCompletionStream {
    type Item = Result<ChatCompletionChunk, OpenAIError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(chunk) = try_parse_line(&mut this.buffer) {
                return Poll::Ready(Some(chunk));
            }

            if this.finished {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    this.buffer.clear();
                    return Poll::Ready(Some(Err(OpenAIError::Network(e))));
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    // Flush a final line that arrived without a trailing newline
                    if this.buffer.iter().any(|b| !b.is_ascii_whitespace()) {
                        this.buffer.push(b'\n');
                        continue;
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Try to extract and parse a complete SSE data line from the buffer.
/// Returns `None` if no complete data line is available yet.
fn try_parse_line(buffer: &mut Vec<u8>) -> Option<Result<ChatCompletionChunk, OpenAIError>> {
    loop {
        let newline_pos = buffer.iter().position(|b| *b == b'\n')?;
        let raw_line: Vec<u8> = buffer.drain(..=newline_pos).collect();

        let line = match std::str::from_utf8(&raw_line) {
            Ok(line) => line.trim(),
            Err(e) => {
                return Some(Err(OpenAIError::Parse(format!(
                    "Invalid UTF-8 in stream: {}",
                    e
                ))))
            }
        };

        // Blank lines separate events; "event:", "id:", "retry:" and comments are ignored
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();

        if data == "[DONE]" {
            return Some(Ok(ChatCompletionChunk {
                delta: String::new(),
                done: true,
            }));
        }

        return Some(match serde_json::from_str::<StreamChunkRaw>(data) {
            Ok(raw) => {
                let delta = raw
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.delta)
                    .and_then(|d| d.content)
                    .unwrap_or_default();
                Ok(ChatCompletionChunk { delta, done: false })
            }
            Err(e) => Err(OpenAIError::Parse(format!(
                "Failed to parse stream chunk: {} (data: {})",
                e,
                crate::truncate_to_char_boundary(data, 200)
            ))),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn make_sse_bytes(lines: &[&str]) -> Vec<Result<Bytes, String>> {
        lines
            .iter()
            .map(|line| Ok(Bytes::from(format!("{}\n", line))))
            .collect()
    }

    #[tokio::test]
    async fn test_parse_single_chunk() {
        let data = make_sse_bytes(&[
            r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#,
            "",
            "data: [DONE]",
        ]);

        let mut stream = ChatCompletionStream::new(futures::stream::iter(data));

        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(chunk.delta, "Hello");
        assert!(!chunk.done);

        let done = stream.next().await.unwrap().unwrap();
        assert!(done.done);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_parse_multiple_tokens() {
        let data = make_sse_bytes(&[
            r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#,
            "",
            r#"data: {"choices":[{"delta":{"content":" world"}}]}"#,
            "",
            "data: [DONE]",
        ]);

        let mut stream = ChatCompletionStream::new(futures::stream::iter(data));

        assert_eq!(stream.next().await.unwrap().unwrap().delta, "Hello");
        assert_eq!(stream.next().await.unwrap().unwrap().delta, " world");
        assert!(stream.next().await.unwrap().unwrap().done);
    }

    #[tokio::test]
    async fn test_empty_delta() {
        let data = make_sse_bytes(&[r#"data: {"choices":[{"delta":{}}]}"#, "", "data: [DONE]"]);

        let mut stream = ChatCompletionStream::new(futures::stream::iter(data));

        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(chunk.delta, "");
    }

    #[tokio::test]
    async fn test_line_split_inside_multibyte_char() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"Café\"}}]}\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let parts: Vec<Result<Bytes, String>> = vec![
            Ok(Bytes::copy_from_slice(&line[..split])),
            Ok(Bytes::copy_from_slice(&line[split..])),
        ];

        let mut stream = ChatCompletionStream::new(futures::stream::iter(parts));
        assert_eq!(stream.next().await.unwrap().unwrap().delta, "Café");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let parts: Vec<Result<Bytes, String>> = vec![
            Ok(Bytes::from(
                "data: {\"choices\":[{\"delta\":{\"content\":\"Par\"}}]}\n\n",
            )),
            Err("connection reset".to_string()),
        ];

        let mut stream = ChatCompletionStream::new(futures::stream::iter(parts));
        assert_eq!(stream.next().await.unwrap().unwrap().delta, "Par");
        match stream.next().await {
            Some(Err(OpenAIError::Network(msg))) => assert_eq!(msg, "connection reset"),
            other => panic!("expected network error, got {:?}", other),
        }
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_final_line_without_newline() {
        let parts: Vec<Result<Bytes, String>> = vec![Ok(Bytes::from(
            "data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}",
        ))];

        let mut stream = ChatCompletionStream::new(futures::stream::iter(parts));
        assert_eq!(stream.next().await.unwrap().unwrap().delta, "tail");
        assert!(stream.next().await.is_none());
    }
}
