//! One conversation over one page.
//!
//! A `ChatSession` owns the current `ContentPayload` and the transcript. The
//! transcript is empty until content arrives; from then on its first turn is
//! the system turn built from that content, regenerated whenever the content
//! is replaced. User and assistant turns are committed together, and only
//! after the answer stream completed, so a rejected or interrupted answer
//! leaves the transcript as it was.

use std::borrow::{Borrow, BorrowMut};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::{ChatError, ChatResult};
use super::models::{ChatRole, ChatTurn};
use super::prompts::build_system_prompt;
use crate::domains::content::ContentPayload;
use crate::kernel::{BaseCompletionBackend, TokenStream};

/// Fixed decoding configuration sent with every completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self {
            max_output_tokens: 4096,
            temperature: 0.7,
            top_p: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub decoding: DecodingParams,
    /// Page text beyond this many bytes is cut before it is embedded.
    pub max_context_bytes: usize,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            decoding: DecodingParams::default(),
            max_context_bytes: 200_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    options: ChatOptions,
    content: Option<ContentPayload>,
    transcript: Vec<ChatTurn>,
}

impl ChatSession {
    /// A session with no content. Every `ask` fails until `set_content`.
    pub fn new(options: ChatOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            options,
            content: None,
            transcript: Vec::new(),
        }
    }

    pub fn with_content(content: ContentPayload, options: ChatOptions) -> Self {
        let mut session = Self::new(options);
        session.set_content(content);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn content(&self) -> Option<&ContentPayload> {
        self.content.as_ref()
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Replace the page content and regenerate the system turn in place.
    ///
    /// Earlier questions and answers are kept.
    pub fn set_content(&mut self, content: ContentPayload) {
        let text = content.text();
        let embedded = openai_client::truncate_to_char_boundary(text, self.options.max_context_bytes);
        if embedded.len() < text.len() {
            warn!(
                session_id = %self.id,
                source_url = %content.source_url(),
                original_bytes = text.len(),
                kept_bytes = embedded.len(),
                "Page content exceeds context limit, truncating"
            );
        }

        let system = ChatTurn::system(build_system_prompt(embedded));
        match self.transcript.first_mut() {
            Some(first) if first.role == ChatRole::System => *first = system,
            _ => self.transcript.insert(0, system),
        }

        info!(
            session_id = %self.id,
            source_url = %content.source_url(),
            bytes = content.len(),
            "Chat content set"
        );
        self.content = Some(content);
    }

    /// Replay earlier user/assistant turns, e.g. sent back by a stateless client.
    ///
    /// System turns are dropped: the session owns its system turn.
    pub fn restore_history(&mut self, turns: impl IntoIterator<Item = ChatTurn>) -> ChatResult<()> {
        self.ensure_ready()?;

        for turn in turns {
            match turn.role {
                ChatRole::System => {
                    debug!(session_id = %self.id, "Ignoring client-supplied system turn");
                }
                ChatRole::User | ChatRole::Assistant => self.transcript.push(turn),
            }
        }
        Ok(())
    }

    /// Ask a question. The answer borrows the session and commits into it on completion.
    pub async fn ask(
        &mut self,
        backend: &dyn BaseCompletionBackend,
        question: &str,
    ) -> ChatResult<Answer<&mut ChatSession>> {
        Answer::start(self, backend, question).await
    }

    /// Like `ask`, but the answer owns the session (for `'static` response streams).
    pub async fn into_answer(
        self,
        backend: &dyn BaseCompletionBackend,
        question: &str,
    ) -> ChatResult<Answer<ChatSession>> {
        Answer::start(self, backend, question).await
    }

    fn ensure_ready(&self) -> ChatResult<()> {
        match &self.content {
            Some(content) if !content.is_empty() => Ok(()),
            _ => Err(ChatError::ContextNotReady),
        }
    }

    /// Gate checks, then the full turn list for the backend.
    fn prepare(&self, question: &str) -> ChatResult<Vec<ChatTurn>> {
        self.ensure_ready()?;
        if question.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let mut turns = self.transcript.clone();
        turns.push(ChatTurn::user(question));
        Ok(turns)
    }

    fn commit(&mut self, question: String, answer: String) {
        self.transcript.push(ChatTurn::user(question));
        self.transcript.push(ChatTurn::assistant(answer));
        debug!(session_id = %self.id, turns = self.transcript.len(), "Exchange committed");
    }
}

/// Streamed answer to one question.
///
/// Yields text chunks in arrival order. When the backend stream ends cleanly,
/// the question and the assembled answer are appended to the session. A chunk
/// error is yielded once and ends the stream without committing; dropping the
/// answer early commits nothing and releases the backend connection.
pub struct Answer<S: BorrowMut<ChatSession>> {
    session: S,
    question: String,
    chunks: TokenStream,
    assembled: String,
    finished: bool,
}

impl<S: BorrowMut<ChatSession>> Answer<S> {
    async fn start(session: S, backend: &dyn BaseCompletionBackend, question: &str) -> ChatResult<Self> {
        let current: &ChatSession = session.borrow();
        let turns = current.prepare(question)?;
        let params = current.options.decoding;
        let session_id = current.id;

        debug!(
            session_id = %session_id,
            model = backend.model(),
            turns = turns.len(),
            "Requesting completion"
        );
        let chunks = backend.stream_completion(&turns, &params).await?;

        Ok(Self {
            session,
            question: question.to_string(),
            chunks,
            assembled: String::new(),
            finished: false,
        })
    }

    pub fn session(&self) -> &ChatSession {
        Borrow::<ChatSession>::borrow(&self.session)
    }

    /// Text received so far.
    pub fn assembled(&self) -> &str {
        &self.assembled
    }

    /// Drain the stream and return the full answer text.
    pub async fn collect_text(mut self) -> ChatResult<String>
    where
        S: Unpin,
    {
        use futures::StreamExt;

        while let Some(chunk) = self.next().await {
            chunk?;
        }
        Ok(self.assembled)
    }
}

impl<S: BorrowMut<ChatSession> + Unpin> Stream for Answer<S> {
    type Item = ChatResult<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.finished {
                return Poll::Ready(None);
            }

            match this.chunks.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    this.assembled.push_str(&chunk);
                    return Poll::Ready(Some(Ok(chunk)));
                }
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    warn!(
                        session_id = %this.session().id,
                        error = %e,
                        received_bytes = this.assembled.len(),
                        "Answer stream failed, transcript left unchanged"
                    );
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    let question = std::mem::take(&mut this.question);
                    let answer = this.assembled.clone();
                    BorrowMut::<ChatSession>::borrow_mut(&mut this.session).commit(question, answer);
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
