//! Mock implementations for testing.
//!
//! [`MockTransport`] replays a script of rounds and records every request, so
//! driver behaviour can be checked without a real completion endpoint.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::transport::{ChunkStream, CompletionTransport, TransportError};
use crate::types::{ChatChunk, ChatRequest};

/// One scripted round.
#[derive(Debug, Clone)]
pub enum MockRound {
    /// Whole reply; streamed as a single chunk.
    Text(String),
    /// Streamed chunks; the buffered reply is their concatenation.
    Chunks(Vec<String>),
    /// Streams the chunks, then fails mid-stream.
    ChunksThenFail(Vec<String>, String),
    /// Fails before anything is delivered.
    Fail(String),
}

impl MockRound {
    /// Creates a text round.
    pub fn text(text: impl Into<String>) -> Self {
        MockRound::Text(text.into())
    }

    /// Creates a chunked round.
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockRound::Chunks(chunks.into_iter().map(Into::into).collect())
    }

    /// Creates a failing round.
    pub fn fail(message: impl Into<String>) -> Self {
        MockRound::Fail(message.into())
    }
}

/// Mock completion transport replaying scripted rounds in order.
#[derive(Debug, Default)]
pub struct MockTransport {
    rounds: Mutex<VecDeque<MockRound>>,
    requests: Mutex<Vec<ChatRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Creates a mock transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock transport with the given script.
    pub fn with_rounds(rounds: impl IntoIterator<Item = MockRound>) -> Self {
        let transport = Self::new();
        for round in rounds {
            transport.queue(round);
        }
        transport
    }

    /// Queues a round.
    pub fn queue(&self, round: MockRound) {
        lock(&self.rounds).push_back(round);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<ChatRequest> {
        lock(&self.requests).clone()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Returns the number of scripted rounds not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.rounds).len()
    }

    fn next_round(&self, request: &ChatRequest) -> Result<MockRound, TransportError> {
        lock(&self.requests).push(request.clone());
        lock(&self.rounds)
            .pop_front()
            .ok_or_else(|| TransportError::new("No mock round configured"))
    }
}

#[async_trait]
impl CompletionTransport for MockTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<String, TransportError> {
        match self.next_round(request)? {
            MockRound::Text(text) => Ok(text),
            MockRound::Chunks(chunks) => Ok(chunks.concat()),
            MockRound::ChunksThenFail(_, message) | MockRound::Fail(message) => {
                Err(TransportError::new(message))
            }
        }
    }

    async fn complete_streaming(&self, request: &ChatRequest) -> Result<ChunkStream, TransportError> {
        let items: Vec<Result<ChatChunk, TransportError>> = match self.next_round(request)? {
            MockRound::Text(text) => vec![Ok(ChatChunk::text(text))],
            MockRound::Chunks(chunks) => chunks.into_iter().map(|c| Ok(ChatChunk::text(c))).collect(),
            MockRound::ChunksThenFail(chunks, message) => chunks
                .into_iter()
                .map(|c| Ok(ChatChunk::text(c)))
                .chain(std::iter::once(Err(TransportError::new(message))))
                .collect(),
            MockRound::Fail(message) => return Err(TransportError::new(message)),
        };

        Ok(Box::pin(futures::stream::iter(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use futures::StreamExt;

    fn request() -> ChatRequest {
        ChatRequest::new("m", vec![Message::system("s"), Message::user("u")], 10)
    }

    #[tokio::test]
    async fn test_replays_rounds_in_order_and_records_requests() {
        let transport = MockTransport::with_rounds([MockRound::text("a"), MockRound::chunks(["b", "c"])]);

        assert_eq!(transport.complete(&request()).await.unwrap(), "a");
        assert_eq!(transport.complete(&request()).await.unwrap(), "bc");
        assert!(transport.complete(&request()).await.is_err());
        assert_eq!(transport.request_count(), 3);
        assert_eq!(transport.remaining(), 0);
    }

    #[tokio::test]
    async fn test_streaming_fails_after_chunks() {
        let transport = MockTransport::with_rounds([MockRound::ChunksThenFail(
            vec!["x".to_string()],
            "reset".to_string(),
        )]);

        let items: Vec<_> = transport
            .complete_streaming(&request())
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().delta_text(), Some("x"));
        assert_eq!(items[1].as_ref().unwrap_err().message(), "reset");
    }
}
