//! Completion transport layer.
//!
//! The continuation drivers only need two capabilities from a completion
//! endpoint: a buffered call returning the whole message text, and a streamed
//! call returning chunks with optional text deltas. [`CompletionTransport`]
//! is that seam; [`OpenAiTransport`] implements it over HTTP.

mod http;
mod sse;

pub use http::OpenAiTransport;
pub use sse::{SseEvent, SseParser};

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::types::{ChatChunk, ChatRequest};

/// Stream of chunks delivered for one streamed round.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatChunk, TransportError>> + Send>>;

/// Completion transport.
///
/// Implementations are owned by the caller and handed to the driver
/// explicitly; there is no global client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Performs a buffered completion and returns the message text.
    async fn complete(&self, request: &ChatRequest) -> Result<String, TransportError>;

    /// Performs a streamed completion and returns the chunk stream.
    async fn complete_streaming(&self, request: &ChatRequest) -> Result<ChunkStream, TransportError>;
}

/// Transport failure.
///
/// The only runtime failure kind: connection problems, error statuses,
/// undecodable bodies and mid-stream breakage all land here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    status: Option<u16>,
}

impl TransportError {
    /// Creates a transport error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a transport error for an HTTP error status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if the failure came from one.
    pub fn http_status(&self) -> Option<u16> {
        self.status
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => TransportError::status(status.as_u16(), err.to_string()),
            None => TransportError::new(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::new(format!("Invalid response body: {}", err))
    }
}
