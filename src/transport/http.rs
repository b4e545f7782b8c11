//! OpenAI-compatible HTTP transport.

use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{Client, ClientBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use super::{ChunkStream, CompletionTransport, SseParser, TransportError};
use crate::config::TransportConfig;
use crate::errors::{ContinuationError, ContinuationResult};
use crate::types::{ChatChunk, ChatRequest, ChatResponse};

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// API error body.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Chat completions over HTTP with bearer authentication.
pub struct OpenAiTransport {
    client: Client,
    config: TransportConfig,
}

impl OpenAiTransport {
    /// Creates a transport from configuration.
    pub fn new(config: TransportConfig) -> ContinuationResult<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| ContinuationError::configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Creates a transport from `OPENAI_*` environment variables.
    pub fn from_env() -> ContinuationResult<Self> {
        Self::new(TransportConfig::from_env()?)
    }

    async fn post(&self, request: &ChatRequest) -> Result<Response, TransportError> {
        let mut builder = self
            .client
            .post(self.config.endpoint_url(CHAT_COMPLETIONS_PATH))
            .bearer_auth(self.config.api_key())
            .json(request);

        if request.is_streaming() {
            builder = builder.header(reqwest::header::ACCEPT, "text/event-stream");
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {}", status));
        Err(TransportError::status(status.as_u16(), message))
    }
}

#[async_trait]
impl CompletionTransport for OpenAiTransport {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &ChatRequest) -> Result<String, TransportError> {
        let response = self.post(request).await?;
        let body = response.bytes().await?;
        let parsed: ChatResponse = serde_json::from_slice(&body)?;

        parsed
            .content()
            .map(str::to_string)
            .ok_or_else(|| TransportError::new("No completion content in response"))
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete_streaming(&self, request: &ChatRequest) -> Result<ChunkStream, TransportError> {
        let response = self.post(request).await?;
        Ok(sse_chunks(response.bytes_stream()))
    }
}

/// Decodes an SSE byte stream into chat chunks, ending at `[DONE]`.
fn sse_chunks<S>(bytes: S) -> ChunkStream
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    Box::pin(try_stream! {
        let mut bytes = Box::pin(bytes);
        let mut parser = SseParser::new();
        while let Some(piece) = bytes.next().await {
            let piece = piece.map_err(TransportError::from)?;
            let events = parser
                .parse_bytes(&piece)
                .map_err(|e| TransportError::new(format!("Invalid UTF-8 in stream: {}", e)))?;
            for event in events {
                if event.is_done() {
                    return;
                }
                yield serde_json::from_str::<ChatChunk>(&event.data).map_err(TransportError::from)?;
            }
        }
        if let Some(event) = parser.flush() {
            if !event.is_done() {
                yield serde_json::from_str::<ChatChunk>(&event.data).map_err(TransportError::from)?;
            }
        }
    })
}

impl std::fmt::Debug for OpenAiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiTransport")
            .field("config", &self.config)
            .finish()
    }
}
