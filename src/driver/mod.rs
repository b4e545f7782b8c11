//! Continuation drivers.
//!
//! A driver repeatedly calls the completion transport, folds each round's
//! fragment through [`accumulate`](crate::accumulator::accumulate), and
//! re-primes the conversation until a fragment carries the stop marker.
//! Rounds are strictly sequential; only one request is ever in flight.

mod buffered;
mod streaming;

pub use streaming::TextStream;

use std::sync::Arc;
use tracing::error;

use crate::config::ContinuationConfig;
use crate::errors::{ContinuationError, ContinuationResult};
use crate::filter::FilteredStream;
use crate::observability::redact;
use crate::transport::{CompletionTransport, TransportError};
use crate::types::{ChatRequest, Conversation};

/// Result of [`ContinuationDriver::generate`].
pub enum Generation {
    /// Final text from buffered delivery.
    Text(String),
    /// Marker-filtered chunk stream from streamed delivery.
    Stream(FilteredStream<TextStream>),
}

impl std::fmt::Debug for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generation::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Generation::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}

/// Drives long-form generation over a token-limited completion transport.
///
/// The transport handle is supplied by the caller and shared, never global.
#[derive(Clone)]
pub struct ContinuationDriver {
    transport: Arc<dyn CompletionTransport>,
    config: ContinuationConfig,
}

impl ContinuationDriver {
    /// Creates a driver.
    pub fn new(transport: Arc<dyn CompletionTransport>, config: ContinuationConfig) -> Self {
        Self { transport, config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ContinuationConfig {
        &self.config
    }

    /// Runs a generation in the configured delivery mode.
    pub async fn generate(&self, conversation: Conversation) -> ContinuationResult<Generation> {
        if self.config.streaming {
            Ok(Generation::Stream(self.stream(conversation)?))
        } else {
            Ok(Generation::Text(self.complete(conversation).await?))
        }
    }
}

impl std::fmt::Debug for ContinuationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContinuationDriver")
            .field("config", &self.config)
            .finish()
    }
}

/// Returns the number of the round about to start, enforcing the budget.
fn next_round(config: &ContinuationConfig, completed: u32) -> ContinuationResult<u32> {
    match config.max_rounds {
        Some(max) if completed >= max => Err(ContinuationError::RoundBudgetExhausted {
            rounds: completed,
        }),
        _ => Ok(completed + 1),
    }
}

/// Builds the request for the next round from the current conversation.
fn round_request(config: &ContinuationConfig, conversation: &Conversation) -> ChatRequest {
    ChatRequest::new(
        config.model.clone(),
        conversation.messages(),
        config.max_tokens_per_round,
    )
}

/// Logs a transport failure and wraps it; the caller propagates it unchanged.
fn transport_failure(round: u32, source: TransportError) -> ContinuationError {
    error!(
        round,
        status = source.http_status(),
        error = %redact(source.message()),
        "Completion transport failed"
    );
    ContinuationError::transport(round, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::StopMarker;

    fn config(max_rounds: Option<u32>) -> ContinuationConfig {
        let mut builder = ContinuationConfig::builder()
            .model("gpt-4o")
            .max_tokens_per_round(100);
        if let Some(max) = max_rounds {
            builder = builder.max_rounds(max);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_next_round_unbounded() {
        assert_eq!(next_round(&config(None), 0).unwrap(), 1);
        assert_eq!(next_round(&config(None), 1_000).unwrap(), 1_001);
    }

    #[test]
    fn test_next_round_enforces_budget() {
        let config = config(Some(2));
        assert_eq!(next_round(&config, 1).unwrap(), 2);
        assert!(matches!(
            next_round(&config, 2),
            Err(ContinuationError::RoundBudgetExhausted { rounds: 2 })
        ));
    }

    #[test]
    fn test_round_request_uses_rendered_conversation() {
        let mut conversation = Conversation::new("sys", "Q");
        conversation.record_turn("A");

        let request = round_request(&config(None), &conversation);

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.max_tokens, 100);
        assert_eq!(request.frequency_penalty, 0.0);
        assert_eq!(request.presence_penalty, 0.0);
        assert_eq!(request.messages, conversation.messages());
        assert!(!request.is_streaming());
        assert_eq!(config(None).stop_marker, StopMarker::default());
    }
}
