//! Streamed delivery: chunks forwarded as they arrive.

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use super::{next_round, round_request, transport_failure, ContinuationDriver};
use crate::accumulator::{accumulate, Accumulation};
use crate::errors::ContinuationResult;
use crate::filter::{filter_for, FilteredStream};
use crate::types::Conversation;

/// Stream of text chunks produced by a generation.
pub type TextStream = Pin<Box<dyn Stream<Item = ContinuationResult<String>> + Send>>;

impl ContinuationDriver {
    /// Generates with streamed delivery, yielding every non-empty chunk as is.
    ///
    /// The stream is lazy and finite: each round starts only when the consumer
    /// pulls past the previous round's last chunk, and it ends after the round
    /// whose fragment contains the stop marker. Chunks are not filtered, so the
    /// marker itself is yielded; use [`stream`](Self::stream) for display.
    /// Dropping the stream abandons the generation.
    pub fn stream_raw(&self, conversation: Conversation) -> TextStream {
        let transport = Arc::clone(&self.transport);
        let config = self.config.clone();
        let span = info_span!(
            "generation",
            id = %Uuid::new_v4(),
            model = %config.model,
            mode = "streaming"
        );

        Box::pin(try_stream! {
            let marker = &config.stop_marker;
            let mut state = Accumulation::new();
            let mut conversation = conversation;
            let mut round = 0;

            while state.is_ongoing() {
                round = next_round(&config, round)?;
                let request = round_request(&config, &conversation).streaming();

                let mut chunks = transport
                    .complete_streaming(&request)
                    .instrument(span.clone())
                    .await
                    .map_err(|e| span.in_scope(|| transport_failure(round, e)))?;

                let mut fragment = String::new();
                while let Some(chunk) = chunks.next().await {
                    let chunk = chunk.map_err(|e| span.in_scope(|| transport_failure(round, e)))?;
                    if let Some(text) = chunk.delta_text() {
                        fragment.push_str(text);
                        yield text.to_string();
                    }
                }

                debug!(parent: &span, round, fragment_len = fragment.len(), "Round streamed");
                (state, conversation) = accumulate(&fragment, state, conversation, marker);
            }

            info!(parent: &span, rounds = round, "Generation complete");
        })
    }

    /// Generates with streamed delivery, suppressing the stop marker.
    ///
    /// Wraps [`stream_raw`](Self::stream_raw) in the configured
    /// [`MarkerFilter`](crate::filter::MarkerFilter): the marker never reaches
    /// the consumer, even when split across chunks, and nothing after it is
    /// pulled.
    pub fn stream(&self, conversation: Conversation) -> ContinuationResult<FilteredStream<TextStream>> {
        let filter = filter_for(&self.config.stop_marker, self.config.filter)?;
        Ok(FilteredStream::new(self.stream_raw(conversation), filter))
    }
}
