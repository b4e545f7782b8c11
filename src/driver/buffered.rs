//! Buffered delivery: whole message per round, one final string.

use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{next_round, round_request, transport_failure, ContinuationDriver};
use crate::accumulator::{accumulate, Accumulation};
use crate::errors::ContinuationResult;
use crate::types::{Conversation, Message};

impl ContinuationDriver {
    /// Generates the complete answer with buffered delivery.
    ///
    /// Returns every fragment concatenated in arrival order, with all marker
    /// occurrences removed and surrounding whitespace trimmed. A transport
    /// failure in any round aborts the generation and discards the text
    /// accumulated so far.
    #[instrument(
        name = "generation",
        skip_all,
        fields(id = %Uuid::new_v4(), model = %self.config.model, mode = "buffered")
    )]
    pub async fn complete(&self, conversation: Conversation) -> ContinuationResult<String> {
        let marker = &self.config.stop_marker;
        let mut state = Accumulation::new();
        let mut conversation = conversation;
        let mut round = 0;

        while state.is_ongoing() {
            round = next_round(&self.config, round)?;
            let request = round_request(&self.config, &conversation);

            let fragment = self
                .transport
                .complete(&request)
                .await
                .map_err(|e| transport_failure(round, e))?;

            debug!(round, fragment_len = fragment.len(), "Round received");
            (state, conversation) = accumulate(&fragment, state, conversation, marker);
        }

        info!(rounds = round, "Generation complete");
        Ok(state.finish(marker))
    }

    /// Like [`complete`](Self::complete), starting from `[system, user]` wire messages.
    pub async fn complete_messages(&self, messages: Vec<Message>) -> ContinuationResult<String> {
        self.complete(Conversation::from_messages(messages)?).await
    }
}
