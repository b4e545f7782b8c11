//! Round accumulation.
//!
//! Folds one round's fragment into the running output, decides whether
//! generation continues, and extends the conversation with the transcript
//! entry that asks the model to resume.

use crate::marker::StopMarker;
use crate::types::Conversation;

/// Running output of a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulation {
    output: String,
    ongoing: bool,
}

impl Accumulation {
    /// Creates an empty, ongoing accumulation.
    pub fn new() -> Self {
        Self {
            output: String::new(),
            ongoing: true,
        }
    }

    /// Returns the concatenated fragments received so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Returns false once a fragment contained the stop marker.
    pub fn is_ongoing(&self) -> bool {
        self.ongoing
    }

    /// Consumes the accumulation into the final text: marker removed, trimmed.
    pub fn finish(self, marker: &StopMarker) -> String {
        marker.strip(&self.output)
    }
}

impl Default for Accumulation {
    fn default() -> Self {
        Self::new()
    }
}

/// Folds `fragment` into `state` and `conversation`.
///
/// Only `fragment` is searched for the marker, never the accumulated text.
/// The transcript turn is recorded even for the terminating round.
pub fn accumulate(
    fragment: &str,
    mut state: Accumulation,
    mut conversation: Conversation,
    marker: &StopMarker,
) -> (Accumulation, Conversation) {
    state.output.push_str(fragment);
    if marker.is_found_in(fragment) {
        state.ongoing = false;
    }
    conversation.record_turn(fragment);
    (state, conversation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CONTINUATION_DIRECTIVE;
    use pretty_assertions::assert_eq;

    fn conversation() -> Conversation {
        Conversation::new("sys", "Explain quantum computing.")
    }

    #[test]
    fn test_appends_verbatim_and_continues_without_marker() {
        let marker = StopMarker::default();
        let (state, conversation) =
            accumulate("  first  ", Accumulation::new(), conversation(), &marker);

        assert_eq!(state.output(), "  first  ");
        assert!(state.is_ongoing());
        let transcript = conversation.transcript();
        assert!(transcript.contains("\nAssistant:  first  "));
        assert!(transcript.contains(CONTINUATION_DIRECTIVE));
    }

    #[test]
    fn test_marker_in_fragment_stops() {
        let marker = StopMarker::default();
        let (state, conversation) =
            accumulate("done‡‡‡‡‡", Accumulation::new(), conversation(), &marker);

        assert!(!state.is_ongoing());
        assert_eq!(conversation.turns().len(), 1);
    }

    #[test]
    fn test_only_current_fragment_is_checked() {
        let marker = StopMarker::default();
        let (state, conv) = accumulate("a‡‡‡", Accumulation::new(), conversation(), &marker);
        assert!(state.is_ongoing());

        // The marker now spans two fragments in the accumulated text, but
        // neither fragment contains it on its own.
        let (state, conv) = accumulate("‡‡b", state, conv, &marker);
        assert!(marker.is_found_in(state.output()));
        assert!(state.is_ongoing());

        let (state, _) = accumulate("‡‡‡‡‡", state, conv, &marker);
        assert!(!state.is_ongoing());
    }

    #[test]
    fn test_finish_strips_marker_and_whitespace() {
        let marker = StopMarker::default();
        let (state, _) = accumulate("\n intro ", Accumulation::new(), conversation(), &marker);
        let (state, _) = accumulate("end ‡‡‡‡‡\n", state, conversation(), &marker);

        assert_eq!(state.finish(&marker), "intro end");
    }
}
