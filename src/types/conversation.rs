//! Conversation state threaded through every round.
//!
//! The conversation keeps the system instruction, the original user prompt and
//! an append-only list of assistant turns. The wire form is rendered only when
//! a request is built: always `[system, user]`, where the user content is the
//! prompt followed by one transcript entry per recorded turn.

use super::message::{Message, Role};
use crate::errors::{ContinuationError, ContinuationResult};

/// Instruction appended after every recorded assistant turn.
pub const CONTINUATION_DIRECTIVE: &str = "Continue immediately after where you left off.";

/// One assistant fragment recorded in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    fragment: String,
}

impl Turn {
    /// Returns the assistant fragment.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    fn render_into(&self, out: &mut String) {
        out.push_str("\nAssistant:");
        out.push_str(&self.fragment);
        out.push_str("\nUser:");
        out.push_str(CONTINUATION_DIRECTIVE);
    }
}

/// The evolving two-message exchange sent to the transport each round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    system: Message,
    prompt: String,
    turns: Vec<Turn>,
}

impl Conversation {
    /// Creates a conversation from a system instruction and a user prompt.
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: Message::system(system),
            prompt: prompt.into(),
            turns: Vec::new(),
        }
    }

    /// Creates a conversation from wire messages.
    ///
    /// Exactly `[system, user]` is accepted.
    pub fn from_messages(messages: Vec<Message>) -> ContinuationResult<Self> {
        match <[Message; 2]>::try_from(messages) {
            Ok([system, user]) if system.role() == Role::System && user.role() == Role::User => {
                Ok(Self {
                    system,
                    prompt: user.content().to_string(),
                    turns: Vec::new(),
                })
            }
            Ok(_) => Err(ContinuationError::validation_param(
                "Expected a system message followed by a user message",
                "messages",
            )),
            Err(messages) => Err(ContinuationError::validation_param(
                format!("Expected exactly 2 messages, got {}", messages.len()),
                "messages",
            )),
        }
    }

    /// Records an assistant fragment followed by the continuation directive.
    pub fn record_turn(&mut self, fragment: impl Into<String>) {
        self.turns.push(Turn {
            fragment: fragment.into(),
        });
    }

    /// Returns the recorded turns in order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the system message.
    pub fn system(&self) -> &Message {
        &self.system
    }

    /// Returns the original user prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Renders the trailing user content: prompt plus transcript.
    pub fn transcript(&self) -> String {
        let mut out = self.prompt.clone();
        for turn in &self.turns {
            turn.render_into(&mut out);
        }
        out
    }

    /// Renders the wire messages for the next round.
    pub fn messages(&self) -> Vec<Message> {
        vec![self.system.clone(), Message::user(self.transcript())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fresh_conversation_renders_prompt_only() {
        let conversation = Conversation::new("sys", "Explain quantum computing.");
        let messages = conversation.messages();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::system("sys"));
        assert_eq!(messages[1], Message::user("Explain quantum computing."));
    }

    #[test]
    fn test_turns_render_transcript_lines() {
        let mut conversation = Conversation::new("sys", "Q");
        conversation.record_turn("part one");
        conversation.record_turn("part two");

        assert_eq!(
            conversation.transcript(),
            "Q\nAssistant:part one\nUser:Continue immediately after where you left off.\
             \nAssistant:part two\nUser:Continue immediately after where you left off."
        );
        assert_eq!(conversation.messages()[0].content(), "sys");
    }

    #[test]
    fn test_from_messages_accepts_system_then_user() {
        let conversation =
            Conversation::from_messages(vec![Message::system("s"), Message::user("u")]).unwrap();

        assert_eq!(conversation.prompt(), "u");
        assert_eq!(conversation.system().content(), "s");
        assert!(conversation.turns().is_empty());
    }

    #[test]
    fn test_from_messages_rejects_wrong_shape() {
        assert!(Conversation::from_messages(vec![Message::user("u")]).is_err());
        assert!(
            Conversation::from_messages(vec![Message::user("u"), Message::system("s")]).is_err()
        );
        assert!(Conversation::from_messages(vec![
            Message::system("s"),
            Message::user("u"),
            Message::user("again"),
        ])
        .is_err());
    }
}
