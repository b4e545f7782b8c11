//! Chat completion wire types.

use serde::{Deserialize, Serialize};

use super::message::Message;

/// Chat completion request for one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Model ID.
    pub model: String,

    /// Messages array, always `[system, user]` for a continuation round.
    pub messages: Vec<Message>,

    /// Max completion tokens for this round.
    pub max_tokens: u32,

    /// Frequency penalty.
    pub frequency_penalty: f32,

    /// Presence penalty.
    pub presence_penalty: f32,

    /// Enable streaming.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ChatRequest {
    /// Creates a request with zero penalties.
    pub fn new(model: impl Into<String>, messages: Vec<Message>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stream: None,
        }
    }

    /// Marks the request for streamed delivery.
    pub fn streaming(mut self) -> Self {
        self.stream = Some(true);
        self
    }

    /// Returns true if streamed delivery was requested.
    pub fn is_streaming(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Response ID.
    #[serde(default)]
    pub id: String,
    /// Model used.
    #[serde(default)]
    pub model: String,
    /// Completion choices.
    pub choices: Vec<Choice>,
}

impl ChatResponse {
    /// Returns the content of the first choice.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// Completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Choice index.
    #[serde(default)]
    pub index: u32,
    /// Assistant message.
    pub message: AssistantMessage,
    /// Finish reason.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant message in a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// Role (always "assistant").
    #[serde(default)]
    pub role: Option<String>,
    /// Text content.
    #[serde(default)]
    pub content: Option<String>,
}

/// Streaming chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatChunk {
    /// Chunk ID.
    #[serde(default)]
    pub id: String,
    /// Chunk choices.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

impl ChatChunk {
    /// Creates a chunk carrying a single text delta.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            choices: vec![ChunkChoice {
                index: 0,
                delta: Delta {
                    role: None,
                    content: Some(content.into()),
                },
                finish_reason: None,
            }],
        }
    }

    /// Returns the first choice's text delta, if present and non-empty.
    pub fn delta_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Streaming choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Choice index.
    #[serde(default)]
    pub index: u32,
    /// Delta content.
    #[serde(default)]
    pub delta: Delta,
    /// Finish reason.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Delta in a streaming chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    /// Role (only on the first chunk).
    #[serde(default)]
    pub role: Option<String>,
    /// Text content delta.
    #[serde(default)]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_penalties_and_omits_stream() {
        let request = ChatRequest::new("gpt-4o", vec![Message::user("hi")], 100);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 100);
        assert_eq!(json["frequency_penalty"], 0.0);
        assert_eq!(json["presence_penalty"], 0.0);
        assert!(json.get("stream").is_none());
    }

    #[test]
    fn test_streaming_request_sets_flag() {
        let request = ChatRequest::new("gpt-4o", vec![], 10).streaming();
        assert!(request.is_streaming());
        assert_eq!(serde_json::to_value(&request).unwrap()["stream"], true);
    }

    #[test]
    fn test_response_content() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello"},
                "finish_reason": "length"
            }]
        }))
        .unwrap();

        assert_eq!(response.content(), Some("Hello"));
    }

    #[test]
    fn test_chunk_delta_text_skips_empty_and_absent() {
        let role_only: ChatChunk = serde_json::from_value(serde_json::json!({
            "id": "c",
            "choices": [{"index": 0, "delta": {"role": "assistant"}}]
        }))
        .unwrap();
        assert_eq!(role_only.delta_text(), None);

        assert_eq!(ChatChunk::text("").delta_text(), None);
        assert_eq!(ChatChunk::default().delta_text(), None);
        assert_eq!(ChatChunk::text("abc").delta_text(), Some("abc"));
    }
}
