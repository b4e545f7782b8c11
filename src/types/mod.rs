//! Type definitions for the continuation protocol.

pub mod chat;
pub mod conversation;
pub mod message;

pub use chat::{AssistantMessage, ChatChunk, ChatRequest, ChatResponse, Choice, ChunkChoice, Delta};
pub use conversation::{Conversation, Turn, CONTINUATION_DIRECTIVE};
pub use message::{Message, Role};
