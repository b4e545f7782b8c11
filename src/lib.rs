//! Long-form completion over token-limited chat APIs.
//!
//! A single chat completion is capped at a fixed number of tokens. This crate
//! gets answers longer than that cap by continuation-pagination: the model is
//! told to end its answer with a stop marker, and the driver keeps re-invoking
//! the endpoint with the text produced so far plus a "continue" directive,
//! stitching the fragments together until a fragment carries the marker.
//!
//! # Features
//!
//! - **Buffered delivery**: one final string, marker removed and trimmed
//! - **Streamed delivery**: chunks forwarded as they arrive across rounds
//! - **Marker filtering**: the marker is hidden from streamed output even when
//!   split across chunks
//! - **Pluggable transport**: any [`CompletionTransport`]; an OpenAI-compatible
//!   HTTP one is included
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use longform_completion::{
//!     prompts, ContinuationConfig, ContinuationDriver, OpenAiTransport, StopMarker,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ContinuationConfig::builder()
//!         .model("gpt-4o")
//!         .max_tokens_per_round(300)
//!         .build()?;
//!
//!     let driver = ContinuationDriver::new(Arc::new(OpenAiTransport::from_env()?), config);
//!     let request = prompts::explain_request("quantum computing", &StopMarker::default());
//!
//!     println!("{}", driver.complete(request).await?);
//!     Ok(())
//! }
//! ```
//!
//! # Streaming Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use longform_completion::{
//!     prompts, ContinuationConfig, ContinuationDriver, OpenAiTransport, StopMarker,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ContinuationConfig::builder()
//!         .model("gpt-4o")
//!         .max_tokens_per_round(300)
//!         .streaming(true)
//!         .build()?;
//!
//!     let driver = ContinuationDriver::new(Arc::new(OpenAiTransport::from_env()?), config);
//!     let request = prompts::explain_request("quantum computing", &StopMarker::default());
//!
//!     let mut stream = driver.stream(request)?;
//!     while let Some(chunk) = stream.next().await {
//!         print!("{}", chunk?);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod accumulator;
pub mod config;
pub mod driver;
pub mod errors;
pub mod filter;
pub mod marker;
pub mod observability;
pub mod prompts;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use accumulator::{accumulate, Accumulation};
pub use config::{ContinuationConfig, ContinuationConfigBuilder, TransportConfig, TransportConfigBuilder};
pub use driver::{ContinuationDriver, Generation, TextStream};
pub use errors::{ContinuationError, ContinuationResult};
pub use filter::{
    filter_for, FilterMode, FilterStep, FilteredStream, LookbackFilter, MarkerFilter,
    RunLengthFilter,
};
pub use marker::{StopMarker, DEFAULT_STOP_MARKER};
pub use transport::{ChunkStream, CompletionTransport, OpenAiTransport, TransportError};

// Type re-exports
pub use types::{Conversation, Message, Role, Turn, CONTINUATION_DIRECTIVE};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
