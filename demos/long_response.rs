//! Long-form explanation, streamed then buffered.
//!
//! Requires `OPENAI_API_KEY`; `LONGFORM_MODEL` defaults to `gpt-4o` and
//! `LONGFORM_MAX_TOKENS` to 300.
//!
//! ```text
//! cargo run --example long_response
//! ```

use futures::StreamExt;
use longform_completion::observability::{init_logging, LogConfig};
use longform_completion::prompts::explain_request;
use longform_completion::{ContinuationConfig, ContinuationDriver, OpenAiTransport};
use std::io::Write;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging(LogConfig::new())?;

    let model = std::env::var("LONGFORM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
    let max_tokens = match std::env::var("LONGFORM_MAX_TOKENS") {
        Ok(value) => value.parse()?,
        Err(_) => 300,
    };

    let transport = Arc::new(OpenAiTransport::from_env()?);
    let config = ContinuationConfig::builder()
        .model(model)
        .max_tokens_per_round(max_tokens)
        .build()?;
    let driver = ContinuationDriver::new(transport, config);
    let request = explain_request("quantum computing", &driver.config().stop_marker);

    println!("=== Streamed ===");
    let mut stream = driver.stream(request.clone())?;
    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        print!("{}", chunk?);
        stdout.flush()?;
    }
    println!();

    println!("=== Buffered ===");
    println!("{}", driver.complete(request).await?);

    Ok(())
}
