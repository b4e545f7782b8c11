//! Configuration for generation requests and the HTTP transport.
//!
//! [`ContinuationConfig`] holds the per-generation options (model, tokens per
//! round, stop marker, delivery mode, round budget). [`TransportConfig`] holds
//! what [`OpenAiTransport`](crate::transport::OpenAiTransport) needs to reach
//! an OpenAI-compatible endpoint.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::errors::{ContinuationError, ContinuationResult};
use crate::filter::FilterMode;
use crate::marker::StopMarker;

/// Default base URL for the completion endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default request timeout (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Options for one long-form generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuationConfig {
    /// Model identifier.
    pub model: String,
    /// Max completion tokens requested per round.
    pub max_tokens_per_round: u32,
    /// Marker that ends generation.
    pub stop_marker: StopMarker,
    /// Streamed rather than buffered delivery.
    pub streaming: bool,
    /// Optional cap on rounds; `None` loops until the marker appears.
    pub max_rounds: Option<u32>,
    /// Marker filter used by the streaming driver.
    pub filter: FilterMode,
}

impl ContinuationConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ContinuationConfigBuilder {
        ContinuationConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LONGFORM_MODEL` (required): model identifier
    /// - `LONGFORM_MAX_TOKENS` (required): max tokens per round
    /// - `LONGFORM_STOP_MARKER` (optional): stop marker text
    /// - `LONGFORM_STREAM` (optional): `true`/`false`
    /// - `LONGFORM_MAX_ROUNDS` (optional): round budget
    pub fn from_env() -> ContinuationResult<Self> {
        let model = std::env::var("LONGFORM_MODEL").map_err(|_| {
            ContinuationError::configuration("LONGFORM_MODEL environment variable not set")
        })?;

        let mut builder = ContinuationConfigBuilder::new()
            .model(model)
            .max_tokens_per_round(parse_env("LONGFORM_MAX_TOKENS")?.ok_or_else(|| {
                ContinuationError::configuration("LONGFORM_MAX_TOKENS environment variable not set")
            })?);

        if let Ok(marker) = std::env::var("LONGFORM_STOP_MARKER") {
            builder = builder.stop_marker(marker);
        }

        if let Some(streaming) = parse_env("LONGFORM_STREAM")? {
            builder = builder.streaming(streaming);
        }

        if let Some(max_rounds) = parse_env("LONGFORM_MAX_ROUNDS")? {
            builder = builder.max_rounds(max_rounds);
        }

        builder.build()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> ContinuationResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            ContinuationError::configuration(format!("Invalid value for {}: {:?}", name, raw))
        }),
        Err(_) => Ok(None),
    }
}

/// Builder for `ContinuationConfig`.
#[derive(Debug, Default)]
pub struct ContinuationConfigBuilder {
    model: Option<String>,
    max_tokens_per_round: Option<u32>,
    stop_marker: Option<String>,
    streaming: bool,
    max_rounds: Option<u32>,
    filter: FilterMode,
}

impl ContinuationConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the max tokens per round.
    pub fn max_tokens_per_round(mut self, max_tokens: u32) -> Self {
        self.max_tokens_per_round = Some(max_tokens);
        self
    }

    /// Sets the stop marker.
    pub fn stop_marker(mut self, marker: impl Into<String>) -> Self {
        self.stop_marker = Some(marker.into());
        self
    }

    /// Enables or disables streamed delivery.
    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Caps the number of rounds.
    pub fn max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    /// Selects the streaming marker filter.
    pub fn filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ContinuationResult<ContinuationConfig> {
        let model = self
            .model
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| ContinuationError::validation_param("Model is required", "model"))?;

        let max_tokens_per_round = match self.max_tokens_per_round {
            Some(n) if n > 0 => n,
            _ => {
                return Err(ContinuationError::validation_param(
                    "max_tokens_per_round must be a positive integer",
                    "max_tokens_per_round",
                ))
            }
        };

        if self.max_rounds == Some(0) {
            return Err(ContinuationError::validation_param(
                "max_rounds must be at least 1",
                "max_rounds",
            ));
        }

        let stop_marker = match self.stop_marker {
            Some(marker) => StopMarker::new(marker)?,
            None => StopMarker::default(),
        };

        crate::filter::filter_for(&stop_marker, self.filter)?;

        Ok(ContinuationConfig {
            model,
            max_tokens_per_round,
            stop_marker,
            streaming: self.streaming,
            max_rounds: self.max_rounds,
            filter: self.filter,
        })
    }
}

/// Settings for the HTTP completion transport.
#[derive(Clone)]
pub struct TransportConfig {
    pub(crate) api_key: SecretString,
    /// Base URL for API requests.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl TransportConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENAI_API_KEY` (required): API key for authentication
    /// - `OPENAI_BASE_URL` (optional): custom base URL
    /// - `OPENAI_TIMEOUT` (optional): request timeout in seconds
    pub fn from_env() -> ContinuationResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ContinuationError::configuration("OPENAI_API_KEY environment variable not set")
        })?;

        let mut builder = TransportConfigBuilder::new().api_key(api_key);

        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        if let Some(secs) = parse_env::<u64>("OPENAI_TIMEOUT")? {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Returns the API key (exposing the secret).
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Returns the full URL for an endpoint.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for `TransportConfig`.
#[derive(Default)]
pub struct TransportConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl TransportConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ContinuationResult<TransportConfig> {
        let api_key = self
            .api_key
            .ok_or_else(|| ContinuationError::configuration("API key is required"))?;

        if api_key.is_empty() {
            return Err(ContinuationError::configuration("API key cannot be empty"));
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        url::Url::parse(&base_url).map_err(|e| {
            ContinuationError::configuration(format!("Invalid base URL {:?}: {}", base_url, e))
        })?;

        Ok(TransportConfig {
            api_key: SecretString::new(api_key),
            base_url,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}
