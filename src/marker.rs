//! Stop marker handling.

use std::fmt;

use crate::errors::{ContinuationError, ContinuationResult};

/// Default stop marker: five double daggers.
pub const DEFAULT_STOP_MARKER: &str = "‡‡‡‡‡";

/// Literal text the model appends once the whole answer is complete.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StopMarker(String);

impl StopMarker {
    /// Creates a stop marker. Empty markers are rejected.
    pub fn new(marker: impl Into<String>) -> ContinuationResult<Self> {
        let marker = marker.into();
        if marker.is_empty() {
            return Err(ContinuationError::validation_param(
                "Stop marker cannot be empty",
                "stop_marker",
            ));
        }
        Ok(Self(marker))
    }

    /// Returns the marker text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the marker length in characters.
    pub fn len_chars(&self) -> usize {
        self.0.chars().count()
    }

    /// Returns true if the marker occurs anywhere in `text`.
    pub fn is_found_in(&self, text: &str) -> bool {
        text.contains(self.0.as_str())
    }

    /// Removes every occurrence of the marker, then trims surrounding whitespace.
    pub fn strip(&self, text: &str) -> String {
        text.replace(self.0.as_str(), "").trim().to_string()
    }

    /// Returns `(sentinel, run_length)` when the marker is one character repeated.
    pub fn sentinel(&self) -> Option<(char, usize)> {
        let mut chars = self.0.chars();
        let first = chars.next()?;
        if chars.all(|c| c == first) {
            Some((first, self.len_chars()))
        } else {
            None
        }
    }
}

impl Default for StopMarker {
    fn default() -> Self {
        Self(DEFAULT_STOP_MARKER.to_string())
    }
}

impl fmt::Display for StopMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StopMarker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
