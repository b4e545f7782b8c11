//! Server-Sent Events parsing for streamed completions.

use std::str::Utf8Error;

/// Server-Sent Event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type.
    pub event: Option<String>,
    /// Event data (multiple `data:` lines joined with `\n`).
    pub data: String,
}

impl SseEvent {
    /// Returns true for the `[DONE]` terminator.
    pub fn is_done(&self) -> bool {
        self.data == "[DONE]"
    }
}

/// Incremental SSE parser.
///
/// Bytes may split lines, events and multi-byte characters anywhere;
/// incomplete input is buffered until the next call.
#[derive(Debug, Default)]
pub struct SseParser {
    partial: Vec<u8>,
    buffer: String,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    /// Creates a new SSE parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a chunk of text and returns any complete events.
    pub fn parse(&mut self, chunk: &str) -> Vec<SseEvent> {
        self.buffer.push_str(chunk);
        let mut events = Vec::new();

        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.parse_line(line) {
                events.push(event);
            }
        }

        events
    }

    /// Parses raw bytes, holding back an incomplete trailing UTF-8 sequence.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>, Utf8Error> {
        self.partial.extend_from_slice(bytes);
        let valid = match std::str::from_utf8(&self.partial) {
            Ok(_) => self.partial.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(e),
        };
        let rest = self.partial.split_off(valid);
        let complete = std::mem::replace(&mut self.partial, rest);
        let text = std::str::from_utf8(&complete)?;
        Ok(self.parse(text))
    }

    /// Flushes an event left unterminated at end of input.
    pub fn flush(&mut self) -> Option<SseEvent> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.parse_line(line.trim_end_matches('\r'));
        }
        self.take_event()
    }

    fn parse_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.take_event();
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }

        None
    }

    fn take_event(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        Some(SseEvent {
            event,
            data: std::mem::take(&mut self.data).join("\n"),
        })
    }
}
