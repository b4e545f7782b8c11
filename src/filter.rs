//! Consumer-side stop marker suppression for streamed output.
//!
//! The streaming driver forwards chunks exactly as the transport delivers
//! them, so the marker can arrive whole, split across chunks, or one
//! character per chunk. A [`MarkerFilter`] sits between the raw chunks and the
//! display and guarantees the marker is never emitted.

use futures::{ready, Stream};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::errors::{ContinuationError, ContinuationResult};
use crate::marker::StopMarker;

/// Outcome of feeding one chunk to a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterStep {
    /// Text that is safe to display (possibly empty).
    Emit(String),
    /// The marker was seen; carries the safe text preceding it.
    Finished(String),
}

/// Incremental marker filter.
pub trait MarkerFilter: Send {
    /// Feeds one delivered chunk.
    fn push(&mut self, chunk: &str) -> FilterStep;

    /// Releases text held back when the stream ended without a marker.
    fn flush(&mut self) -> String;
}

/// Filter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Run-length gating for one-character markers, lookback otherwise.
    #[default]
    Auto,
    /// Run-length gating; requires a one-character repeated marker.
    RunLength,
    /// General substring lookback.
    Lookback,
}

/// Builds the filter for `marker` according to `mode`.
pub fn filter_for(
    marker: &StopMarker,
    mode: FilterMode,
) -> ContinuationResult<Box<dyn MarkerFilter>> {
    match (mode, marker.sentinel()) {
        (FilterMode::Auto | FilterMode::RunLength, Some((sentinel, run_len))) => {
            Ok(Box::new(RunLengthFilter::new(sentinel, run_len)))
        }
        (FilterMode::RunLength, None) => Err(ContinuationError::validation_param(
            format!("Run-length filtering needs a repeated single-character marker, got {marker:?}"),
            "filter",
        )),
        (FilterMode::Auto | FilterMode::Lookback, _) => Ok(Box::new(LookbackFilter::new(marker))),
    }
}

/// Run-length gating for a marker made of one repeated sentinel character.
///
/// Consecutive sentinels are counted across chunk boundaries and withheld.
/// Once the run reaches the marker length generation is over; a run broken by
/// other text was a false alarm and is flushed ahead of that text.
#[derive(Debug, Clone)]
pub struct RunLengthFilter {
    sentinel: char,
    run_len: usize,
    pending: usize,
}

impl RunLengthFilter {
    /// Creates a filter for `run_len` repetitions of `sentinel`.
    pub fn new(sentinel: char, run_len: usize) -> Self {
        Self {
            sentinel,
            run_len: run_len.max(1),
            pending: 0,
        }
    }

    /// Number of sentinels currently withheld.
    pub fn pending(&self) -> usize {
        self.pending
    }

    fn pending_run(&self, count: usize) -> String {
        std::iter::repeat(self.sentinel).take(count).collect()
    }
}

impl MarkerFilter for RunLengthFilter {
    fn push(&mut self, chunk: &str) -> FilterStep {
        let mut text = self.pending_run(self.pending);
        text.push_str(chunk);

        let marker = self.pending_run(self.run_len);
        if let Some(pos) = text.find(&marker) {
            self.pending = 0;
            text.truncate(pos);
            return FilterStep::Finished(text);
        }

        // A trailing run may still grow into the marker with the next chunk.
        let trailing = text.chars().rev().take_while(|&c| c == self.sentinel).count();
        let cut = text.len() - trailing * self.sentinel.len_utf8();
        text.truncate(cut);
        self.pending = trailing;
        FilterStep::Emit(text)
    }

    fn flush(&mut self) -> String {
        let run = self.pending_run(self.pending);
        self.pending = 0;
        run
    }
}

/// Lookback filter for arbitrary markers.
///
/// Holds back at most `marker_len - 1` trailing characters, and only those
/// that could still be the beginning of the marker.
#[derive(Debug, Clone)]
pub struct LookbackFilter {
    marker: String,
    marker_chars: usize,
    buffer: String,
}

impl LookbackFilter {
    /// Creates a lookback filter for `marker`.
    pub fn new(marker: &StopMarker) -> Self {
        Self {
            marker: marker.as_str().to_string(),
            marker_chars: marker.len_chars(),
            buffer: String::new(),
        }
    }

    /// Text currently held back.
    pub fn held(&self) -> &str {
        &self.buffer
    }

    /// Byte offset where the held-back suffix starts.
    fn held_start(&self) -> usize {
        let max = self.marker_chars.saturating_sub(1);
        let mut start = self.buffer.len();
        for (count, (idx, _)) in self.buffer.char_indices().rev().enumerate() {
            if count >= max {
                break;
            }
            if self.marker.starts_with(&self.buffer[idx..]) {
                start = idx;
            }
        }
        start
    }
}

impl MarkerFilter for LookbackFilter {
    fn push(&mut self, chunk: &str) -> FilterStep {
        self.buffer.push_str(chunk);

        if let Some(pos) = self.buffer.find(&self.marker) {
            let mut text = std::mem::take(&mut self.buffer);
            text.truncate(pos);
            return FilterStep::Finished(text);
        }

        let start = self.held_start();
        let held = self.buffer.split_off(start);
        FilterStep::Emit(std::mem::replace(&mut self.buffer, held))
    }

    fn flush(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

pin_project! {
    /// Stream adapter that runs every chunk through a [`MarkerFilter`].
    ///
    /// Stops pulling from the inner stream once the marker is complete, so
    /// anything the model produced after it is never shown.
    pub struct FilteredStream<S> {
        #[pin]
        inner: S,
        filter: Box<dyn MarkerFilter>,
        done: bool,
    }
}

impl<S> FilteredStream<S> {
    /// Wraps `inner` with `filter`.
    pub fn new(inner: S, filter: Box<dyn MarkerFilter>) -> Self {
        Self {
            inner,
            filter,
            done: false,
        }
    }
}

impl<S> Stream for FilteredStream<S>
where
    S: Stream<Item = ContinuationResult<String>>,
{
    type Item = ContinuationResult<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if *this.done {
                return Poll::Ready(None);
            }

            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => match this.filter.push(&chunk) {
                    FilterStep::Emit(text) if text.is_empty() => continue,
                    FilterStep::Emit(text) => return Poll::Ready(Some(Ok(text))),
                    FilterStep::Finished(text) => {
                        *this.done = true;
                        if !text.is_empty() {
                            return Poll::Ready(Some(Ok(text)));
                        }
                    }
                },
                Some(Err(e)) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    *this.done = true;
                    let rest = this.filter.flush();
                    if !rest.is_empty() {
                        return Poll::Ready(Some(Ok(rest)));
                    }
                }
            }
        }
    }
}
