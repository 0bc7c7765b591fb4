// Server-sent event framing over a chunked byte stream
use crate::error::SyncError;
use bytes::{Buf, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use tracing::warn;

/// Longest line kept while waiting for its terminator.
pub const MAX_LINE_BYTES: usize = 1 << 20;
/// Largest `data` payload assembled for one event.
pub const MAX_EVENT_BYTES: usize = 4 << 20;

/// Accumulates bytes and yields the `data` payload of each complete event.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
    /// Bytes of `buffer` already searched for a line terminator
    scanned: usize,
    /// Inside an oversized line; skip up to its terminator
    discarding: bool,
    data_lines: Vec<String>,
    data_len: usize,
    oversized_event: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every event completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        loop {
            let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') else {
                self.scanned = self.buffer.len();
                if self.buffer.len() > MAX_LINE_BYTES {
                    warn!("Dropping event-stream line over {} bytes", MAX_LINE_BYTES);
                    self.buffer.clear();
                    self.scanned = 0;
                    self.discarding = true;
                }
                break;
            };
            let pos = self.scanned + offset;
            self.scanned = 0;

            let mut line = self.buffer.split_to(pos + 1);
            // Tail of a line already dropped, or a complete line past the cap
            if self.discarding || pos > MAX_LINE_BYTES {
                if !self.discarding {
                    warn!("Dropping event-stream line over {} bytes", MAX_LINE_BYTES);
                }
                self.discarding = false;
                continue;
            }
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(pos - 1);
            }
            let line = String::from_utf8_lossy(&line).into_owned();
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        events
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if std::mem::take(&mut self.oversized_event) {
                warn!("Dropping event with data over {} bytes", MAX_EVENT_BYTES);
                return None;
            }
            if self.data_lines.is_empty() {
                return None;
            }
            let data = self.data_lines.join("\n");
            self.data_lines.clear();
            self.data_len = 0;
            return Some(data);
        }
        // Comment / keep-alive
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" && !self.oversized_event {
            self.data_len += value.len() + 1;
            if self.data_len > MAX_EVENT_BYTES {
                self.oversized_event = true;
                self.data_lines.clear();
                self.data_len = 0;
            } else {
                self.data_lines.push(value.to_string());
            }
        }
        None
    }

    pub fn pending_bytes(&self) -> usize {
        self.buffer.remaining()
    }
}

/// Turn a response body into a stream of event payloads.
pub fn event_stream<S, E>(body: S) -> impl Stream<Item = Result<String, SyncError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::try_stream! {
        let mut decoder = SseDecoder::new();
        let mut body = Box::pin(body);
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| SyncError::Network(e.to_string()))?;
            for event in decoder.push(&chunk) {
                yield event;
            }
        }
        tracing::debug!(
            "Event stream ended with {} undelivered bytes",
            decoder.pending_bytes()
        );
    }
}
