//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes are buffered until a full line is available, so chunk boundaries may
//! fall anywhere, including inside a multi-byte UTF-8 sequence.

use thiserror::Error;

const DEFAULT_EVENT_NAME: &str = "message";

/// Longest line accepted while waiting for its newline.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SseError {
    #[error("event stream line exceeds {limit} bytes without a newline")]
    LineTooLong { limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    last_event_id: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the events it completed, in order. Fails
    /// once an unterminated line grows past [`MAX_LINE_BYTES`]; the decoder
    /// should then be dropped along with its connection.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, SseError> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.buffer[consumed..].iter().position(|byte| *byte == b'\n') {
            let end = consumed + offset;
            let mut line = &self.buffer[consumed..end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            let line = String::from_utf8_lossy(line).into_owned();
            consumed = end + 1;

            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        self.buffer.drain(..consumed);

        if self.buffer.len() > MAX_LINE_BYTES {
            self.buffer.clear();
            return Err(SseError::LineTooLong {
                limit: MAX_LINE_BYTES,
            });
        }

        Ok(events)
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_owned()),
            "data" => self.data.push(value.to_owned()),
            "id" if !value.contains('\0') => self.last_event_id = Some(value.to_owned()),
            _ => {}
        }
        None
    }

    // Unlike browsers, a named event without data is still delivered:
    // `event: connected` often arrives bare.
    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if event.is_none() && self.data.is_empty() {
            return None;
        }

        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_NAME.to_owned()),
            data,
            id: self.last_event_id.clone(),
        })
    }
}
