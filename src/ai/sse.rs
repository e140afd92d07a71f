//! Incremental Server-Sent Events parser for streaming responses.
//!
//! Handles multi-line `data:` fields, `event:` types, comment lines,
//! `\r\n` line endings, and multi-byte characters split across chunks.
//!
//! ```
//! use screenwise::ai::sse::SseLineParser;
//!
//! let mut parser = SseLineParser::new();
//! let events = parser.push(b"data: {\"a\":1}\n\ndata: tail");
//! assert_eq!(events.len(), 1);
//! assert_eq!(parser.flush().map(|e| e.data), Some("tail".to_owned()));
//! ```

/// A parsed Server-Sent Event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The `event:` field, if present.
    pub event_type: Option<String>,
    /// All `data:` lines joined with `\n`.
    pub data: String,
}

#[derive(Debug, Default)]
struct PendingEvent {
    event_type: Option<String>,
    data_lines: Vec<String>,
}

impl PendingEvent {
    fn take(&mut self) -> Option<SseEvent> {
        if self.data_lines.is_empty() {
            self.event_type = None;
            return None;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(SseEvent {
            event_type: self.event_type.take(),
            data,
        })
    }

    fn line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.take();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => self.data_lines.push(value.to_owned()),
            "event" => self.event_type = Some(value.to_owned()),
            _ => {}
        }
        None
    }
}

/// Feed raw bytes, collect complete events.
#[derive(Debug, Default)]
pub struct SseLineParser {
    line_buffer: Vec<u8>,
    pending: PendingEvent,
}

impl SseLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk and return every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();
        for &byte in chunk {
            if byte != b'\n' {
                self.line_buffer.push(byte);
                continue;
            }
            let raw = std::mem::take(&mut self.line_buffer);
            let line = String::from_utf8_lossy(&raw);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(event) = self.pending.line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Emit whatever is left once the byte stream has ended.
    pub fn flush(&mut self) -> Option<SseEvent> {
        if !self.line_buffer.is_empty() {
            let raw = std::mem::take(&mut self.line_buffer);
            let line = String::from_utf8_lossy(&raw);
            let line = line.strip_suffix('\r').unwrap_or(&line).to_owned();
            if let Some(event) = self.pending.line(&line) {
                return Some(event);
            }
        }
        self.pending.take()
    }
}
