//! Append-only buffer turning text increments into growing snapshots.
//!
//! ```
//! use screenwise::overlay::accumulator::ResponseAccumulator;
//!
//! let mut acc = ResponseAccumulator::new();
//! assert_eq!(acc.push("Hel"), "Hel");
//! assert_eq!(acc.push("lo"), "Hello");
//! assert_eq!(acc.finish(), "Hello");
//! ```

/// Accumulates streamed text in arrival order.
///
/// Every increment is appended exactly once and yields a copy of the whole
/// buffer, even when it adds nothing. The buffer never shrinks, so successive snapshots are
/// non-decreasing in length and the last one equals the concatenation of
/// every increment.
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    buffer: String,
    increments: usize,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an increment and return the new snapshot.
    pub fn push(&mut self, increment: &str) -> String {
        self.buffer.push_str(increment);
        self.increments += 1;
        self.buffer.clone()
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Number of increments seen.
    pub fn increments(&self) -> usize {
        self.increments
    }

    /// Whether the accumulated text has any non-whitespace content.
    pub fn has_content(&self) -> bool {
        !self.buffer.trim().is_empty()
    }

    /// Consume the accumulator and return the final text.
    pub fn finish(self) -> String {
        self.buffer
    }
}
