//! Newline framing for the server byte stream.
//!
//! Reads from the transport are not aligned with protocol lines: one chunk may
//! carry several lines, none, or the head of a line whose tail arrives in the
//! next read. [`LineBuffer`] sits between the read loop and the classifier and
//! only hands out complete lines.

use tracing::warn;

/// Default upper bound on a single unterminated line.
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// Accumulates raw chunks and yields complete, newline-stripped lines.
///
/// Bytes are buffered undecoded so a multi-byte UTF-8 sequence split across
/// two reads is reassembled before decoding.
#[derive(Debug)]
pub struct LineBuffer {
    pending: Vec<u8>,
    max_line_bytes: usize,
}

impl LineBuffer {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_line_bytes: max_line_bytes.max(1),
        }
    }

    /// Feed one raw chunk and return every line it completed, in order.
    ///
    /// Empty lines are dropped. A pending line that grows past the configured
    /// limit without a terminator is emitted as-is.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.pending.extend_from_slice(&rest[..pos]);
            rest = &rest[pos + 1..];
            if let Some(line) = self.take_line() {
                lines.push(line);
            }
        }

        self.pending.extend_from_slice(rest);
        if self.pending.len() > self.max_line_bytes {
            warn!(
                bytes = self.pending.len(),
                limit = self.max_line_bytes,
                "unterminated server line exceeds limit, emitting early"
            );
            if let Some(line) = self.take_line() {
                lines.push(line);
            }
        }

        lines
    }

    /// Drain whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        self.take_line()
    }

    /// Bytes held back waiting for a terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn take_line(&mut self) -> Option<String> {
        let mut raw = std::mem::take(&mut self.pending);
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        if raw.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(&raw).into_owned())
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_BYTES)
    }
}
