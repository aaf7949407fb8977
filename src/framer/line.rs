//! Line framer implementation
//!
//! Byte-at-a-time state machine over a `BytesMut` line buffer.

use bytes::{BufMut, BytesMut};

/// Byte the modem sends to request follow-up payload data
pub const PROMPT_MARKER: u8 = b'>';

/// A unit emitted by the framer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete, trimmed, non-empty line
    Line(String),

    /// The modem asked for more data; carries whatever preceded the `>`
    Prompt(String),
}

impl Frame {
    /// Text as it is stored in the response queue
    ///
    /// Prompts keep their marker so readers can recognize them.
    pub fn into_queued(self) -> String {
        match self {
            Frame::Line(line) => line,
            Frame::Prompt(mut partial) => {
                partial.push(PROMPT_MARKER as char);
                partial
            }
        }
    }

    /// True for prompt frames
    pub fn is_prompt(&self) -> bool {
        matches!(self, Frame::Prompt(_))
    }
}

/// Accumulates raw bytes and emits frames
///
/// The buffer never grows past `capacity`; excess bytes of a long line are
/// dropped until the next linefeed.
#[derive(Debug)]
pub struct LineFramer {
    /// Current partial line
    buffer: BytesMut,

    /// Maximum bytes kept per line
    capacity: usize,

    /// Bytes dropped from the current line
    truncated: usize,
}

impl LineFramer {
    /// Create a framer holding at most `capacity` bytes per line
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            capacity,
            truncated: 0,
        }
    }

    /// Feed one byte, returning a frame if it completed one
    pub fn push_byte(&mut self, byte: u8) -> Option<Frame> {
        if byte == PROMPT_MARKER {
            let partial = String::from_utf8_lossy(&self.buffer).into_owned();
            self.reset();
            return Some(Frame::Prompt(partial));
        }

        if self.buffer.len() < self.capacity {
            self.buffer.put_u8(byte);
        } else {
            self.truncated += 1;
        }

        if byte != b'\n' {
            return None;
        }

        while matches!(self.buffer.last(), Some(b'\r') | Some(b'\n')) {
            self.buffer.truncate(self.buffer.len() - 1);
        }

        // The space a modem sends after `> ` leaves a whitespace-only line
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.reset();
            return None;
        }

        if self.truncated > 0 {
            tracing::warn!(
                "Line exceeded {} bytes, dropped {} bytes",
                self.capacity,
                self.truncated
            );
        }

        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.reset();
        Some(Frame::Line(line))
    }

    /// Feed a burst of bytes, handing every completed frame to `sink`
    pub fn feed<F>(&mut self, data: &[u8], mut sink: F)
    where
        F: FnMut(Frame),
    {
        for &byte in data {
            if let Some(frame) = self.push_byte(byte) {
                sink(frame);
            }
        }
    }

    /// Feed a burst of bytes and collect the completed frames
    pub fn decode(&mut self, data: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        self.feed(data, |frame| frames.push(frame));
        frames
    }

    /// Bytes currently held for the partial line
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Line capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard the partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.truncated = 0;
    }
}
