//! Incremental decoding of the event-stream body.

use relay_protocol::{parse_data_line, StreamEvent};

/// Longest line kept while waiting for its newline.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Turns arbitrarily chunked response bytes into [`StreamEvent`]s.
///
/// Incomplete lines, including ones that end inside a multi-byte character,
/// are buffered until the rest arrives. Lines without the `data: ` prefix are
/// ignored and payloads that fail to parse are logged and skipped. A line
/// longer than [`MAX_LINE_BYTES`] is dropped up to its newline.
#[derive(Debug, Default)]
pub struct EventDecoder {
    pending: Vec<u8>,
    /// Bytes of `pending` already known to hold no newline.
    scanned: usize,
    discarding: bool,
    skipped: usize,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every complete line in `chunk` plus what was buffered before it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();
        let mut start = 0;
        // '\n' never occurs inside a multi-byte UTF-8 sequence.
        while let Some(offset) = self.pending[self.scanned..].iter().position(|&b| b == b'\n') {
            let end = self.scanned + offset;
            if self.discarding {
                self.discarding = false;
            } else {
                decode_line(&self.pending[start..end], &mut self.skipped, &mut events);
            }
            start = end + 1;
            self.scanned = start;
        }
        self.pending.drain(..start);
        self.scanned = self.pending.len();

        if self.pending.len() > MAX_LINE_BYTES {
            if !self.discarding {
                self.skipped += 1;
                tracing::warn!(limit = MAX_LINE_BYTES, "dropping oversized event line");
            }
            self.pending.clear();
            self.scanned = 0;
            self.discarding = true;
        }
        events
    }

    /// Flush a trailing line that never got its newline.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        let line = std::mem::take(&mut self.pending);
        self.scanned = 0;
        if !std::mem::take(&mut self.discarding) && !line.is_empty() {
            decode_line(&line, &mut self.skipped, &mut events);
        }
        events
    }

    /// Number of lines dropped: malformed `data:` payloads and oversized lines.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

fn decode_line(line: &[u8], skipped: &mut usize, events: &mut Vec<StreamEvent>) {
    let line = String::from_utf8_lossy(line);
    match parse_data_line(&line) {
        None => {}
        Some(Ok(event)) => events.push(event),
        Some(Err(err)) => {
            *skipped += 1;
            tracing::warn!(error = %err, line = %line, "skipping malformed event");
        }
    }
}
