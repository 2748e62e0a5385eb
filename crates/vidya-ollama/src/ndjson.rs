// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental line framing for newline-delimited JSON streams.
//!
//! Network reads split the upstream body at arbitrary byte boundaries, so a
//! JSON line routinely arrives across two or more chunks. The framer keeps
//! the unterminated tail between pushes and only ever hands back complete
//! lines.

/// Streaming line splitter with partial-line carryover.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one read's bytes; returns every line completed by it.
    ///
    /// Blank lines are dropped. Invalid UTF-8 is replaced rather than
    /// failing the stream.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.push_str(&String::from_utf8_lossy(bytes));

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=pos).collect();
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
        lines
    }

    /// The unterminated tail, if the stream ended without a final newline.
    pub fn finish(self) -> Option<String> {
        let tail = self.buf.trim();
        if tail.is_empty() {
            None
        } else {
            Some(tail.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_lines_come_out_as_pushed() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert!(framer.finish().is_none());
    }

    #[test]
    fn line_split_across_reads_is_reassembled() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"{\"message\":{\"content\":\"Hel").is_empty());
        let lines = framer.push(b"lo\"}}\n");
        assert_eq!(lines, vec!["{\"message\":{\"content\":\"Hello\"}}"]);
    }

    #[test]
    fn blank_lines_are_dropped() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"\n\n{\"x\":1}\r\n\n");
        assert_eq!(lines, vec!["{\"x\":1}"]);
    }

    #[test]
    fn unterminated_tail_survives_until_finish() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"{\"done\":true}").is_empty());
        assert_eq!(framer.finish().as_deref(), Some("{\"done\":true}"));
    }

    #[test]
    fn one_byte_at_a_time() {
        let mut framer = LineFramer::new();
        let input = b"{\"n\":1}\n";
        let mut lines = Vec::new();
        for byte in input {
            lines.extend(framer.push(std::slice::from_ref(byte)));
        }
        assert_eq!(lines, vec!["{\"n\":1}"]);
    }
}
