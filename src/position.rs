//! Source positions and spans.
//!
//! Offsets are absolute UTF-8 byte indices into the input, matching
//! `rowan::TextSize`/`TextRange` so the rest of the crate can reuse those
//! types for arithmetic instead of hand-rolling another offset newtype.

use std::sync::Arc;

use rowan::{TextRange, TextSize};

use crate::char_classifier::is_line_terminator;

/// A 1-based line, 0-based column position, matching the original's
/// `{line, column}` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Start/end positions for a node or token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Loc {
    pub start: Position,
    pub end: Position,
}

/// A node or token's extent: byte offsets plus resolved line/column.
///
/// `filename` is only populated when `ParserOptions::source_filename` is
/// set; it is shared (not cloned per-span) via `Arc<str>`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub loc: Loc,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<Arc<str>>,
}

impl Eq for Span {}

impl Span {
    pub fn range(&self) -> TextRange {
        TextRange::new(TextSize::from(self.start), TextSize::from(self.end))
    }
}

/// Tracks line starts so offsets can be resolved to `Position`s in O(log n).
///
/// Built incrementally by the tokenizer as it scans forward (it never needs
/// to resolve a position behind the cursor), and consulted by the node
/// factory whenever a node or token is finalized.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line. `line_starts[0] == 0`.
    line_starts: Vec<u32>,
    start_line: u32,
}

impl LineIndex {
    /// `start_line` implements `ParserOptions::start_line`: every resolved
    /// line number is offset by `start_line - 1`.
    pub fn new(start_line: u32) -> Self {
        Self {
            line_starts: vec![0],
            start_line,
        }
    }

    /// Record a line terminator ending at `offset` (i.e. the next line
    /// starts at `offset`). CRLF must be recorded once, at the offset past
    /// the LF, not twice.
    pub fn record_line_start(&mut self, offset: u32) {
        if self.line_starts.last() != Some(&offset) {
            self.line_starts.push(offset);
        }
    }

    /// Resolve a byte offset to a `Position`. Offset must not precede the
    /// last recorded line start (callers only resolve forward of the
    /// cursor, per the tokenizer's monotonic scan).
    pub fn position(&self, offset: u32) -> Position {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        Position::new(
            self.start_line + line_idx as u32,
            offset.saturating_sub(line_start),
        )
    }

    /// Scan `text` and record every line terminator found, honoring CRLF
    /// collapsing (recorded once, after the LF) and the astral LS/PS
    /// terminators per the character classifier.
    pub fn advance(&mut self, text: &str, base_offset: u32) {
        let mut chars = text.char_indices().peekable();
        while let Some((i, ch)) = chars.next() {
            if !is_line_terminator(ch) {
                continue;
            }
            let mut end = i + ch.len_utf8();
            if ch == '\r' {
                if let Some(&(j, '\n')) = chars.peek() {
                    chars.next();
                    end = j + 1;
                }
            }
            self.record_line_start(base_offset + end as u32);
        }
    }
}
