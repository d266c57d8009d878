use serde::Serialize;

use crate::core::key::Position;

/// Source span of a node.
///
/// Script grammars report byte offsets; the template grammar reports
/// line/column pairs. Both resolve to byte offsets through a [`LineIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Span {
    Offsets { start: usize, end: usize },
    LineColumn { start: Position, end: Position },
}

impl Span {
    pub fn offsets(start: usize, end: usize) -> Self {
        Span::Offsets { start, end }
    }

    /// Byte range of this span in the text `index` was built from.
    pub fn resolve(&self, index: &LineIndex) -> (usize, usize) {
        match *self {
            Span::Offsets { start, end } => (start, end),
            Span::LineColumn { start, end } => (index.offset(start), index.offset(end)),
        }
    }

    /// Line/column range of this span.
    pub fn positions(&self, index: &LineIndex) -> (Position, Position) {
        match *self {
            Span::Offsets { start, end } => (index.position(start), index.position(end)),
            Span::LineColumn { start, end } => (start, end),
        }
    }
}

/// Line start offsets of a text, for converting between byte offsets and
/// line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { text, line_starts }
    }

    /// Position (1-based line, 0-based character column) of a byte offset.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line - 1,
        };
        let line_start = self.line_starts[line];
        let col = self
            .text
            .get(line_start..offset)
            .map_or(offset - line_start, |s| s.chars().count());
        Position {
            line: line + 1,
            col,
        }
    }

    /// Byte offset of a position; columns past the end of the line clamp to it.
    pub fn offset(&self, position: Position) -> usize {
        let Some(&line_start) = self.line_starts.get(position.line.saturating_sub(1)) else {
            return self.text.len();
        };
        let line_end = self
            .line_starts
            .get(position.line)
            .copied()
            .unwrap_or(self.text.len());
        let line = self.text[line_start..line_end].trim_end_matches(['\n', '\r']);
        line.char_indices()
            .nth(position.col)
            .map_or(line_start + line.len(), |(i, _)| line_start + i)
    }
}
