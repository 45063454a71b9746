//! Positions in source files.
//!
//! A [`Span`] is the start of a token or node plus its length in bytes. That
//! is all diagnostics need: they render `(line, col)` and nothing wider.
//! [`Location`] adds the file.

use std::fmt;

use crate::FileId;

/// Start position and byte length of a piece of source text.
///
/// Lines and columns start at 1. Columns count bytes, not characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub line: u32,
    pub col: u32,
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// A zero-length span, used for positions such as end of file.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, 0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Column just past the last byte.
    #[inline]
    fn end_col(&self) -> u32 {
        self.col + self.len
    }

    /// The smallest span covering both, starting at whichever comes first.
    ///
    /// Without line lengths a span cannot cross lines exactly, so when the
    /// two are on different lines the result keeps the earlier start and
    /// adds the lengths.
    pub fn merge(self, other: Span) -> Span {
        let (first, second) = if (other.line, other.col) < (self.line, self.col) {
            (other, self)
        } else {
            (self, other)
        };
        let len = if first.line == second.line {
            first.end_col().max(second.end_col()) - first.col
        } else {
            first.len + second.len
        };
        Span::new(first.line, first.col, len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.line, self.col, self.len)
    }
}

/// A span in a particular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub file: FileId,
    pub span: Span,
}

impl Location {
    #[inline]
    pub fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_are_empty() {
        assert!(Span::point(2, 4).is_empty());
        assert_eq!(Span::new(2, 4, 6).len(), 6);
    }

    #[test]
    fn display_and_debug() {
        let span = Span::new(3, 15, 5);
        assert_eq!(span.to_string(), "3:15");
        assert_eq!(format!("{span:?}"), "3:15+5");
    }

    #[test]
    fn merge_on_one_line_covers_both() {
        let left = Span::new(1, 5, 3);
        let right = Span::new(1, 10, 3);
        assert_eq!(left.merge(right), Span::new(1, 5, 8));
        assert_eq!(right.merge(left), Span::new(1, 5, 8));
    }

    #[test]
    fn merge_keeps_an_enclosing_span() {
        let outer = Span::new(1, 2, 20);
        assert_eq!(outer.merge(Span::new(1, 6, 3)), outer);
    }

    #[test]
    fn merge_across_lines_starts_at_the_earlier_span() {
        let first = Span::new(1, 5, 10);
        let second = Span::new(3, 1, 5);
        assert_eq!(second.merge(first), Span::new(1, 5, 15));
    }

    #[test]
    fn location_display_includes_file() {
        let location = Location::new(FileId::new(2), Span::new(4, 7, 1));
        assert_eq!(location.to_string(), "file_2:4:7");
    }
}
