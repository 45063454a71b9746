//! Character cursor for the lexer.
//!
//! The cursor walks the source one `char` at a time and keeps the
//! line/column position that spans are built from. Line breaks crossed since
//! the last [`Cursor::take_line_break`] are remembered, because the parser
//! ends statements at line boundaries.

use ember_core::Span;

/// A saved position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    offset: u32,
    line: u32,
    column: u32,
}

pub struct Cursor<'src> {
    source: &'src str,
    at: Mark,
    line_break: bool,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            at: Mark {
                offset: 0,
                line: 1,
                column: 1,
            },
            line_break: false,
        }
    }

    fn rest(&self) -> &'src str {
        &self.source[self.at.offset as usize..]
    }

    /// The current position.
    #[inline]
    pub fn mark(&self) -> Mark {
        self.at
    }

    /// A zero-length span at the current position.
    pub fn point(&self) -> Span {
        Span::point(self.at.line, self.at.column)
    }

    /// The span from `start` to the current position.
    pub fn span_since(&self, start: Mark) -> Span {
        Span::new(start.line, start.column, self.at.offset - start.offset)
    }

    /// The source text from `start` to the current position.
    pub fn text_since(&self, start: Mark) -> &'src str {
        &self.source[start.offset as usize..self.at.offset as usize]
    }

    #[inline]
    pub fn at_start(&self) -> bool {
        self.at.offset == 0
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.at.offset as usize >= self.source.len()
    }

    /// The current character.
    #[inline]
    pub fn first(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Whether the current character satisfies `f`.
    #[inline]
    pub fn at(&self, f: impl Fn(char) -> bool) -> bool {
        self.first().is_some_and(f)
    }

    /// Consume one character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.first()?;
        let width = c.len_utf8() as u32;
        self.at.offset += width;
        if c == '\n' {
            self.at.line += 1;
            self.at.column = 1;
            self.line_break = true;
        } else {
            self.at.column += width;
        }
        Some(c)
    }

    /// Consume `c` if it is the current character.
    pub fn bump_if(&mut self, c: char) -> bool {
        let matched = self.first() == Some(c);
        if matched {
            self.bump();
        }
        matched
    }

    /// Consume `prefix` if the source continues with it.
    pub fn bump_prefix(&mut self, prefix: &str) -> bool {
        if !self.starts_with(prefix) {
            return false;
        }
        for _ in prefix.chars() {
            self.bump();
        }
        true
    }

    /// Consume characters while `f` holds and return them.
    pub fn bump_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.at;
        while self.at(&f) {
            self.bump();
        }
        self.text_since(start)
    }

    /// Whether a line break was consumed since the last call.
    pub fn take_line_break(&mut self) -> bool {
        std::mem::take(&mut self.line_break)
    }
}

#[inline]
pub fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}
