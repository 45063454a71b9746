//! Parser infrastructure for Ember.
//!
//! Provides the main [`Parser`] struct with token navigation, newline
//! handling and error recovery. Expression, statement and declaration
//! parsing live in sibling modules as further `impl Parser` blocks.

use bumpalo::Bump;
use ember_core::{Diagnostic, FileId, LexError, Location, ParseError, ParseErrorKind, Span};

use crate::ast::{Expr, SyntaxTree};
use crate::lexer::{Lexer, Token, TokenKind};

/// The main parser for Ember source code.
///
/// The parser tokenizes the whole source up front and then navigates the
/// buffered tokens with arbitrary lookahead.
///
/// Line breaks end statements. Inside parentheses and brackets they are
/// insignificant; `nesting` counts how many such delimiters are open in the
/// innermost block.
pub struct Parser<'ast> {
    /// Buffered tokens; always ends with an EOF token.
    pub(super) buffer: Vec<Token<'ast>>,
    /// Current position in the buffer
    pub(super) position: usize,
    /// Accumulated parse errors
    pub(super) errors: Vec<ParseError>,
    /// Errors reported by the lexer
    pub(super) lex_errors: Vec<LexError>,
    /// Open parentheses/brackets in the current block
    pub(super) nesting: u32,
    /// Arena allocator for AST nodes
    pub(super) arena: &'ast Bump,
}

impl<'ast> Parser<'ast> {
    /// Create a new parser for the given source code.
    ///
    /// The source string is only needed during this call; all token lexemes
    /// are copied into the arena.
    pub fn new(source: &str, arena: &'ast Bump) -> Self {
        let mut lexer = Lexer::new(source, arena);
        let mut buffer = Vec::with_capacity(source.len() / 4 + 1);

        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            // Error tokens are dropped; the lexer keeps the error itself.
            if token.kind != TokenKind::Error {
                buffer.push(token);
            }
            if is_eof {
                break;
            }
        }

        Self {
            buffer,
            position: 0,
            errors: Vec::new(),
            lex_errors: lexer.take_errors(),
            nesting: 0,
            arena,
        }
    }

    /// Parse a complete source file.
    ///
    /// Always produces a tree; syntax errors are reported as diagnostics on
    /// the tree, ordered by position.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &str, file: FileId, arena: &'ast Bump) -> SyntaxTree<'ast> {
        let mut parser = Parser::new(source, arena);
        let (namespace, items) = parser.parse_file();

        let mut diagnostics: Vec<Diagnostic> = parser
            .lex_errors
            .into_iter()
            .map(|error| Diagnostic {
                location: Location::new(file, error.span()),
                error: error.into(),
            })
            .chain(parser.errors.into_iter().map(|error| Diagnostic {
                location: Location::new(file, error.span),
                error: error.into(),
            }))
            .collect();
        diagnostics.sort_by_key(|d| (d.location.span.line, d.location.span.col));

        tracing::debug!(
            file = %file,
            items = items.len(),
            errors = diagnostics.len(),
            "parsed source file"
        );

        SyntaxTree::new(file, namespace, items, diagnostics)
    }

    /// Parse a single expression, failing on the first error.
    pub fn expression(source: &str, arena: &'ast Bump) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut parser = Parser::new(source, arena);
        if let Some(error) = parser.lex_errors.first() {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                error.span(),
                error.to_string(),
            ));
        }
        let expr = parser.parse_expr(0)?;
        if !parser.is_eof() {
            let token = *parser.peek();
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                token.span,
                format!("unexpected {} after expression", token.kind),
            ));
        }
        Ok(expr)
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> &Token<'ast> {
        self.peek_nth(0)
    }

    /// Peek ahead n tokens without consuming. Past the end this yields EOF.
    pub fn peek_nth(&self, n: usize) -> &Token<'ast> {
        let last = self.buffer.len() - 1;
        &self.buffer[(self.position + n).min(last)]
    }

    /// Get the current token and advance to the next. EOF is never consumed.
    pub fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    /// The most recently consumed token.
    pub fn previous(&self) -> Option<&Token<'ast>> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.buffer.get(index))
    }

    /// Span of the most recently consumed token, or of the current one.
    pub(super) fn previous_span(&self) -> Span {
        self.previous().map(|t| t.span).unwrap_or(self.peek().span)
    }

    /// Check if the current token matches the given kind.
    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Check if the current token is EOF.
    pub fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// If the current token matches the given kind, consume it and return Some.
    /// Otherwise, return None without consuming.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Expect the current token to be of the given kind.
    /// If it matches, consume and return it. Otherwise, return an error.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = *self.peek();
            Err(ParseError::new(
                ParseErrorKind::ExpectedToken,
                token.span,
                format!("expected {}, found {}", kind, token.kind),
            ))
        }
    }

    /// Check if the current token is an identifier with the given name.
    /// This is used for contextual keywords such as `to`.
    pub fn check_contextual(&self, name: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Identifier && token.lexeme == name
    }

    /// Whether the current token starts a new line and newlines are significant.
    pub(super) fn at_line_break(&self) -> bool {
        self.nesting == 0 && self.peek().newline_before
    }

    /// Run `f` inside parentheses or brackets, where newlines are insignificant.
    pub(super) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    /// Run `f` inside a brace-delimited body, where newlines end statements again.
    pub(super) fn in_block<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.nesting, 0);
        let result = f(self);
        self.nesting = saved;
        result
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Record a parse error.
    pub fn error(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Require the end of a statement: `;`, a line break, `}` or EOF.
    pub(super) fn expect_statement_end(&mut self) -> Result<(), ParseError> {
        if self.eat(TokenKind::Semicolon).is_some()
            || self.peek().newline_before
            || self.check(TokenKind::RightBrace)
            || self.is_eof()
        {
            return Ok(());
        }
        let token = *self.peek();
        Err(ParseError::new(
            ParseErrorKind::ExpectedToken,
            token.span,
            format!("expected ';' or a line break, found {}", token.kind),
        ))
    }

    /// Synchronize after an error by skipping tokens until a safe point.
    ///
    /// `from` is the position where the failed construct started. Safe points
    /// are the start of a new line, a `;`, a closing brace or a declaration
    /// keyword; they only count once the parser has moved past `from`, so
    /// every failed construct consumes at least one token.
    pub fn synchronize(&mut self, from: usize) {
        while !self.is_eof() {
            if self.position > from {
                if self
                    .previous()
                    .is_some_and(|t| t.kind == TokenKind::Semicolon)
                {
                    return;
                }
                let token = self.peek();
                if token.newline_before
                    || matches!(
                        token.kind,
                        TokenKind::RightBrace
                            | TokenKind::Class
                            | TokenKind::Object
                            | TokenKind::Def
                            | TokenKind::Using
                            | TokenKind::Namespace
                    )
                {
                    return;
                }
            }
            self.advance();
        }
    }
}
