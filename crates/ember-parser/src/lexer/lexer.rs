//! Turns Ember source text into [`Token`]s.
//!
//! Lexemes are copied into the arena, so the source can be dropped once the
//! tree is built. Each token records whether a line break came before it;
//! the parser ends statements there.

use bumpalo::Bump;
use ember_core::LexError;

use super::cursor::{Cursor, Mark, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer for Ember source code.
///
/// `'src` is the borrowed source text and `'ast` the arena the lexemes are
/// copied into.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    errors: Vec<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Consume and return the next token. Malformed input yields a
    /// [`TokenKind::Error`] token and records a [`LexError`].
    pub fn next_token(&mut self) -> Token<'ast> {
        let trivia = self.skip_trivia();
        let newline_before = self.cursor.take_line_break();
        if let Err(error) = trivia {
            return self.error_token(error, newline_before);
        }

        if self.cursor.is_eof() {
            return Token::new(TokenKind::Eof, "", self.cursor.point(), true);
        }

        let start = self.cursor.mark();
        let scanned = match self.cursor.first() {
            Some('"') => self.string(start),
            Some('\'') => self.char(start),
            Some(c) if c.is_ascii_digit() => self.number(start),
            Some(c) if is_ident_start(c) => Ok(self.word()),
            _ => self.punctuation(start),
        };

        match scanned {
            Ok(kind) => {
                let lexeme = self.arena.alloc_str(self.cursor.text_since(start));
                Token::new(kind, lexeme, self.cursor.span_since(start), newline_before)
            }
            Err(error) => self.error_token(error, newline_before),
        }
    }

    fn error_token(&mut self, error: LexError, newline_before: bool) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span, newline_before)
    }

    /// Skip whitespace, comments and a leading byte order mark.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        if self.cursor.at_start() {
            self.cursor.bump_prefix("\u{FEFF}");
        }

        loop {
            if self.cursor.at(|c| c.is_ascii_whitespace()) {
                self.cursor.bump();
            } else if self.cursor.starts_with("//") {
                self.cursor.bump_while(|c| c != '\n');
            } else if self.cursor.starts_with("/*") {
                let start = self.cursor.mark();
                self.cursor.bump_prefix("/*");
                while !self.cursor.bump_prefix("*/") {
                    if self.cursor.bump().is_none() {
                        return Err(LexError::UnterminatedComment {
                            span: self.cursor.span_since(start),
                        });
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    /// `"..."` on a single line. Escapes are kept raw here and decoded by
    /// [`unescape`].
    fn string(&mut self, start: Mark) -> Result<TokenKind, LexError> {
        self.cursor.bump();
        loop {
            match self.cursor.first() {
                Some('"') => {
                    self.cursor.bump();
                    return Ok(TokenKind::StringLiteral);
                }
                Some('\\') => {
                    self.cursor.bump();
                    if self.cursor.at(|c| c != '\n') {
                        self.cursor.bump();
                    }
                }
                Some('\n') | None => {
                    return Err(LexError::UnterminatedString {
                        span: self.cursor.span_since(start),
                    });
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
    }

    /// `'c'` holding exactly one character, possibly escaped.
    fn char(&mut self, start: Mark) -> Result<TokenKind, LexError> {
        self.cursor.bump();
        let body = match self.cursor.first() {
            Some('\\') => {
                self.cursor.bump();
                self.cursor.at(|c| c != '\n')
            }
            Some(c) => c != '\'' && c != '\n',
            None => false,
        };
        if body {
            self.cursor.bump();
            if self.cursor.bump_if('\'') {
                return Ok(TokenKind::CharLiteral);
            }
        }

        // Resynchronize at the closing quote or the end of the line.
        self.cursor.bump_while(|c| c != '\'' && c != '\n');
        self.cursor.bump_if('\'');
        Err(LexError::InvalidCharLiteral {
            span: self.cursor.span_since(start),
        })
    }

    /// Decimal or `0x` hexadecimal integer; `_` separates digits.
    fn number(&mut self, start: Mark) -> Result<TokenKind, LexError> {
        if self.cursor.bump_prefix("0x") || self.cursor.bump_prefix("0X") {
            let digits = self.cursor.bump_while(|c| c.is_ascii_hexdigit() || c == '_');
            if digits.is_empty() {
                return Err(LexError::InvalidNumber {
                    span: self.cursor.span_since(start),
                    detail: "expected digits after radix prefix".to_string(),
                });
            }
        } else {
            self.cursor.bump_while(|c| c.is_ascii_digit() || c == '_');
        }

        if self.cursor.at(is_ident_start) {
            self.cursor.bump_while(is_ident_continue);
            return Err(LexError::InvalidNumber {
                span: self.cursor.span_since(start),
                detail: "identifier characters directly after a number".to_string(),
            });
        }
        Ok(TokenKind::IntLiteral)
    }

    fn word(&mut self) -> TokenKind {
        let text = self.cursor.bump_while(is_ident_continue);
        lookup_keyword(text).unwrap_or(TokenKind::Identifier)
    }

    fn punctuation(&mut self, start: Mark) -> Result<TokenKind, LexError> {
        let Some(c) = self.cursor.bump() else {
            return Ok(TokenKind::Eof);
        };
        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            '~' => TokenKind::Tilde,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '=' => self.pick('=', TokenKind::EqualEqual, TokenKind::Equal),
            '!' => self.pick('=', TokenKind::BangEqual, TokenKind::Bang),
            '&' => self.pick('&', TokenKind::AmpAmp, TokenKind::Amp),
            '|' => self.pick('|', TokenKind::PipePipe, TokenKind::Pipe),
            '>' if self.cursor.bump_if('>') => TokenKind::GreaterGreater,
            '>' => self.pick('=', TokenKind::GreaterEqual, TokenKind::Greater),
            '<' if self.cursor.bump_if('-') => TokenKind::LeftArrow,
            '<' if self.cursor.bump_if('<') => TokenKind::LessLess,
            '<' => self.pick('=', TokenKind::LessEqual, TokenKind::Less),
            ch => {
                return Err(LexError::UnexpectedChar {
                    ch,
                    span: self.cursor.span_since(start),
                });
            }
        };
        Ok(kind)
    }

    /// `double` if the next character is `second`, otherwise `single`.
    fn pick(&mut self, second: char, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.cursor.bump_if(second) { double } else { single }
    }
}

impl<'ast> Iterator for Lexer<'_, 'ast> {
    type Item = Token<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        (token.kind != TokenKind::Eof).then_some(token)
    }
}

/// Decode the escapes in the body of a string or character literal.
///
/// Unknown escapes are kept verbatim, backslash included.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let decoded = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some(c @ ('\\' | '"' | '\'')) => c,
            Some(other) => {
                out.push('\\');
                other
            }
            None => '\\',
        };
        out.push(decoded);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::Span;

    fn tokenize(source: &str) -> Vec<(TokenKind, String)> {
        let arena = Bump::new();
        Lexer::new(source, &arena)
            .map(|t| (t.kind, t.lexeme.to_string()))
            .collect()
    }

    fn token_kinds(source: &str) -> Vec<TokenKind> {
        let arena = Bump::new();
        Lexer::new(source, &arena).map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            tokenize("def val int Point"),
            vec![
                (TokenKind::Def, "def".to_string()),
                (TokenKind::Val, "val".to_string()),
                (TokenKind::Identifier, "int".to_string()),
                (TokenKind::Identifier, "Point".to_string()),
            ]
        );
    }

    #[test]
    fn keyword_prefix_is_identifier() {
        assert_eq!(token_kinds("iffy values"), vec![TokenKind::Identifier; 2]);
    }

    #[test]
    fn literals() {
        assert_eq!(
            token_kinds(r#"42 0xFF "hi" 'c' '\n' true null"#),
            vec![
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::StringLiteral,
                TokenKind::CharLiteral,
                TokenKind::CharLiteral,
                TokenKind::True,
                TokenKind::Null,
            ]
        );
    }

    #[test]
    fn operators() {
        assert_eq!(
            token_kinds("<- <= << < == = != ! && & || | >= >>"),
            vec![
                TokenKind::LeftArrow,
                TokenKind::LessEqual,
                TokenKind::LessLess,
                TokenKind::Less,
                TokenKind::EqualEqual,
                TokenKind::Equal,
                TokenKind::BangEqual,
                TokenKind::Bang,
                TokenKind::AmpAmp,
                TokenKind::Amp,
                TokenKind::PipePipe,
                TokenKind::Pipe,
                TokenKind::GreaterEqual,
                TokenKind::GreaterGreater,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            token_kinds("a // line\n/* block\n */ b"),
            vec![TokenKind::Identifier, TokenKind::Identifier]
        );
    }

    #[test]
    fn newline_flag() {
        let arena = Bump::new();
        let tokens: Vec<_> = Lexer::new("a b\nc /* x\n */ d", &arena).collect();
        let flags: Vec<_> = tokens.iter().map(|t| t.newline_before).collect();
        assert_eq!(flags, vec![false, false, true, true]);
    }

    #[test]
    fn spans() {
        let arena = Bump::new();
        let tokens: Vec<_> = Lexer::new("val x\n  = 10", &arena).collect();
        assert_eq!(tokens[0].span, Span::new(1, 1, 3));
        assert_eq!(tokens[2].span, Span::new(2, 3, 1));
        assert_eq!(tokens[3].span, Span::new(2, 5, 2));
    }

    #[test]
    fn unterminated_string() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("\"abc\nx", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        let errors = lexer.take_errors();
        assert!(matches!(errors[0], LexError::UnterminatedString { .. }));
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
    }

    #[test]
    fn invalid_char_literal() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("'ab' x", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexError::InvalidCharLiteral { .. }
        ));
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
    }

    #[test]
    fn unexpected_character() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("a # b", &arena);
        lexer.next_token();
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert!(lexer.has_errors());
        assert!(matches!(
            lexer.take_errors()[0],
            LexError::UnexpectedChar { ch: '#', .. }
        ));
    }

    #[test]
    fn unterminated_comment() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("/* never closed", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexError::UnterminatedComment { .. }
        ));
    }

    #[test]
    fn number_followed_by_letters() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("12ab", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r#"\"q\""#), "\"q\"");
        assert_eq!(unescape(r"\q"), "\\q");
    }
}
