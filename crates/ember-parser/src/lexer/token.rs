//! Tokens produced by the lexer.
//!
//! [`TokenKind`] is generated from three tables: token classes, keywords and
//! punctuation. Keyword lookup and the descriptions used in parse errors come
//! from the same tables.

use ember_core::Span;
use std::fmt;

/// A lexed token. The lexeme lives in the parse arena, not in the source.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
    /// A line break separates this token from the previous one.
    pub newline_before: bool,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span, newline_before: bool) -> Self {
        Self {
            kind,
            lexeme,
            span,
            newline_before,
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} at {:?}", self.kind, self.lexeme, self.span)
    }
}

macro_rules! token_kinds {
    (
        classes { $($class:ident => $what:literal,)* }
        keywords { $($keyword:ident => $word:literal,)* }
        punctuation { $($punct:ident => $text:literal,)* }
    ) => {
        /// Kinds of tokens in Ember.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum TokenKind {
            $(#[doc = $what] $class,)*
            $(#[doc = concat!("`", $word, "`")] $keyword,)*
            $(#[doc = concat!("`", $text, "`")] $punct,)*
        }

        impl TokenKind {
            pub fn is_keyword(self) -> bool {
                matches!(self, $(Self::$keyword)|*)
            }

            /// How the token is named in parse errors.
            pub fn description(self) -> &'static str {
                match self {
                    $(Self::$class => $what,)*
                    $(Self::$keyword => concat!("'", $word, "'"),)*
                    $(Self::$punct => concat!("'", $text, "'"),)*
                }
            }
        }

        /// The keyword spelled `ident`, if any.
        ///
        /// Builtin type names (`int`, `string`, ...) are not keywords. They lex
        /// as identifiers so `int(x)` parses as an ordinary call.
        pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
            match ident {
                $($word => Some(TokenKind::$keyword),)*
                _ => None,
            }
        }
    };
}

token_kinds! {
    classes {
        IntLiteral => "integer literal",
        StringLiteral => "string literal",
        CharLiteral => "character literal",
        Identifier => "identifier",
        Error => "invalid token",
        Eof => "end of file",
    }
    keywords {
        Class => "class",
        Object => "object",
        Def => "def",
        Val => "val",
        Var => "var",
        If => "if",
        Else => "else",
        While => "while",
        For => "for",
        Break => "break",
        Continue => "continue",
        New => "new",
        This => "this",
        True => "true",
        False => "false",
        Null => "null",
        Using => "using",
        Namespace => "namespace",
    }
    punctuation {
        Plus => "+",
        Minus => "-",
        Star => "*",
        Slash => "/",
        Percent => "%",
        Equal => "=",
        EqualEqual => "==",
        Bang => "!",
        BangEqual => "!=",
        Less => "<",
        LessEqual => "<=",
        LessLess => "<<",
        LeftArrow => "<-",
        Greater => ">",
        GreaterEqual => ">=",
        GreaterGreater => ">>",
        Amp => "&",
        AmpAmp => "&&",
        Pipe => "|",
        PipePipe => "||",
        Caret => "^",
        Tilde => "~",
        LeftParen => "(",
        RightParen => ")",
        LeftBracket => "[",
        RightBracket => "]",
        LeftBrace => "{",
        RightBrace => "}",
        Comma => ",",
        Semicolon => ";",
        Colon => ":",
        Dot => ".",
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_lookup() {
        assert_eq!(lookup_keyword("def"), Some(TokenKind::Def));
        assert_eq!(lookup_keyword("object"), Some(TokenKind::Object));
        assert_eq!(lookup_keyword("int"), None);
        assert_eq!(lookup_keyword("to"), None);
    }

    #[test]
    fn looked_up_words_are_keywords() {
        for word in ["class", "val", "var", "while", "using", "namespace"] {
            let kind = lookup_keyword(word).unwrap();
            assert!(kind.is_keyword(), "{word} should be a keyword");
        }
        assert!(!TokenKind::Identifier.is_keyword());
    }

    #[test]
    fn descriptions() {
        assert_eq!(TokenKind::LeftArrow.to_string(), "'<-'");
        assert_eq!(TokenKind::Namespace.to_string(), "'namespace'");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
