//! Operator definitions for Ember expressions.
//!
//! Provides enums for binary and unary operators along with precedence and
//! associativity information for the Pratt parser.

use crate::lexer::TokenKind;
use std::fmt;

/// Binary operators in Ember.
///
/// Organized by precedence from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `||`
    LogicalOr,
    /// `&&`
    LogicalAnd,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `&`
    BitwiseAnd,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    /// Get the binding power (precedence) for this operator.
    ///
    /// Higher values bind more tightly. Returns (left_bp, right_bp).
    /// All binary operators are left-associative: right_bp = left_bp + 1.
    pub fn binding_power(&self) -> (u8, u8) {
        use BinaryOp::*;
        match self {
            LogicalOr => (3, 4),
            LogicalAnd => (5, 6),
            BitwiseOr => (7, 8),
            BitwiseXor => (9, 10),
            BitwiseAnd => (11, 12),
            Equal | NotEqual => (13, 14),
            Less | LessEqual | Greater | GreaterEqual => (15, 16),
            ShiftLeft | ShiftRight => (17, 18),
            Add | Sub => (19, 20),
            Mul | Div | Mod => (21, 22),
        }
    }

    /// Convert from a token kind.
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match kind {
            PipePipe => Self::LogicalOr,
            AmpAmp => Self::LogicalAnd,
            Pipe => Self::BitwiseOr,
            Caret => Self::BitwiseXor,
            Amp => Self::BitwiseAnd,
            EqualEqual => Self::Equal,
            BangEqual => Self::NotEqual,
            Less => Self::Less,
            LessEqual => Self::LessEqual,
            Greater => Self::Greater,
            GreaterEqual => Self::GreaterEqual,
            LessLess => Self::ShiftLeft,
            GreaterGreater => Self::ShiftRight,
            Plus => Self::Add,
            Minus => Self::Sub,
            Star => Self::Mul,
            Slash => Self::Div,
            Percent => Self::Mod,
            _ => return None,
        })
    }

    /// Source spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        use BinaryOp::*;
        match self {
            LogicalOr => "||",
            LogicalAnd => "&&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            BitwiseAnd => "&",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
        }
    }

    /// Check if this is a comparison operator (yields Bool).
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessEqual
                | Self::Greater
                | Self::GreaterEqual
        )
    }

    /// Check if this is a short-circuiting logical operator.
    pub fn is_logical(&self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unary prefix operators in Ember.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `+`
    Plus,
    /// `!`
    LogicalNot,
    /// `~`
    BitwiseNot,
}

impl UnaryOp {
    /// Binding power of every prefix operator.
    pub fn binding_power() -> u8 {
        25
    }

    /// Convert from a token kind.
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Minus => Some(Self::Neg),
            TokenKind::Plus => Some(Self::Plus),
            TokenKind::Bang => Some(Self::LogicalNot),
            TokenKind::Tilde => Some(Self::BitwiseNot),
            _ => None,
        }
    }

    /// Source spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::LogicalNot => "!",
            Self::BitwiseNot => "~",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binding power for assignment: lowest, right-associative.
pub const ASSIGN_BINDING_POWER: (u8, u8) = (2, 1);

/// Binding power for postfix forms: call, member access, indexing.
pub const POSTFIX_BINDING_POWER: u8 = 27;
