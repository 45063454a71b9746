//! Built-in operator table.
//!
//! Operators are resolved from a fixed table keyed by the syntactic operator
//! and the operand types. Every entry has a statically known result type.
//! Reference equality is the only rule that is not a table row: it applies to
//! any two non-value operands of the same type, or to a non-value operand
//! compared with `null`.

use std::fmt;

use ember_core::Type;
use ember_parser::ast::{BinaryOp, UnaryOp};

// ============================================================================
// Operator kinds
// ============================================================================

/// A resolved binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperatorKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRight,
    /// Short-circuiting `&&`
    LogicalAnd,
    /// Short-circuiting `||`
    LogicalOr,
    /// Value equality of primitives and strings
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// String concatenation
    Concat,
    /// Identity comparison of references
    ReferenceEqual,
    ReferenceNotEqual,
}

impl BinaryOperatorKind {
    /// The operator as written in source.
    pub fn symbol(self) -> &'static str {
        use BinaryOperatorKind::*;
        match self {
            Add | Concat => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            BitwiseAnd => "&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            LogicalAnd => "&&",
            LogicalOr => "||",
            Equal | ReferenceEqual => "==",
            NotEqual | ReferenceNotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A resolved unary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperatorKind {
    Negate,
    Identity,
    LogicalNot,
    BitwiseNot,
}

impl UnaryOperatorKind {
    /// The operator as written in source.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperatorKind::Negate => "-",
            UnaryOperatorKind::Identity => "+",
            UnaryOperatorKind::LogicalNot => "!",
            UnaryOperatorKind::BitwiseNot => "~",
        }
    }
}

impl fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Result of binary operator resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperator {
    pub kind: BinaryOperatorKind,
    pub left: Type,
    pub right: Type,
    pub result: Type,
}

/// Result of unary operator resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperator {
    pub kind: UnaryOperatorKind,
    pub operand: Type,
    pub result: Type,
}

// ============================================================================
// Table
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primitive {
    Int,
    Bool,
    Char,
    String,
}

impl Primitive {
    fn ty(self) -> Type {
        match self {
            Primitive::Int => Type::Int,
            Primitive::Bool => Type::Bool,
            Primitive::Char => Type::Char,
            Primitive::String => Type::String,
        }
    }

    fn of(ty: &Type) -> Option<Self> {
        match ty {
            Type::Int => Some(Primitive::Int),
            Type::Bool => Some(Primitive::Bool),
            Type::Char => Some(Primitive::Char),
            Type::String => Some(Primitive::String),
            _ => None,
        }
    }
}

/// One row: both operands have type `operand`.
struct BinaryEntry {
    syntax: BinaryOp,
    kind: BinaryOperatorKind,
    operand: Primitive,
    result: Primitive,
}

const fn binary(
    syntax: BinaryOp,
    kind: BinaryOperatorKind,
    operand: Primitive,
    result: Primitive,
) -> BinaryEntry {
    BinaryEntry {
        syntax,
        kind,
        operand,
        result,
    }
}

static BINARY_OPERATORS: [BinaryEntry; 32] = {
    use BinaryOp as S;
    use BinaryOperatorKind as K;
    use Primitive::{Bool, Char, Int, String};
    [
        // int arithmetic and bitwise
        binary(S::Add, K::Add, Int, Int),
        binary(S::Sub, K::Sub, Int, Int),
        binary(S::Mul, K::Mul, Int, Int),
        binary(S::Div, K::Div, Int, Int),
        binary(S::Mod, K::Mod, Int, Int),
        binary(S::BitwiseAnd, K::BitwiseAnd, Int, Int),
        binary(S::BitwiseOr, K::BitwiseOr, Int, Int),
        binary(S::BitwiseXor, K::BitwiseXor, Int, Int),
        binary(S::ShiftLeft, K::ShiftLeft, Int, Int),
        binary(S::ShiftRight, K::ShiftRight, Int, Int),
        // int comparison
        binary(S::Equal, K::Equal, Int, Bool),
        binary(S::NotEqual, K::NotEqual, Int, Bool),
        binary(S::Less, K::Less, Int, Bool),
        binary(S::LessEqual, K::LessEqual, Int, Bool),
        binary(S::Greater, K::Greater, Int, Bool),
        binary(S::GreaterEqual, K::GreaterEqual, Int, Bool),
        // bool
        binary(S::LogicalAnd, K::LogicalAnd, Bool, Bool),
        binary(S::LogicalOr, K::LogicalOr, Bool, Bool),
        binary(S::BitwiseAnd, K::BitwiseAnd, Bool, Bool),
        binary(S::BitwiseOr, K::BitwiseOr, Bool, Bool),
        binary(S::BitwiseXor, K::BitwiseXor, Bool, Bool),
        binary(S::Equal, K::Equal, Bool, Bool),
        binary(S::NotEqual, K::NotEqual, Bool, Bool),
        // char comparison
        binary(S::Equal, K::Equal, Char, Bool),
        binary(S::NotEqual, K::NotEqual, Char, Bool),
        binary(S::Less, K::Less, Char, Bool),
        binary(S::LessEqual, K::LessEqual, Char, Bool),
        binary(S::Greater, K::Greater, Char, Bool),
        binary(S::GreaterEqual, K::GreaterEqual, Char, Bool),
        // string
        binary(S::Add, K::Concat, String, String),
        binary(S::Equal, K::Equal, String, Bool),
        binary(S::NotEqual, K::NotEqual, String, Bool),
    ]
};

/// Resolve a binary operator for the given operand types.
pub fn lookup_binary(op: BinaryOp, left: &Type, right: &Type) -> Option<BinaryOperator> {
    if let (Some(l), Some(r)) = (Primitive::of(left), Primitive::of(right))
        && l == r
        && let Some(entry) = BINARY_OPERATORS
            .iter()
            .find(|e| e.syntax == op && e.operand == l)
    {
        return Some(BinaryOperator {
            kind: entry.kind,
            left: entry.operand.ty(),
            right: entry.operand.ty(),
            result: entry.result.ty(),
        });
    }

    let kind = match op {
        BinaryOp::Equal => BinaryOperatorKind::ReferenceEqual,
        BinaryOp::NotEqual => BinaryOperatorKind::ReferenceNotEqual,
        _ => return None,
    };
    let comparable = !left.is_value_type()
        && !right.is_value_type()
        && (left == right || *left == Type::Null || *right == Type::Null);
    comparable.then(|| BinaryOperator {
        kind,
        left: left.clone(),
        right: right.clone(),
        result: Type::Bool,
    })
}

/// Resolve a unary operator for the given operand type.
pub fn lookup_unary(op: UnaryOp, operand: &Type) -> Option<UnaryOperator> {
    let kind = match (op, operand) {
        (UnaryOp::Neg, Type::Int) => UnaryOperatorKind::Negate,
        (UnaryOp::Plus, Type::Int) => UnaryOperatorKind::Identity,
        (UnaryOp::BitwiseNot, Type::Int) => UnaryOperatorKind::BitwiseNot,
        (UnaryOp::LogicalNot, Type::Bool) => UnaryOperatorKind::LogicalNot,
        _ => return None,
    };
    Some(UnaryOperator {
        kind,
        operand: operand.clone(),
        result: operand.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::SymbolId;

    #[test]
    fn int_arithmetic() {
        let op = lookup_binary(BinaryOp::Add, &Type::Int, &Type::Int).unwrap();
        assert_eq!(op.kind, BinaryOperatorKind::Add);
        assert_eq!(op.result, Type::Int);

        let op = lookup_binary(BinaryOp::Less, &Type::Int, &Type::Int).unwrap();
        assert_eq!(op.result, Type::Bool);
    }

    #[test]
    fn string_concatenation() {
        let op = lookup_binary(BinaryOp::Add, &Type::String, &Type::String).unwrap();
        assert_eq!(op.kind, BinaryOperatorKind::Concat);
        assert_eq!(op.result, Type::String);
        assert!(lookup_binary(BinaryOp::Sub, &Type::String, &Type::String).is_none());
    }

    #[test]
    fn mixed_operands_are_undefined() {
        assert!(lookup_binary(BinaryOp::Add, &Type::Int, &Type::String).is_none());
        assert!(lookup_binary(BinaryOp::Add, &Type::Int, &Type::Char).is_none());
        assert!(lookup_binary(BinaryOp::LogicalAnd, &Type::Int, &Type::Int).is_none());
        assert!(lookup_binary(BinaryOp::Less, &Type::Bool, &Type::Bool).is_none());
    }

    #[test]
    fn char_comparison() {
        let op = lookup_binary(BinaryOp::GreaterEqual, &Type::Char, &Type::Char).unwrap();
        assert_eq!(op.kind, BinaryOperatorKind::GreaterEqual);
        assert!(lookup_binary(BinaryOp::Add, &Type::Char, &Type::Char).is_none());
    }

    #[test]
    fn reference_equality() {
        let point = Type::Class(SymbolId::new(4));
        let op = lookup_binary(BinaryOp::Equal, &point, &point).unwrap();
        assert_eq!(op.kind, BinaryOperatorKind::ReferenceEqual);

        let op = lookup_binary(BinaryOp::NotEqual, &point, &Type::Null).unwrap();
        assert_eq!(op.kind, BinaryOperatorKind::ReferenceNotEqual);

        let other = Type::Class(SymbolId::new(5));
        assert!(lookup_binary(BinaryOp::Equal, &point, &other).is_none());
        assert!(lookup_binary(BinaryOp::Equal, &Type::Int, &Type::Null).is_none());
        assert!(lookup_binary(BinaryOp::Less, &point, &point).is_none());
    }

    #[test]
    fn string_equality_is_by_value() {
        let op = lookup_binary(BinaryOp::Equal, &Type::String, &Type::String).unwrap();
        assert_eq!(op.kind, BinaryOperatorKind::Equal);
    }

    #[test]
    fn unary_operators() {
        assert_eq!(
            lookup_unary(UnaryOp::Neg, &Type::Int).unwrap().kind,
            UnaryOperatorKind::Negate
        );
        assert_eq!(
            lookup_unary(UnaryOp::LogicalNot, &Type::Bool).unwrap().result,
            Type::Bool
        );
        assert!(lookup_unary(UnaryOp::LogicalNot, &Type::Int).is_none());
        assert!(lookup_unary(UnaryOp::Neg, &Type::String).is_none());
    }
}
