//! Compile-time constant folding.
//!
//! Integer arithmetic wraps at 32 bits. Division and remainder by a constant
//! zero are left for run time.

use ember_core::{ConstantValue, Type};

use crate::operators::{BinaryOperatorKind, UnaryOperatorKind};

/// Fold a binary operation over two constant operands.
pub fn fold_binary(
    kind: BinaryOperatorKind,
    left: &ConstantValue,
    right: &ConstantValue,
) -> Option<ConstantValue> {
    use BinaryOperatorKind::*;
    use ConstantValue as C;

    let value = match (kind, left, right) {
        (Add, C::Int(a), C::Int(b)) => C::Int(a.wrapping_add(*b)),
        (Sub, C::Int(a), C::Int(b)) => C::Int(a.wrapping_sub(*b)),
        (Mul, C::Int(a), C::Int(b)) => C::Int(a.wrapping_mul(*b)),
        (Div, C::Int(_), C::Int(0)) | (Mod, C::Int(_), C::Int(0)) => return None,
        (Div, C::Int(a), C::Int(b)) => C::Int(a.wrapping_div(*b)),
        (Mod, C::Int(a), C::Int(b)) => C::Int(a.wrapping_rem(*b)),
        (BitwiseAnd, C::Int(a), C::Int(b)) => C::Int(a & b),
        (BitwiseOr, C::Int(a), C::Int(b)) => C::Int(a | b),
        (BitwiseXor, C::Int(a), C::Int(b)) => C::Int(a ^ b),
        (ShiftLeft, C::Int(a), C::Int(b)) => C::Int(a.wrapping_shl(*b as u32)),
        (ShiftRight, C::Int(a), C::Int(b)) => C::Int(a.wrapping_shr(*b as u32)),

        (LogicalAnd | BitwiseAnd, C::Bool(a), C::Bool(b)) => C::Bool(*a && *b),
        (LogicalOr | BitwiseOr, C::Bool(a), C::Bool(b)) => C::Bool(*a || *b),
        (BitwiseXor, C::Bool(a), C::Bool(b)) => C::Bool(a ^ b),

        (Concat, C::String(a), C::String(b)) => C::String(format!("{}{}", a, b)),

        (Equal, a, b) => C::Bool(a == b),
        (NotEqual, a, b) => C::Bool(a != b),
        (Less, C::Int(a), C::Int(b)) => C::Bool(a < b),
        (LessEqual, C::Int(a), C::Int(b)) => C::Bool(a <= b),
        (Greater, C::Int(a), C::Int(b)) => C::Bool(a > b),
        (GreaterEqual, C::Int(a), C::Int(b)) => C::Bool(a >= b),
        (Less, C::Char(a), C::Char(b)) => C::Bool(a < b),
        (LessEqual, C::Char(a), C::Char(b)) => C::Bool(a <= b),
        (Greater, C::Char(a), C::Char(b)) => C::Bool(a > b),
        (GreaterEqual, C::Char(a), C::Char(b)) => C::Bool(a >= b),
        _ => return None,
    };
    Some(value)
}

/// Fold `&&` / `||` when only the left operand is known.
///
/// `false && x` is `false` and `true || x` is `true` whatever `x` is.
pub fn fold_short_circuit(kind: BinaryOperatorKind, left: &ConstantValue) -> Option<ConstantValue> {
    match (kind, left) {
        (BinaryOperatorKind::LogicalAnd, ConstantValue::Bool(false)) => {
            Some(ConstantValue::Bool(false))
        }
        (BinaryOperatorKind::LogicalOr, ConstantValue::Bool(true)) => {
            Some(ConstantValue::Bool(true))
        }
        _ => None,
    }
}

/// Fold a unary operation over a constant operand.
pub fn fold_unary(kind: UnaryOperatorKind, operand: &ConstantValue) -> Option<ConstantValue> {
    match (kind, operand) {
        (UnaryOperatorKind::Negate, ConstantValue::Int(v)) => {
            Some(ConstantValue::Int(v.wrapping_neg()))
        }
        (UnaryOperatorKind::Identity, ConstantValue::Int(v)) => Some(ConstantValue::Int(*v)),
        (UnaryOperatorKind::BitwiseNot, ConstantValue::Int(v)) => Some(ConstantValue::Int(!v)),
        (UnaryOperatorKind::LogicalNot, ConstantValue::Bool(v)) => Some(ConstantValue::Bool(!v)),
        _ => None,
    }
}

/// Fold a conversion of a constant to `to`.
///
/// Conversions to `any` are not folded: the result is boxed at run time.
pub fn fold_conversion(value: &ConstantValue, to: &Type) -> Option<ConstantValue> {
    match (value, to) {
        (ConstantValue::Int(v), Type::Char) => {
            u32::try_from(*v).ok().and_then(char::from_u32).map(ConstantValue::Char)
        }
        (ConstantValue::Char(c), Type::Int) => Some(ConstantValue::Int(*c as i32)),
        (ConstantValue::Int(_) | ConstantValue::Bool(_) | ConstantValue::Char(_), Type::String) => {
            Some(ConstantValue::String(value.to_string()))
        }
        (ConstantValue::String(s), Type::Int) => s.trim().parse().ok().map(ConstantValue::Int),
        (ConstantValue::String(s), Type::Bool) => s.trim().parse().ok().map(ConstantValue::Bool),
        (value, ty) if value.ty() == *ty => Some(value.clone()),
        _ => None,
    }
}
