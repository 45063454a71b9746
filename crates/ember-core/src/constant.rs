//! Compile-time constant values attached to typed expressions.

use std::fmt;

use crate::Type;

/// A compile-time constant value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantValue {
    /// 32-bit signed integer.
    Int(i32),
    /// Boolean.
    Bool(bool),
    /// Character.
    Char(char),
    /// String.
    String(String),
    /// The unit value `()`.
    Unit,
}

impl ConstantValue {
    /// The type of this constant.
    pub fn ty(&self) -> Type {
        match self {
            ConstantValue::Int(_) => Type::Int,
            ConstantValue::Bool(_) => Type::Bool,
            ConstantValue::Char(_) => Type::Char,
            ConstantValue::String(_) => Type::String,
            ConstantValue::Unit => Type::Unit,
        }
    }

    /// The value as an integer.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            ConstantValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstantValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a character.
    pub fn as_char(&self) -> Option<char> {
        match self {
            ConstantValue::Char(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Int(v) => write!(f, "{}", v),
            ConstantValue::Bool(v) => write!(f, "{}", v),
            ConstantValue::Char(v) => write!(f, "{}", v),
            ConstantValue::String(v) => write!(f, "{}", v),
            ConstantValue::Unit => write!(f, "()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_types() {
        assert_eq!(ConstantValue::Int(1).ty(), Type::Int);
        assert_eq!(ConstantValue::String("a".into()).ty(), Type::String);
        assert_eq!(ConstantValue::Unit.ty(), Type::Unit);
    }

    #[test]
    fn accessors() {
        assert_eq!(ConstantValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ConstantValue::Bool(true).as_int(), None);
        assert_eq!(ConstantValue::Char('x').as_char(), Some('x'));
        assert_eq!(ConstantValue::String("hi".into()).as_str(), Some("hi"));
    }
}
