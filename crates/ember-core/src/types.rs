//! The closed set of Ember types.
//!
//! Primitive types compare by variant, class types by the identity of their
//! declaring symbol, and array types structurally by element type.

use std::fmt;

use crate::SymbolId;

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// The type of an expression that failed to bind. Absorbs further errors.
    Error,
    /// The top type; everything converts to it implicitly.
    Any,
    /// The type of statements and of expressions evaluated for effect.
    Unit,
    /// 32-bit signed integer.
    Int,
    /// Boolean.
    Bool,
    /// Unicode scalar value.
    Char,
    /// Immutable string.
    String,
    /// The type of the `null` literal.
    Null,
    /// Array with an element type.
    Array(Box<Type>),
    /// Class or object declared by the symbol.
    Class(SymbolId),
}

impl Type {
    /// Build an array type.
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// Whether this is the error type.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// Whether this is a value type (Bool, Int or Char).
    #[inline]
    pub fn is_value_type(&self) -> bool {
        matches!(self, Type::Bool | Type::Int | Type::Char)
    }

    /// Whether this is Unit.
    #[inline]
    pub fn is_unit(&self) -> bool {
        matches!(self, Type::Unit)
    }

    /// The element type of an array.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    /// The declaring symbol of a class type.
    pub fn class_symbol(&self) -> Option<SymbolId> {
        match self {
            Type::Class(symbol) => Some(*symbol),
            _ => None,
        }
    }

    /// Look up a builtin type by its source spelling.
    ///
    /// These names double as conversion functions: `int(x)`, `string(x)`.
    pub fn from_builtin_name(name: &str) -> Option<Type> {
        match name {
            "any" => Some(Type::Any),
            "unit" => Some(Type::Unit),
            "int" => Some(Type::Int),
            "bool" => Some(Type::Bool),
            "char" => Some(Type::Char),
            "string" => Some(Type::String),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Error => write!(f, "?"),
            Type::Any => write!(f, "any"),
            Type::Unit => write!(f, "unit"),
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Char => write!(f, "char"),
            Type::String => write!(f, "string"),
            Type::Null => write!(f, "null"),
            Type::Array(element) => write!(f, "Array[{}]", element),
            Type::Class(symbol) => write!(f, "class{}", symbol),
        }
    }
}
