//! Type conversion classification.
//!
//! [`classify`] decides whether and how a value of one type may stand in for
//! another. It is used for:
//!
//! - Type checking (can argument X be passed to parameter Y?)
//! - Overload resolution (how many implicit conversions does a call need?)
//! - Conversion calls such as `int(x)`, which also accept explicit conversions
//!
//! ## Rules
//!
//! 1. Identity when both types are equal
//! 2. Implicit to `any`; explicit from `any`
//! 3. Explicit between `int` and `char`
//! 4. Implicit from `null` to any non-value type
//! 5. Explicit from `bool`, `int` and `char` to `string`
//! 6. Explicit from `string` to `bool` and `int`
//! 7. Identity between arrays with equal element types
//!
//! The error type converts to and from everything by identity, so a failed
//! subexpression never causes a second diagnostic.

use ember_core::Type;

/// How a value converts from one type to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    /// No conversion exists.
    None,
    /// The types are interchangeable; no conversion node is needed.
    Identity,
    /// Applied silently where a value of the target type is expected.
    Implicit,
    /// Only applied when written out, as in `string(42)`.
    Explicit,
}

impl Conversion {
    /// Whether the conversion exists at all.
    #[inline]
    pub fn exists(self) -> bool {
        self != Conversion::None
    }

    /// Whether the conversion needs no node.
    #[inline]
    pub fn is_identity(self) -> bool {
        self == Conversion::Identity
    }

    /// Whether the conversion may be applied without being written out.
    #[inline]
    pub fn is_implicit(self) -> bool {
        matches!(self, Conversion::Identity | Conversion::Implicit)
    }

    /// Cost for overload resolution: `None` when the conversion disqualifies a
    /// candidate, otherwise 0 for identity and 1 for implicit.
    pub fn cost(self) -> Option<u32> {
        match self {
            Conversion::Identity => Some(0),
            Conversion::Implicit => Some(1),
            Conversion::Explicit | Conversion::None => None,
        }
    }
}

/// Classify the conversion from `from` to `to`.
pub fn classify(from: &Type, to: &Type) -> Conversion {
    if from.is_error() || to.is_error() {
        return Conversion::Identity;
    }
    if from == to {
        return Conversion::Identity;
    }

    match (from, to) {
        (_, Type::Any) => Conversion::Implicit,
        (Type::Any, _) => Conversion::Explicit,
        (Type::Int, Type::Char) | (Type::Char, Type::Int) => Conversion::Explicit,
        (Type::Null, target) if !target.is_value_type() => Conversion::Implicit,
        (Type::Bool | Type::Int | Type::Char, Type::String) => Conversion::Explicit,
        (Type::String, Type::Bool | Type::Int) => Conversion::Explicit,
        // Arrays match on element type alone.
        (Type::Array(a), Type::Array(b)) if a == b => Conversion::Identity,
        _ => Conversion::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::SymbolId;

    fn all_types() -> Vec<Type> {
        vec![
            Type::Any,
            Type::Unit,
            Type::Int,
            Type::Bool,
            Type::Char,
            Type::String,
            Type::Null,
            Type::array(Type::Int),
            Type::array(Type::String),
            Type::Class(SymbolId::new(7)),
        ]
    }

    #[test]
    fn identity_for_equal_types() {
        for ty in all_types() {
            assert_eq!(classify(&ty, &ty), Conversion::Identity, "{}", ty);
        }
    }

    #[test]
    fn everything_converts_implicitly_to_any() {
        for ty in all_types().into_iter().filter(|t| *t != Type::Any) {
            assert_eq!(classify(&ty, &Type::Any), Conversion::Implicit, "{}", ty);
        }
    }

    #[test]
    fn any_converts_explicitly_to_everything() {
        for ty in all_types().into_iter().filter(|t| *t != Type::Any) {
            assert_eq!(classify(&Type::Any, &ty), Conversion::Explicit, "{}", ty);
        }
    }

    #[test]
    fn int_and_char_are_explicit() {
        assert_eq!(classify(&Type::Int, &Type::Char), Conversion::Explicit);
        assert_eq!(classify(&Type::Char, &Type::Int), Conversion::Explicit);
    }

    #[test]
    fn null_converts_to_reference_types_only() {
        assert_eq!(classify(&Type::Null, &Type::String), Conversion::Implicit);
        assert_eq!(
            classify(&Type::Null, &Type::Class(SymbolId::new(1))),
            Conversion::Implicit
        );
        assert_eq!(
            classify(&Type::Null, &Type::array(Type::Int)),
            Conversion::Implicit
        );
        assert_eq!(classify(&Type::Null, &Type::Int), Conversion::None);
        assert_eq!(classify(&Type::Null, &Type::Bool), Conversion::None);
        assert_eq!(classify(&Type::Null, &Type::Char), Conversion::None);
    }

    #[test]
    fn string_conversions() {
        assert_eq!(classify(&Type::Int, &Type::String), Conversion::Explicit);
        assert_eq!(classify(&Type::Bool, &Type::String), Conversion::Explicit);
        assert_eq!(classify(&Type::Char, &Type::String), Conversion::Explicit);
        assert_eq!(classify(&Type::String, &Type::Int), Conversion::Explicit);
        assert_eq!(classify(&Type::String, &Type::Bool), Conversion::Explicit);
        assert_eq!(classify(&Type::String, &Type::Char), Conversion::None);
    }

    #[test]
    fn unrelated_types_do_not_convert() {
        assert_eq!(classify(&Type::Bool, &Type::Int), Conversion::None);
        assert_eq!(classify(&Type::Unit, &Type::Int), Conversion::None);
        assert_eq!(
            classify(&Type::array(Type::Int), &Type::array(Type::String)),
            Conversion::None
        );
        assert_eq!(
            classify(&Type::Class(SymbolId::new(1)), &Type::Class(SymbolId::new(2))),
            Conversion::None
        );
    }

    #[test]
    fn arrays_with_equal_elements_are_identity() {
        assert_eq!(
            classify(&Type::array(Type::Char), &Type::array(Type::Char)),
            Conversion::Identity
        );
    }

    #[test]
    fn error_absorbs() {
        assert_eq!(classify(&Type::Error, &Type::Int), Conversion::Identity);
        assert_eq!(classify(&Type::String, &Type::Error), Conversion::Identity);
    }

    #[test]
    fn costs() {
        assert_eq!(Conversion::Identity.cost(), Some(0));
        assert_eq!(Conversion::Implicit.cost(), Some(1));
        assert_eq!(Conversion::Explicit.cost(), None);
        assert_eq!(Conversion::None.cost(), None);
        assert!(Conversion::Implicit.is_implicit());
        assert!(!Conversion::Explicit.is_implicit());
    }
}
