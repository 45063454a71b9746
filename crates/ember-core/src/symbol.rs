//! Symbols: named, typed declarations in the program's ownership tree.

use std::fmt;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::{Location, SymbolId, Type};

/// The kind of declaration a symbol stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A namespace (the root namespace has an empty name).
    Namespace,
    /// A class or object (singleton) type.
    Type,
    /// A function, method, constructor or static initializer.
    Method,
    /// A field of a type, or a namespace-level variable.
    Field,
    /// A method parameter.
    Parameter,
    /// A local variable.
    Local,
}

impl SymbolKind {
    /// Lowercase description used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            SymbolKind::Namespace => "namespace",
            SymbolKind::Type => "type",
            SymbolKind::Method => "method",
            SymbolKind::Field => "field",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Local => "local",
        }
    }

    /// Whether symbols of this kind can be read as values.
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            SymbolKind::Field | SymbolKind::Parameter | SymbolKind::Local
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

bitflags! {
    /// Modifiers attached to a symbol.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymbolFlags: u16 {
        /// Belongs to its container rather than to an instance.
        const STATIC = 1 << 0;
        /// Cannot be assigned after initialization (`val`, parameters, loop variables).
        const READONLY = 1 << 1;
        /// The program's entry point.
        const ENTRY_POINT = 1 << 2;
        /// An `object` declaration: a type with a single static instance.
        const SINGLETON = 1 << 3;
        /// An instance constructor or static initializer.
        const CONSTRUCTOR = 1 << 4;
        /// Declared by a referenced assembly rather than by source.
        const IMPORTED = 1 << 5;
        /// Created by the binder with no source declaration of its own.
        const SYNTHESIZED = 1 << 6;
    }
}

/// A named declaration.
///
/// Symbols are owned by a [`SymbolTable`](crate::SymbolTable) and refer to
/// their owner and children by [`SymbolId`]. The type is assigned once and
/// never changes afterwards.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Simple name.
    pub name: String,
    /// Kind of declaration.
    pub kind: SymbolKind,
    /// Exclusive parent in the ownership tree (`None` only for the root).
    pub owner: Option<SymbolId>,
    /// Modifiers.
    pub flags: SymbolFlags,
    /// Where the symbol was declared, if it came from source.
    pub location: Option<Location>,
    pub(crate) ty: Option<Type>,
    pub(crate) members: FxHashMap<String, Vec<SymbolId>>,
    pub(crate) children: Vec<SymbolId>,
    pub(crate) parameters: Vec<SymbolId>,
}

impl Symbol {
    pub(crate) fn new(
        name: String,
        kind: SymbolKind,
        owner: Option<SymbolId>,
        flags: SymbolFlags,
        location: Option<Location>,
    ) -> Self {
        Self {
            name,
            kind,
            owner,
            flags,
            location,
            ty: None,
            members: FxHashMap::default(),
            children: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// The assigned type, if any.
    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    /// Whether the symbol has the given flags.
    #[inline]
    pub fn has(&self, flags: SymbolFlags) -> bool {
        self.flags.contains(flags)
    }

    /// Whether the symbol is static.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.has(SymbolFlags::STATIC)
    }

    /// Whether the symbol is readonly.
    #[inline]
    pub fn is_readonly(&self) -> bool {
        self.has(SymbolFlags::READONLY)
    }

    /// Whether this is an `object` type.
    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.has(SymbolFlags::SINGLETON)
    }

    /// Parameters in declaration order (methods only).
    pub fn parameters(&self) -> &[SymbolId] {
        &self.parameters
    }

    /// Defined members in declaration order.
    pub fn children(&self) -> &[SymbolId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine() {
        let flags = SymbolFlags::STATIC | SymbolFlags::READONLY;
        assert!(flags.contains(SymbolFlags::STATIC));
        assert!(!flags.contains(SymbolFlags::ENTRY_POINT));
    }

    #[test]
    fn variable_kinds() {
        assert!(SymbolKind::Local.is_variable());
        assert!(SymbolKind::Field.is_variable());
        assert!(!SymbolKind::Method.is_variable());
        assert!(!SymbolKind::Type.is_variable());
    }
}
