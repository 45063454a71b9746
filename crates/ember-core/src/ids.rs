//! Identifier types for source files and symbols.
//!
//! Symbols live in an arena and are addressed by [`SymbolId`]; source files
//! are addressed by [`FileId`]. Both are plain indices, so they are `Copy`
//! and can be stored freely in typed trees, scopes and diagnostics.

use std::fmt;

/// Identifies a source file taking part in a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    /// Create a new file ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file_{}", self.0)
    }
}

impl From<u32> for FileId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

/// Identifies a symbol in a [`SymbolTable`](crate::SymbolTable).
///
/// IDs are stable for the lifetime of the table and of every table cloned
/// from it, which is what lets a REPL submission keep referring to symbols
/// declared by earlier submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Create a symbol ID from an arena index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_creation() {
        let file = FileId::new(42);
        assert_eq!(file.index(), 42);
        assert_eq!(format!("{}", file), "file_42");
    }

    #[test]
    fn symbol_id_equality() {
        let a = SymbolId::new(1);
        let b = SymbolId::new(1);
        let c = SymbolId::new(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(c.index(), 2);
    }
}
