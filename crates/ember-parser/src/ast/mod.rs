//! Abstract Syntax Tree (AST) for Ember.
//!
//! This module provides:
//! - AST node definitions for all Ember constructs
//! - The parser for transforming tokens into AST
//! - [`SyntaxTree`], one per source file, carrying its syntax diagnostics
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use ember_core::FileId;
//! use ember_parser::Parser;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     class Point(x: int, y: int) {
//!         def sum(): int = x + y
//!     }
//!
//!     println(Point(1, 2).sum())
//! "#;
//!
//! let tree = Parser::parse(source, FileId::new(0), &arena);
//! assert!(tree.diagnostics().is_empty());
//! assert_eq!(tree.items().len(), 2);
//! ```

pub mod decl;
pub mod expr;
pub mod ops;
pub mod stmt;
pub mod types;

mod decl_parser;
mod expr_parser;
mod parser;

pub use decl::*;
pub use expr::*;
pub use ops::*;
pub use parser::Parser;
pub use stmt::*;
pub use types::*;

use ember_core::{Diagnostic, FileId};

/// A parsed source file.
///
/// The tree borrows from an arena allocator. All AST nodes are allocated in
/// the arena and remain valid for the lifetime of the arena.
#[derive(Debug)]
pub struct SyntaxTree<'ast> {
    file: FileId,
    namespace: Option<NamespaceDecl<'ast>>,
    items: &'ast [Item<'ast>],
    diagnostics: Vec<Diagnostic>,
}

impl<'ast> SyntaxTree<'ast> {
    pub(crate) fn new(
        file: FileId,
        namespace: Option<NamespaceDecl<'ast>>,
        items: &'ast [Item<'ast>],
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            file,
            namespace,
            items,
            diagnostics,
        }
    }

    /// The file this tree was parsed from.
    pub fn file(&self) -> FileId {
        self.file
    }

    /// The `namespace` heading, if the file has one.
    pub fn namespace(&self) -> Option<&NamespaceDecl<'ast>> {
        self.namespace.as_ref()
    }

    /// Get the top-level items in this file.
    pub fn items(&self) -> &'ast [Item<'ast>] {
        self.items
    }

    /// Lexical and syntax errors, ordered by position.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether the file contains top-level statements.
    pub fn has_statements(&self) -> bool {
        self.items.iter().any(|item| matches!(item, Item::Statement(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn parse_empty_file() {
        let arena = Bump::new();
        let tree = Parser::parse("", FileId::new(3), &arena);
        assert_eq!(tree.file(), FileId::new(3));
        assert!(tree.items().is_empty());
        assert!(tree.diagnostics().is_empty());
        assert!(!tree.has_statements());
    }

    #[test]
    fn diagnostics_carry_file_and_position() {
        let arena = Bump::new();
        let tree = Parser::parse("val x = 1\nval y = )", FileId::new(2), &arena);
        assert_eq!(tree.diagnostics().len(), 1);
        let diagnostic = &tree.diagnostics()[0];
        assert_eq!(diagnostic.location.file, FileId::new(2));
        assert_eq!(diagnostic.to_string(), "(2, 9): expected expression, found ')'");
    }

    #[test]
    fn lex_and_parse_errors_are_ordered() {
        let arena = Bump::new();
        let tree = Parser::parse("val a = \nval b = 'xy'", FileId::new(0), &arena);
        let lines: Vec<_> = tree
            .diagnostics()
            .iter()
            .map(|d| d.location.span.line)
            .collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
        assert!(tree.diagnostics().len() >= 2);
    }

    #[test]
    fn statements_are_detected() {
        let arena = Bump::new();
        let tree = Parser::parse("def f() = 1\nf()", FileId::new(0), &arena);
        assert!(tree.has_statements());
    }
}
