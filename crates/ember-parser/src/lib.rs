//! Ember Parser crate.
//!
//! This crate provides the lexer and parser for Ember source code.
//! It includes:
//! - Lexical analysis (tokenization) with line-break tracking
//! - Abstract Syntax Tree (AST) definitions
//! - Parser for transforming tokens into a [`SyntaxTree`] per file
//!
//! Syntax errors never abort parsing. They are collected as diagnostics on
//! the tree and the parser resumes at the next statement or declaration.
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
//!     def fib(n: int): int =
//!         if (n < 2) n else fib(n - 1) + fib(n - 2)
//!
//!     println(fib(10))
//! "#;
//!
//! let tree = Parser::parse(source, FileId::new(0), &arena);
//! for diagnostic in tree.diagnostics() {
//!     eprintln!("{}", diagnostic);
//! }
//! assert_eq!(tree.items().len(), 2);
//! ```

// Lexer module
pub mod lexer;

// AST module
pub mod ast;

// Re-export commonly used types at crate root
pub use ast::{Parser, SyntaxTree};
pub use lexer::{Lexer, Token, TokenKind};
