//! Ember core crate.
//!
//! Shared building blocks for every Ember compilation stage:
//! - Source positions ([`Span`], [`Location`]) and IDs ([`FileId`], [`SymbolId`])
//! - The closed [`Type`] set and compile-time [`ConstantValue`]s
//! - The symbol arena ([`SymbolTable`]) holding the ownership tree of declarations
//! - Error types and the per-run [`DiagnosticBag`]
//!
//! # Example
//!
//! ```
//! use ember_core::{SymbolFlags, SymbolKind, SymbolTable, Type};
//!
//! let mut table = SymbolTable::new();
//! let root = table.root();
//! let system = table.get_or_create_namespace(root, "System");
//! let answer = table.create(system, SymbolKind::Field, "answer", SymbolFlags::STATIC, None);
//! table.set_type(answer, Type::Int).unwrap();
//! assert!(table.define(answer));
//! assert_eq!(table.qualified_name(answer), "System.answer");
//! ```

mod constant;
mod diagnostics;
mod error;
mod ids;
mod span;
mod symbol;
mod symbol_table;
mod types;

pub use constant::ConstantValue;
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticError};
pub use error::{
    ErrorCategory, InternalError, LexError, ParseError, ParseErrorKind, SemanticError,
};
pub use ids::{FileId, SymbolId};
pub use span::{Location, Span};
pub use symbol::{Symbol, SymbolFlags, SymbolKind};
pub use symbol_table::SymbolTable;
pub use types::Type;
