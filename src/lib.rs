//! Ember: semantic front-to-mid-end.
//!
//! This crate ties the workspace together: register source files with a
//! [`Compilation`], compile them to a [`TypedAssembly`] ready for code
//! generation, and inspect the diagnostics. A [`Session`] chains script
//! submissions for a read-eval-print loop.
//!
//! # Example
//!
//! ```
//! use ember::{Compilation, CompilationOptions};
//!
//! let mut compilation = Compilation::new(CompilationOptions::program());
//! compilation
//!     .add_source("main.em", "def square(n: int): int = n * n\nprintln(square(7))")
//!     .unwrap();
//!
//! let assembly = compilation.compile().unwrap();
//! assert!(assembly.diagnostics.is_empty());
//! assert!(assembly.entry_point.is_some());
//! ```
//!
//! Crates of the workspace are re-exported as [`core`], [`parser`] and
//! [`compiler`].

mod compilation;
mod error;
mod options;
mod session;

pub use compilation::Compilation;
pub use error::CompilationError;
pub use options::{CompilationOptions, Mode};
pub use session::Session;

pub use ember_compiler as compiler;
pub use ember_core as core;
pub use ember_parser as parser;

pub use ember_compiler::{
    AssemblyReference, Body, EntryPoint, MemberReference, MethodBodies, Printer, TypeReference,
    TypedAssembly,
};
pub use ember_core::{Diagnostic, ErrorCategory, FileId, Location, SemanticError, Span, Type};
