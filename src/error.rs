//! Errors of the compilation API.
//!
//! Problems in the compiled sources are not errors here: they are
//! diagnostics on the returned [`TypedAssembly`](crate::TypedAssembly).

use ember_core::InternalError;
use thiserror::Error;

/// Errors that can occur when managing sources or compiling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// The compilation has already run.
    #[error("compilation has already run; use update_source() or clear() to change its sources")]
    AlreadyCompiled,

    /// A source with this name was already added.
    #[error("source '{0}' was already added")]
    DuplicateSource(String),

    /// No source with this name exists.
    #[error("source '{0}' not found")]
    SourceNotFound(String),

    /// Nothing to compile.
    #[error("no sources added")]
    NoSources,

    /// The binder hit a defect and stopped.
    #[error(transparent)]
    Internal(#[from] InternalError),
}
