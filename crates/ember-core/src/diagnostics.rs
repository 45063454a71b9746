//! Diagnostics collected during a compilation run.
//!
//! A [`Diagnostic`] pairs an error with the [`Location`] it refers to. The
//! [`DiagnosticBag`] is the single append-only list shared by every phase of
//! one run; it is written by one thread and inspected only after binding has
//! completed.

use std::fmt;

use thiserror::Error;

use crate::{ErrorCategory, LexError, Location, ParseError, SemanticError};

/// The error carried by a diagnostic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagnosticError {
    /// Passed through from the lexer.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// Passed through from the parser.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Reported by the binder or its analyses.
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// A single diagnostic message: an error and where it happened.
///
/// # Examples
///
/// ```
/// use ember_core::{Diagnostic, FileId, Location, SemanticError, Span};
///
/// let diagnostic = Diagnostic::semantic(
///     SemanticError::BreakOutsideLoop,
///     Location::new(FileId::new(0), Span::new(3, 5, 5)),
/// );
/// assert_eq!(diagnostic.to_string(), "(3, 5): 'break' can only be used inside a loop");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The error.
    pub error: DiagnosticError,
    /// The offending source location.
    pub location: Location,
}

impl Diagnostic {
    /// Create a diagnostic for a semantic error.
    pub fn semantic(error: SemanticError, location: Location) -> Self {
        Self {
            error: DiagnosticError::Semantic(error),
            location,
        }
    }

    /// The message text without position information.
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// The category of the underlying error.
    pub fn category(&self) -> ErrorCategory {
        match &self.error {
            DiagnosticError::Lex(_) | DiagnosticError::Parse(_) => ErrorCategory::Syntax,
            DiagnosticError::Semantic(error) => error.category(),
        }
    }

    /// The semantic error, if this is one.
    pub fn as_semantic(&self) -> Option<&SemanticError> {
        match &self.error {
            DiagnosticError::Semantic(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}): {}",
            self.location.span.line, self.location.span.col, self.error
        )
    }
}

/// Append-only collection of diagnostics for one run.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a semantic error at a location.
    pub fn report(&mut self, error: SemanticError, location: Location) {
        self.diagnostics.push(Diagnostic::semantic(error, location));
    }

    /// Record an already-built diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Append every diagnostic from an iterator.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Number of diagnostics recorded so far.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Iterate over recorded diagnostics in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Consume the bag, returning the diagnostics in report order.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl fmt::Display for DiagnosticBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}
