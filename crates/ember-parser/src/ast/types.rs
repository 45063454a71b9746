//! Identifiers and type expressions.

use ember_core::Span;
use std::fmt;

/// An identifier with its source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    /// The identifier text.
    pub name: &'ast str,
    /// Source location.
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    /// Create a new identifier.
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A dotted name such as `System.Predef` or `A.B.Point`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedName<'ast> {
    /// Segments in source order; never empty.
    pub segments: &'ast [Ident<'ast>],
    /// Source location of the whole name.
    pub span: Span,
}

impl<'ast> QualifiedName<'ast> {
    /// The final segment.
    pub fn last(&self) -> Option<&Ident<'ast>> {
        self.segments.last()
    }

    /// Segment names in order.
    pub fn names(&self) -> Vec<&'ast str> {
        self.segments.iter().map(|s| s.name).collect()
    }
}

impl fmt::Display for QualifiedName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment.name)?;
        }
        Ok(())
    }
}

/// A type as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeExpr<'ast> {
    /// A builtin or class name, possibly qualified: `int`, `A.B.Point`.
    Named(QualifiedName<'ast>),
    /// `Array[T]`
    Array {
        element: &'ast TypeExpr<'ast>,
        span: Span,
    },
}

impl<'ast> TypeExpr<'ast> {
    /// Get the span of this type expression.
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named(name) => name.span,
            TypeExpr::Array { span, .. } => *span,
        }
    }
}

impl fmt::Display for TypeExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => write!(f, "{}", name),
            TypeExpr::Array { element, .. } => write!(f, "Array[{}]", element),
        }
    }
}
