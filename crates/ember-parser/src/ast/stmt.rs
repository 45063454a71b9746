//! Statement AST nodes for Ember.

use crate::ast::{Expr, Ident, TypeExpr};
use ember_core::Span;

/// A statement inside a block, class body or at the top level of a file.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'ast> {
    /// An expression evaluated for its value or effect
    Expr(&'ast Expr<'ast>),
    /// A `val` or `var` declaration
    Var(&'ast VarDecl<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(expr) => expr.span(),
            Stmt::Var(decl) => decl.span,
        }
    }
}

/// A variable declaration: `val x: int = 1` or `var y = "a"`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl<'ast> {
    /// `true` for `var`, `false` for `val`
    pub mutable: bool,
    /// Variable name
    pub name: Ident<'ast>,
    /// Optional type annotation
    pub ty: Option<TypeExpr<'ast>>,
    /// Initializer
    pub init: &'ast Expr<'ast>,
    pub span: Span,
}
