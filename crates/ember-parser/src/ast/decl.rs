//! Declaration AST nodes for Ember.
//!
//! A file consists of an optional `namespace` heading followed by `using`
//! directives, class/object/function declarations and top-level statements,
//! in any order.

use crate::ast::{Expr, Ident, QualifiedName, Stmt, TypeExpr, VarDecl};
use ember_core::Span;

/// A top-level item of a source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Item<'ast> {
    /// `using A.B`
    Using(UsingDecl<'ast>),
    /// `class Name(params) { ... }`
    Class(&'ast ClassDecl<'ast>),
    /// `object Name { ... }`
    Object(&'ast ObjectDecl<'ast>),
    /// `def name(params): T = body`
    Function(&'ast FunctionDecl<'ast>),
    /// A top-level statement
    Statement(Stmt<'ast>),
}

impl<'ast> Item<'ast> {
    /// Get the span of this item.
    pub fn span(&self) -> Span {
        match self {
            Item::Using(u) => u.span,
            Item::Class(c) => c.span,
            Item::Object(o) => o.span,
            Item::Function(f) => f.span,
            Item::Statement(s) => s.span(),
        }
    }
}

/// `namespace A.B` heading at the top of a file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamespaceDecl<'ast> {
    /// The namespace path
    pub name: QualifiedName<'ast>,
    pub span: Span,
}

/// `using A.B` directive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsingDecl<'ast> {
    /// The imported namespace or type
    pub name: QualifiedName<'ast>,
    pub span: Span,
}

/// A class declaration with field parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl<'ast> {
    /// Class name
    pub name: Ident<'ast>,
    /// Field parameters forming the constructor signature
    pub params: &'ast [ClassParam<'ast>],
    /// Body members
    pub members: &'ast [Member<'ast>],
    pub span: Span,
}

/// A class field parameter: `x: int` or `var x: int`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassParam<'ast> {
    /// Whether the resulting field is assignable (`var`)
    pub mutable: bool,
    /// Field name
    pub name: Ident<'ast>,
    /// Field type
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

/// A singleton object declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDecl<'ast> {
    /// Object name
    pub name: Ident<'ast>,
    /// Body members
    pub members: &'ast [Member<'ast>],
    pub span: Span,
}

/// A member of a class or object body.
#[derive(Debug, Clone, PartialEq)]
pub enum Member<'ast> {
    /// A method
    Function(&'ast FunctionDecl<'ast>),
    /// A field with an initializer
    Field(&'ast VarDecl<'ast>),
    /// A statement run by the constructor or static initializer
    Statement(&'ast Expr<'ast>),
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl<'ast> {
    /// Function name
    pub name: Ident<'ast>,
    /// Parameters
    pub params: &'ast [Param<'ast>],
    /// Declared return type; `None` means Unit
    pub return_type: Option<TypeExpr<'ast>>,
    /// Body expression
    pub body: &'ast Expr<'ast>,
    /// Source location of the signature
    pub span: Span,
}

/// A function parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    /// Parameter name
    pub name: Ident<'ast>,
    /// Parameter type
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}
