//! Expression AST nodes for Ember.
//!
//! Ember is expression-oriented: blocks, `if`, loops and jumps are all
//! expressions. Statements only add variable declarations on top.
//!
//! # Expression Precedence
//!
//! The parser uses Pratt parsing with the following precedence levels:
//! 1. Assignment (=) - right associative
//! 2. Logical OR (||)
//! 3. Logical AND (&&)
//! 4. Bitwise OR (|)
//! 5. Bitwise XOR (^)
//! 6. Bitwise AND (&)
//! 7. Equality (==, !=)
//! 8. Relational (<, <=, >, >=)
//! 9. Bitwise shift (<<, >>)
//! 10. Additive (+, -)
//! 11. Multiplicative (*, /, %)
//! 12. Prefix unary (-, +, !, ~)
//! 13. Postfix (call, index, member)

use crate::ast::{BinaryOp, Ident, Stmt, TypeExpr, UnaryOp};
use ember_core::Span;

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value
    Literal(LiteralExpr<'ast>),
    /// Identifier reference
    Ident(Ident<'ast>),
    /// `this`
    This(Span),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Assignment
    Assign(&'ast AssignExpr<'ast>),
    /// Function, method, constructor or conversion call
    Call(&'ast CallExpr<'ast>),
    /// Member access (`a.b`)
    Member(&'ast MemberExpr<'ast>),
    /// Array indexing (`a[i]`)
    Index(&'ast IndexExpr<'ast>),
    /// `new Point(1, 2)`
    New(&'ast NewExpr<'ast>),
    /// `new Array[int](n)`
    NewArray(&'ast NewArrayExpr<'ast>),
    /// Parenthesized expression
    Paren(&'ast ParenExpr<'ast>),
    /// `{ ... }`
    Block(&'ast BlockExpr<'ast>),
    /// `if (c) a else b`
    If(&'ast IfExpr<'ast>),
    /// `while (c) body`
    While(&'ast WhileExpr<'ast>),
    /// `for (i <- lo to hi) body`
    For(&'ast ForExpr<'ast>),
    /// `break`
    Break(Span),
    /// `continue`
    Continue(Span),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::This(span) => *span,
            Self::Unary(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Call(e) => e.span,
            Self::Member(e) => e.span,
            Self::Index(e) => e.span,
            Self::New(e) => e.span,
            Self::NewArray(e) => e.span,
            Self::Paren(e) => e.span,
            Self::Block(e) => e.span,
            Self::If(e) => e.span,
            Self::While(e) => e.span,
            Self::For(e) => e.span,
            Self::Break(span) => *span,
            Self::Continue(span) => *span,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr<'ast> {
        match self {
            Self::Paren(p) => p.expr.unparenthesized(),
            other => other,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind<'ast> {
    /// 32-bit integer literal
    Int(i32),
    /// `true` / `false`
    Bool(bool),
    /// Character literal
    Char(char),
    /// String literal with escapes decoded
    String(&'ast str),
    /// `null`
    Null,
    /// `()`
    Unit,
}

/// A unary prefix operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr<'ast> {
    /// The operator
    pub op: UnaryOp,
    /// The operand
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Left operand
    pub left: &'ast Expr<'ast>,
    /// The operator
    pub op: BinaryOp,
    /// Right operand
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

/// An assignment `target = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr<'ast> {
    /// Assignment target
    pub target: &'ast Expr<'ast>,
    /// Assigned value
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

/// A call `callee(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr<'ast> {
    /// The called expression: an identifier or a member access
    pub callee: &'ast Expr<'ast>,
    /// Arguments
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

/// A member access `object.member`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr<'ast> {
    /// The receiver
    pub object: &'ast Expr<'ast>,
    /// The member name
    pub member: Ident<'ast>,
    pub span: Span,
}

/// An indexing operation `object[index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr<'ast> {
    /// The indexed value
    pub object: &'ast Expr<'ast>,
    /// The index
    pub index: &'ast Expr<'ast>,
    pub span: Span,
}

/// An object construction `new T(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr<'ast> {
    /// The constructed type
    pub ty: TypeExpr<'ast>,
    /// Constructor arguments
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

/// An array allocation `new Array[T](size)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArrayExpr<'ast> {
    /// The element type
    pub element: TypeExpr<'ast>,
    /// The number of elements
    pub size: &'ast Expr<'ast>,
    pub span: Span,
}

/// A parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr<'ast> {
    /// The inner expression
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

/// A block `{ stmt* }`. Its value is the trailing expression statement, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockExpr<'ast> {
    /// Statements in order
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// An `if` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr<'ast> {
    /// Condition
    pub condition: &'ast Expr<'ast>,
    /// Then branch
    pub then_branch: &'ast Expr<'ast>,
    /// Optional else branch
    pub else_branch: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// A `while` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileExpr<'ast> {
    /// Loop condition
    pub condition: &'ast Expr<'ast>,
    /// Loop body
    pub body: &'ast Expr<'ast>,
    pub span: Span,
}

/// A `for (i <- lo to hi)` loop with an inclusive upper bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ForExpr<'ast> {
    /// Loop variable
    pub variable: Ident<'ast>,
    /// Lower bound
    pub lower: &'ast Expr<'ast>,
    /// Inclusive upper bound
    pub upper: &'ast Expr<'ast>,
    /// Loop body
    pub body: &'ast Expr<'ast>,
    pub span: Span,
}
