//! The typed tree: fully resolved, type-checked program representation.
//!
//! Every expression carries its resolved [`Type`], an optional compile-time
//! constant and the span it was bound from. Trees are immutable: lowering
//! passes build new bodies rather than editing existing ones.
//!
//! After lowering, a [`Body`] only contains [`Stmt`]s of the goto vocabulary
//! and expressions free of control flow and assignments.

mod printer;

pub use printer::Printer;

use std::fmt;

use ember_core::{ConstantValue, Span, SymbolId, Type};

use crate::labels::BoundLabel;
use crate::operators::{BinaryOperatorKind, UnaryOperatorKind};

// ============================================================================
// Variables
// ============================================================================

/// A lowering temporary, numbered per body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TempId(pub u32);

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$t{}", self.0)
    }
}

/// Storage read or written by a variable expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    /// A local, parameter or static field.
    Symbol(SymbolId),
    /// A temporary introduced by lowering.
    Temp(TempId),
}

// ============================================================================
// Expressions
// ============================================================================

/// A typed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub constant: Option<ConstantValue>,
    pub span: Span,
}

/// The shape of a typed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// An expression that failed to bind. Always has type [`Type::Error`].
    Error,
    /// A literal; the value is in [`Expr::constant`], except for `null`.
    Literal,
    /// Read of a local, parameter, static field or temporary.
    Variable(Variable),
    /// Read of an instance field.
    Field { receiver: Box<Expr>, field: SymbolId },
    /// Array element read.
    Index { array: Box<Expr>, index: Box<Expr> },
    /// Length of an array.
    ArrayLength(Box<Expr>),
    /// The current instance.
    This,
    /// Assignment; Unit-typed. The target is a variable, field or index expression.
    Assignment { target: Box<Expr>, value: Box<Expr> },
    Unary {
        op: UnaryOperatorKind,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOperatorKind,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Static or instance method call.
    Call {
        receiver: Option<Box<Expr>>,
        method: SymbolId,
        args: Vec<Expr>,
    },
    /// Object construction through a constructor.
    New { constructor: SymbolId, args: Vec<Expr> },
    /// Array allocation; the element type is part of [`Expr::ty`].
    NewArray { size: Box<Expr> },
    /// Conversion of the operand to [`Expr::ty`].
    Conversion { operand: Box<Expr>, explicit: bool },
    /// Statements followed by an optional value.
    Block {
        statements: Vec<Stmt>,
        value: Option<Box<Expr>>,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    While {
        condition: Box<Expr>,
        body: Box<Expr>,
        break_label: BoundLabel,
        continue_label: BoundLabel,
    },
    /// Inclusive counting loop over a readonly local.
    For {
        variable: SymbolId,
        lower: Box<Expr>,
        upper: Box<Expr>,
        body: Box<Expr>,
        break_label: BoundLabel,
        continue_label: BoundLabel,
    },
    Break(BoundLabel),
    Continue(BoundLabel),
}

impl Expr {
    /// Create an expression with no constant value.
    pub fn new(kind: ExprKind, ty: Type, span: Span) -> Self {
        Self {
            kind,
            ty,
            constant: None,
            span,
        }
    }

    /// Attach a constant value.
    pub fn with_constant(mut self, constant: Option<ConstantValue>) -> Self {
        self.constant = constant;
        self
    }

    /// The error node.
    pub fn error(span: Span) -> Self {
        Self::new(ExprKind::Error, Type::Error, span)
    }

    /// A constant literal.
    pub fn literal(value: ConstantValue, span: Span) -> Self {
        Self::new(ExprKind::Literal, value.ty(), span).with_constant(Some(value))
    }

    /// The `()` literal.
    pub fn unit(span: Span) -> Self {
        Self::literal(ConstantValue::Unit, span)
    }

    /// The `null` literal.
    pub fn null(span: Span) -> Self {
        Self::new(ExprKind::Literal, Type::Null, span)
    }

    /// Read of a variable.
    pub fn variable(variable: Variable, ty: Type, span: Span) -> Self {
        Self::new(ExprKind::Variable(variable), ty, span)
    }

    /// Whether this is the error node or has the error type.
    pub fn is_error(&self) -> bool {
        self.ty.is_error()
    }

    /// Whether the expression can be evaluated without side effects and
    /// without observing writes made by other statements.
    pub fn is_stable(&self) -> bool {
        self.constant.is_some()
            || matches!(
                self.kind,
                ExprKind::Literal
                    | ExprKind::This
                    | ExprKind::Variable(Variable::Temp(_))
                    | ExprKind::Error
            )
    }

    /// Whether the expression contains no control flow, blocks or
    /// assignments, i.e. it is valid in a lowered body.
    pub fn is_flat(&self) -> bool {
        match &self.kind {
            ExprKind::Error
            | ExprKind::Literal
            | ExprKind::Variable(_)
            | ExprKind::This => true,
            ExprKind::Field { receiver, .. } => receiver.is_flat(),
            ExprKind::Index { array, index } => array.is_flat() && index.is_flat(),
            ExprKind::ArrayLength(array) => array.is_flat(),
            ExprKind::Unary { operand, .. } => operand.is_flat(),
            ExprKind::Binary { left, right, .. } => left.is_flat() && right.is_flat(),
            ExprKind::Call { receiver, args, .. } => {
                receiver.as_ref().is_none_or(|r| r.is_flat()) && args.iter().all(Expr::is_flat)
            }
            ExprKind::New { args, .. } => args.iter().all(Expr::is_flat),
            ExprKind::NewArray { size } => size.is_flat(),
            ExprKind::Conversion { operand, .. } => operand.is_flat(),
            ExprKind::Assignment { .. }
            | ExprKind::Block { .. }
            | ExprKind::If { .. }
            | ExprKind::While { .. }
            | ExprKind::For { .. }
            | ExprKind::Break(_)
            | ExprKind::Continue(_) => false,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// A typed statement.
///
/// Bound blocks only use `Expression`, `VariableDeclaration` and (for
/// synthesized constructors) `Assignment`; labels and gotos are introduced by
/// lowering.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Evaluate an expression. The last one executed before falling off the
    /// end of a body produces the body's value.
    Expression(Expr),
    /// Declare and initialize a local or temporary.
    VariableDeclaration { variable: Variable, initializer: Expr },
    /// Store into a variable, field or array element.
    Assignment { target: Expr, value: Expr },
    Label(BoundLabel),
    Goto(BoundLabel),
    /// Jump when `condition` evaluates to `jump_if_true`.
    ConditionalGoto {
        label: BoundLabel,
        condition: Expr,
        jump_if_true: bool,
    },
}

impl Stmt {
    /// Whether control never continues to the next statement.
    pub fn is_jump(&self) -> bool {
        matches!(self, Stmt::Goto(_) | Stmt::ConditionalGoto { .. })
    }
}

// ============================================================================
// Bodies
// ============================================================================

/// The statements of one method together with the temporaries they use.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub statements: Vec<Stmt>,
    /// Type of each temporary, indexed by [`TempId`].
    pub temps: Vec<Type>,
}

impl Body {
    /// A body with no temporaries.
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self {
            statements,
            temps: Vec::new(),
        }
    }

    /// Whether every statement is in lowered form.
    pub fn is_lowered(&self) -> bool {
        self.statements.iter().all(|stmt| match stmt {
            Stmt::Expression(expr) => expr.is_flat(),
            Stmt::VariableDeclaration { initializer, .. } => initializer.is_flat(),
            Stmt::Assignment { target, value } => target.is_flat() && value.is_flat(),
            Stmt::ConditionalGoto { condition, .. } => condition.is_flat(),
            Stmt::Label(_) | Stmt::Goto(_) => true,
        })
    }
}
