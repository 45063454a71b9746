//! Text rendering of typed trees, for debugging and tests.

use std::fmt::Write;

use ember_core::{ConstantValue, SymbolTable, Type};

use super::{Body, Expr, ExprKind, Stmt, Variable};

/// Renders typed expressions and statements using symbol names.
///
/// # Example
///
/// ```
/// use ember_compiler::typed::{Body, Expr, Printer, Stmt};
/// use ember_core::{ConstantValue, Span, SymbolTable};
///
/// let table = SymbolTable::new();
/// let body = Body::new(vec![Stmt::Expression(Expr::literal(
///     ConstantValue::Int(1),
///     Span::default(),
/// ))]);
/// assert_eq!(Printer::new(&table).body(&body), "1\n");
/// ```
pub struct Printer<'a> {
    table: &'a SymbolTable,
}

impl<'a> Printer<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table }
    }

    /// Render every statement of a body, one per line.
    pub fn body(&self, body: &Body) -> String {
        let mut out = String::new();
        for stmt in &body.statements {
            self.write_stmt(&mut out, stmt, 0);
        }
        out
    }

    /// Render a single statement without a trailing newline.
    pub fn stmt(&self, stmt: &Stmt) -> String {
        let mut out = String::new();
        self.write_stmt(&mut out, stmt, 0);
        out.truncate(out.trim_end().len());
        out
    }

    /// Render an expression.
    pub fn expr(&self, expr: &Expr) -> String {
        let mut out = String::new();
        self.write_expr(&mut out, expr, 0);
        out
    }

    fn name(&self, variable: Variable) -> String {
        match variable {
            Variable::Symbol(id) => self.table.get(id).name.clone(),
            Variable::Temp(temp) => temp.to_string(),
        }
    }

    fn indent(out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("    ");
        }
    }

    fn write_stmt(&self, out: &mut String, stmt: &Stmt, depth: usize) {
        Self::indent(out, depth);
        match stmt {
            Stmt::Expression(expr) => self.write_expr(out, expr, depth),
            Stmt::VariableDeclaration {
                variable,
                initializer,
            } => {
                let _ = write!(out, "val {} = ", self.name(*variable));
                self.write_expr(out, initializer, depth);
            }
            Stmt::Assignment { target, value } => {
                self.write_expr(out, target, depth);
                out.push_str(" = ");
                self.write_expr(out, value, depth);
            }
            Stmt::Label(label) => {
                let _ = write!(out, "{}:", label);
            }
            Stmt::Goto(label) => {
                let _ = write!(out, "goto {}", label);
            }
            Stmt::ConditionalGoto {
                label,
                condition,
                jump_if_true,
            } => {
                let _ = write!(
                    out,
                    "goto {} {} ",
                    label,
                    if *jump_if_true { "if" } else { "unless" }
                );
                self.write_expr(out, condition, depth);
            }
        }
        out.push('\n');
    }

    fn write_args(&self, out: &mut String, args: &[Expr], depth: usize) {
        out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_expr(out, arg, depth);
        }
        out.push(')');
    }

    fn write_expr(&self, out: &mut String, expr: &Expr, depth: usize) {
        match &expr.kind {
            ExprKind::Error => out.push_str("<error>"),
            ExprKind::Literal => match &expr.constant {
                Some(ConstantValue::String(s)) => {
                    let _ = write!(out, "{:?}", s);
                }
                Some(ConstantValue::Char(c)) => {
                    let _ = write!(out, "{:?}", c);
                }
                Some(value) => {
                    let _ = write!(out, "{}", value);
                }
                None => out.push_str("null"),
            },
            ExprKind::Variable(variable) => out.push_str(&self.name(*variable)),
            ExprKind::Field { receiver, field } => {
                self.write_expr(out, receiver, depth);
                let _ = write!(out, ".{}", self.table.get(*field).name);
            }
            ExprKind::Index { array, index } => {
                self.write_expr(out, array, depth);
                out.push('[');
                self.write_expr(out, index, depth);
                out.push(']');
            }
            ExprKind::ArrayLength(array) => {
                self.write_expr(out, array, depth);
                out.push_str(".length");
            }
            ExprKind::This => out.push_str("this"),
            ExprKind::Assignment { target, value } => {
                self.write_expr(out, target, depth);
                out.push_str(" = ");
                self.write_expr(out, value, depth);
            }
            ExprKind::Unary { op, operand } => {
                let _ = write!(out, "({}", op);
                self.write_expr(out, operand, depth);
                out.push(')');
            }
            ExprKind::Binary { op, left, right } => {
                out.push('(');
                self.write_expr(out, left, depth);
                let _ = write!(out, " {} ", op);
                self.write_expr(out, right, depth);
                out.push(')');
            }
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                if let Some(receiver) = receiver {
                    self.write_expr(out, receiver, depth);
                    out.push('.');
                }
                out.push_str(&self.table.get(*method).name);
                self.write_args(out, args, depth);
            }
            ExprKind::New { args, .. } => {
                let _ = write!(out, "new {}", self.table.display_type(&expr.ty));
                self.write_args(out, args, depth);
            }
            ExprKind::NewArray { size } => {
                let element = expr.ty.element_type().cloned().unwrap_or(Type::Error);
                let _ = write!(out, "new Array[{}](", self.table.display_type(&element));
                self.write_expr(out, size, depth);
                out.push(')');
            }
            ExprKind::Conversion { operand, .. } => {
                let _ = write!(out, "{}(", self.table.display_type(&expr.ty));
                self.write_expr(out, operand, depth);
                out.push(')');
            }
            ExprKind::Block { statements, value } => {
                out.push_str("{\n");
                for stmt in statements {
                    self.write_stmt(out, stmt, depth + 1);
                }
                if let Some(value) = value {
                    Self::indent(out, depth + 1);
                    self.write_expr(out, value, depth + 1);
                    out.push('\n');
                }
                Self::indent(out, depth);
                out.push('}');
            }
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                out.push_str("if (");
                self.write_expr(out, condition, depth);
                out.push_str(") ");
                self.write_expr(out, then_branch, depth);
                if let Some(else_branch) = else_branch {
                    out.push_str(" else ");
                    self.write_expr(out, else_branch, depth);
                }
            }
            ExprKind::While {
                condition, body, ..
            } => {
                out.push_str("while (");
                self.write_expr(out, condition, depth);
                out.push_str(") ");
                self.write_expr(out, body, depth);
            }
            ExprKind::For {
                variable,
                lower,
                upper,
                body,
                ..
            } => {
                let _ = write!(out, "for ({} <- ", self.table.get(*variable).name);
                self.write_expr(out, lower, depth);
                out.push_str(" to ");
                self.write_expr(out, upper, depth);
                out.push_str(") ");
                self.write_expr(out, body, depth);
            }
            ExprKind::Break(label) => {
                let _ = write!(out, "break /* {} */", label);
            }
            ExprKind::Continue(label) => {
                let _ = write!(out, "continue /* {} */", label);
            }
        }
    }
}
