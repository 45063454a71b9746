//! Blocks, declarations, assignments and control flow.

use ember_core::{ConstantValue, SemanticError, Span, SymbolFlags, SymbolId, SymbolKind, Type};
use ember_parser::ast;

use super::{Binder, Result};
use crate::conversion::classify;
use crate::typed::{Expr, ExprKind, Stmt, Variable};

impl Binder {
    pub(super) fn bind_block(&mut self, block: &ast::BlockExpr<'_>) -> Result<Expr> {
        let saved = self.push_block();
        let mut statements = Vec::with_capacity(block.stmts.len());
        let mut value = None;

        for (i, stmt) in block.stmts.iter().enumerate() {
            match stmt {
                ast::Stmt::Expr(expr) if i + 1 == block.stmts.len() => {
                    value = Some(self.bind_expr(expr)?);
                }
                _ => statements.push(self.bind_stmt(stmt)?),
            }
        }
        self.pop_block(saved);

        let ty = value.as_ref().map_or(Type::Unit, |v| v.ty.clone());
        let constant = match &value {
            Some(value) if statements.is_empty() => value.constant.clone(),
            _ => None,
        };
        Ok(Expr::new(
            ExprKind::Block {
                statements,
                value: value.map(Box::new),
            },
            ty,
            block.span,
        )
        .with_constant(constant))
    }

    pub(super) fn bind_stmt(&mut self, stmt: &ast::Stmt<'_>) -> Result<Stmt> {
        match stmt {
            ast::Stmt::Expr(expr) => Ok(Stmt::Expression(self.bind_expr(expr)?)),
            ast::Stmt::Var(decl) => self.bind_var_decl(decl, true),
        }
    }

    /// `val`/`var`: a local inside blocks, a field at container level.
    ///
    /// Container-level declarations become an assignment to the field;
    /// `is_static` picks between a static field and an instance field
    /// assigned through `this`.
    pub(super) fn bind_var_decl(
        &mut self,
        decl: &ast::VarDecl<'_>,
        is_static: bool,
    ) -> Result<Stmt> {
        let initializer = self.bind_expr(decl.init)?;
        let ty = match &decl.ty {
            Some(annotation) => self.resolve_type(annotation),
            None if initializer.ty == Type::Null => {
                self.report(
                    SemanticError::CannotInferType {
                        name: decl.name.name.to_string(),
                    },
                    decl.name.span,
                );
                Type::Error
            }
            None => initializer.ty.clone(),
        };
        let initializer = self.convert(initializer, &ty, false);

        let mut flags = SymbolFlags::empty();
        if !decl.mutable {
            flags |= SymbolFlags::READONLY;
        }
        let location = Some(self.location(decl.name.span));
        let scope = self.context.scope;

        if self.scopes.get(scope).is_block() {
            let local = self.table.create(
                self.context.owner,
                SymbolKind::Local,
                decl.name.name,
                flags,
                location,
            );
            self.table.set_type(local, ty)?;
            if !self.scopes.declare_local(scope, decl.name.name, local) {
                self.report(
                    SemanticError::DuplicateDeclaration {
                        name: decl.name.name.to_string(),
                    },
                    decl.name.span,
                );
            }
            return Ok(Stmt::VariableDeclaration {
                variable: Variable::Symbol(local),
                initializer,
            });
        }

        if is_static {
            flags |= SymbolFlags::STATIC;
        }
        let owner = self.scopes.get(scope).owner;
        let field = self
            .table
            .create(owner, SymbolKind::Field, decl.name.name, flags, location);
        self.table.set_type(field, ty.clone())?;
        if !self.table.define(field) {
            self.report(
                SemanticError::DuplicateDeclaration {
                    name: decl.name.name.to_string(),
                },
                decl.name.span,
            );
            return Ok(Stmt::Expression(initializer));
        }

        let span = decl.name.span;
        let target = if is_static {
            Expr::variable(Variable::Symbol(field), ty, span)
        } else {
            Expr::new(
                ExprKind::Field {
                    receiver: Box::new(Expr::new(ExprKind::This, Type::Class(owner), span)),
                    field,
                },
                ty,
                span,
            )
        };
        Ok(Stmt::Assignment {
            target,
            value: initializer,
        })
    }

    pub(super) fn bind_assignment(&mut self, assign: &ast::AssignExpr<'_>) -> Result<Expr> {
        let target = self.bind_expr(assign.target)?;
        let value = self.bind_expr(assign.value)?;
        if target.is_error() {
            return Ok(Expr::error(assign.span));
        }

        let assigned = match &target.kind {
            ExprKind::Variable(Variable::Symbol(symbol))
            | ExprKind::Field { field: symbol, .. } => Some(*symbol),
            ExprKind::Index { .. } => None,
            _ => {
                self.report(SemanticError::InvalidAssignmentTarget, target.span);
                return Ok(Expr::error(assign.span));
            }
        };
        if let Some(symbol) = assigned
            && self.table.get(symbol).is_readonly()
        {
            self.report(
                SemanticError::ReadOnlyAssignment {
                    name: self.table.get(symbol).name.clone(),
                },
                target.span,
            );
            return Ok(Expr::error(assign.span));
        }

        let value = self.convert(value, &target.ty, false);
        Ok(Expr::new(
            ExprKind::Assignment {
                target: Box::new(target),
                value: Box::new(value),
            },
            Type::Unit,
            assign.span,
        ))
    }

    pub(super) fn bind_if(&mut self, if_expr: &ast::IfExpr<'_>) -> Result<Expr> {
        let condition = self.bind_expr(if_expr.condition)?;
        let condition = self.convert(condition, &Type::Bool, false);
        let then_branch = self.bind_expr(if_expr.then_branch)?;

        let Some(else_expr) = if_expr.else_branch else {
            return Ok(Expr::new(
                ExprKind::If {
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch: None,
                },
                Type::Unit,
                if_expr.span,
            ));
        };
        let else_branch = self.bind_expr(else_expr)?;

        let (then_branch, else_branch, ty) = if then_branch.is_error() || else_branch.is_error() {
            (then_branch, else_branch, Type::Error)
        } else if classify(&else_branch.ty, &then_branch.ty).is_implicit() {
            let ty = then_branch.ty.clone();
            let else_branch = self.convert(else_branch, &ty, false);
            (then_branch, else_branch, ty)
        } else if classify(&then_branch.ty, &else_branch.ty).is_implicit() {
            let ty = else_branch.ty.clone();
            let then_branch = self.convert(then_branch, &ty, false);
            (then_branch, else_branch, ty)
        } else {
            (then_branch, else_branch, Type::Unit)
        };

        let constant = match &condition.constant {
            Some(ConstantValue::Bool(true)) => then_branch.constant.clone(),
            Some(ConstantValue::Bool(false)) => else_branch.constant.clone(),
            _ => None,
        }
        .filter(|value| value.ty() == ty);

        Ok(Expr::new(
            ExprKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Some(Box::new(else_branch)),
            },
            ty,
            if_expr.span,
        )
        .with_constant(constant))
    }

    pub(super) fn bind_while(&mut self, while_expr: &ast::WhileExpr<'_>) -> Result<Expr> {
        let condition = self.bind_expr(while_expr.condition)?;
        let condition = self.convert(condition, &Type::Bool, false);

        let labels = self.labels.next_loop();
        self.loops.push(labels.clone());
        let body = self.bind_expr(while_expr.body);
        self.loops.pop();

        Ok(Expr::new(
            ExprKind::While {
                condition: Box::new(condition),
                body: Box::new(body?),
                break_label: labels.break_label,
                continue_label: labels.continue_label,
            },
            Type::Unit,
            while_expr.span,
        ))
    }

    pub(super) fn bind_for(&mut self, for_expr: &ast::ForExpr<'_>) -> Result<Expr> {
        let lower = self.bind_expr(for_expr.lower)?;
        let lower = self.convert(lower, &Type::Int, false);
        let upper = self.bind_expr(for_expr.upper)?;
        let upper = self.convert(upper, &Type::Int, false);

        let saved = self.push_block();
        let variable = self.declare_loop_variable(&for_expr.variable)?;

        let labels = self.labels.next_loop();
        self.loops.push(labels.clone());
        let body = self.bind_expr(for_expr.body);
        self.loops.pop();
        self.pop_block(saved);

        Ok(Expr::new(
            ExprKind::For {
                variable,
                lower: Box::new(lower),
                upper: Box::new(upper),
                body: Box::new(body?),
                break_label: labels.break_label,
                continue_label: labels.continue_label,
            },
            Type::Unit,
            for_expr.span,
        ))
    }

    fn declare_loop_variable(&mut self, name: &ast::Ident<'_>) -> Result<SymbolId> {
        let location = Some(self.location(name.span));
        let variable = self.table.create(
            self.context.owner,
            SymbolKind::Local,
            name.name,
            SymbolFlags::READONLY,
            location,
        );
        self.table.set_type(variable, Type::Int)?;
        self.scopes.declare_local(self.context.scope, name.name, variable);
        Ok(variable)
    }

    pub(super) fn bind_break(&mut self, span: Span) -> Expr {
        match self.loops.break_label().cloned() {
            Some(label) => Expr::new(ExprKind::Break(label), Type::Unit, span),
            None => {
                self.report(SemanticError::BreakOutsideLoop, span);
                Expr::error(span)
            }
        }
    }

    pub(super) fn bind_continue(&mut self, span: Span) -> Expr {
        match self.loops.continue_label().cloned() {
            Some(label) => Expr::new(ExprKind::Continue(label), Type::Unit, span),
            None => {
                self.report(SemanticError::ContinueOutsideLoop, span);
                Expr::error(span)
            }
        }
    }
}
