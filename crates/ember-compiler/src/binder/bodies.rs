//! Member initializers and method bodies.

use ember_core::{SemanticError, Span, SymbolId, Type};
use ember_parser::ast::Member;

use super::declarations::{PendingFunction, PendingType, TypeDecl};
use super::{Binder, Context, Result};
use crate::flow::ControlFlowGraph;
use crate::lowering::lower;
use crate::typed::{Body, Expr, ExprKind, Stmt, Variable};

impl Binder {
    // ==========================================================================
    // Phase 3: fields and body statements of types
    // ==========================================================================

    /// Declare the fields of every class and object and bind their
    /// initializers together with the body statements, in source order.
    pub(super) fn bind_field_initializers(&mut self, types: &mut [PendingType<'_>]) -> Result<()> {
        for pending in types.iter_mut() {
            let members = match pending.decl {
                TypeDecl::Class(class) => class.members,
                TypeDecl::Object(object) => object.members,
            };
            let saved = self.enter(Context {
                file: pending.file,
                scope: pending.scope,
                owner: pending.constructor,
                this_type: (!pending.is_object()).then_some(pending.symbol),
            });
            let saved_loops = std::mem::take(&mut self.loops);

            for member in members {
                let stmt = match member {
                    Member::Field(decl) => self.bind_var_decl(decl, pending.is_object())?,
                    Member::Statement(expr) => Stmt::Expression(self.bind_expr(expr)?),
                    Member::Function(_) => continue,
                };
                pending.initializers.push(stmt);
            }

            self.loops = saved_loops;
            self.leave(saved);
        }
        Ok(())
    }

    // ==========================================================================
    // Phase 5: bodies
    // ==========================================================================

    /// Constructors assign the parameter fields, then run the initializers.
    /// Static initializers of objects only run the initializers.
    pub(super) fn bind_constructors(&mut self, types: Vec<PendingType<'_>>) -> Result<()> {
        for pending in types {
            self.context.file = pending.file;
            let mut statements =
                Vec::with_capacity(pending.parameter_fields.len() + pending.initializers.len());

            for &(field, parameter) in &pending.parameter_fields {
                let span = self
                    .table
                    .get(field)
                    .location
                    .map(|location| location.span)
                    .unwrap_or_default();
                let this = Expr::new(ExprKind::This, Type::Class(pending.symbol), span);
                let target = Expr::new(
                    ExprKind::Field {
                        receiver: Box::new(this),
                        field,
                    },
                    self.table.type_or_error(field),
                    span,
                );
                let value = Expr::variable(
                    Variable::Symbol(parameter),
                    self.table.type_or_error(parameter),
                    span,
                );
                statements.push(Stmt::Assignment { target, value });
            }
            statements.extend(pending.initializers);

            let before = self.diagnostics.len();
            self.finish_body(pending.constructor, statements, None, before)?;
        }
        Ok(())
    }

    /// Bind the body of every declared function and method.
    pub(super) fn bind_functions(&mut self, functions: &[PendingFunction<'_>]) -> Result<()> {
        for function in functions {
            let scope = self.scopes.block(function.symbol, function.scope);
            let saved = self.enter(Context {
                file: function.file,
                scope,
                owner: function.symbol,
                this_type: function.this_type,
            });
            let saved_loops = std::mem::take(&mut self.loops);
            let before = self.diagnostics.len();

            let body = self.bind_expr(function.decl.body)?;
            let return_type = self.table.type_or_error(function.symbol);
            let (statement, check) = if return_type.is_unit() || return_type.is_error() {
                (Stmt::Expression(body), None)
            } else {
                let body = self.convert(body, &return_type, false);
                (Stmt::Expression(body), Some(function.decl.name.span))
            };
            self.finish_body(function.symbol, vec![statement], check, before)?;

            self.loops = saved_loops;
            self.leave(saved);
        }
        Ok(())
    }

    pub(super) fn bind_entry_body(
        &mut self,
        synthesized: Option<(SymbolId, Vec<Stmt>)>,
    ) -> Result<()> {
        if let Some((entry, statements)) = synthesized {
            let before = self.diagnostics.len();
            self.finish_body(entry, statements, None, before)?;
        }
        Ok(())
    }

    /// Lower a bound body and store it.
    ///
    /// With `check_span` set, a body that bound without new diagnostics is
    /// checked for a value on every path.
    fn finish_body(
        &mut self,
        method: SymbolId,
        statements: Vec<Stmt>,
        check_span: Option<Span>,
        diagnostics_before: usize,
    ) -> Result<()> {
        let body = lower(&Body::new(statements));

        if let Some(span) = check_span
            && self.options.check_return_paths
            && self.diagnostics.len() == diagnostics_before
        {
            let graph = ControlFlowGraph::build(&body)?;
            if !graph.all_paths_return() {
                self.report(
                    SemanticError::NotAllPathsReturn {
                        name: self.table.get(method).name.clone(),
                    },
                    span,
                );
            }
        }

        tracing::trace!(
            method = %self.table.qualified_name(method),
            statements = body.statements.len(),
            temps = body.temps.len(),
            "body bound"
        );
        self.bodies.insert(method, body)
    }
}
