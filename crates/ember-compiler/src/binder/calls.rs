//! Calls, constructor invocations and overload selection.

use ember_core::{SemanticError, Span, SymbolId, SymbolKind, Type};
use ember_parser::ast;

use super::{Binder, Result};
use crate::overload::{OverloadError, resolve_overload};
use crate::typed::{Expr, ExprKind};

const CONSTRUCTOR_NAME: &str = ".ctor";

impl Binder {
    pub(super) fn bind_args(&mut self, args: &[&ast::Expr<'_>]) -> Result<Vec<Expr>> {
        args.iter().map(|arg| self.bind_expr(arg)).collect()
    }

    pub(super) fn bind_call(&mut self, call: &ast::CallExpr<'_>) -> Result<Expr> {
        match call.callee.unparenthesized() {
            ast::Expr::Ident(ident) => {
                let args = self.bind_args(call.args)?;
                Ok(self.bind_simple_call(ident, args, call.span))
            }
            ast::Expr::Member(member) => {
                let args = self.bind_args(call.args)?;
                self.bind_member_call(member, args, call.span)
            }
            other => {
                let callee = self.bind_expr(other)?;
                self.bind_args(call.args)?;
                if !callee.is_error() {
                    self.report(
                        SemanticError::NotAFunction {
                            name: self.display_type(&callee.ty),
                        },
                        callee.span,
                    );
                }
                Ok(Expr::error(call.span))
            }
        }
    }

    /// `f(args)`: a conversion, function, method or constructor by simple name.
    fn bind_simple_call(
        &mut self,
        ident: &ast::Ident<'_>,
        mut args: Vec<Expr>,
        span: Span,
    ) -> Expr {
        let name = ident.name;
        if args.len() == 1
            && let Some(ty) = Type::from_builtin_name(name)
            && let Some(arg) = args.pop()
        {
            let mut converted = self.convert(arg, &ty, true);
            converted.span = span;
            return converted;
        }

        let scope = self.context.scope;
        // The nearest declaration wins, so a local hides an outer function.
        let nearest = self.scopes.lookup_single(&self.table, scope, name, |_| true);
        if let Some(found) = nearest
            && self.table.get(found).kind.is_variable()
        {
            self.report(
                SemanticError::NotAFunction {
                    name: name.to_string(),
                },
                ident.span,
            );
            return Expr::error(span);
        }

        let methods = self.scopes.lookup_methods(&self.table, scope, name);
        if !methods.is_empty() {
            let Some((method, args)) = self.resolve_call(name, &methods, args, span) else {
                return Expr::error(span);
            };
            let receiver = if self.table.get(method).is_static() {
                None
            } else {
                match self.context.this_type {
                    Some(this) => {
                        Some(Box::new(Expr::new(ExprKind::This, Type::Class(this), span)))
                    }
                    None => {
                        self.report(SemanticError::ThisOutsideClass, span);
                        return Expr::error(span);
                    }
                }
            };
            return self.call_expr(receiver, method, args, span);
        }

        if let Some(class) = self.scopes.lookup_type(&self.table, scope, name) {
            return self.bind_constructor(class, args, span);
        }

        if self.scopes.lookup_variable(&self.table, scope, name).is_some() {
            self.report(
                SemanticError::NotAFunction {
                    name: name.to_string(),
                },
                ident.span,
            );
        } else {
            self.report(
                SemanticError::UndefinedFunction {
                    name: name.to_string(),
                    arity: args.len(),
                },
                ident.span,
            );
        }
        Expr::error(span)
    }

    /// Build a call node typed by the method's return type.
    pub(super) fn call_expr(
        &self,
        receiver: Option<Box<Expr>>,
        method: SymbolId,
        args: Vec<Expr>,
        span: Span,
    ) -> Expr {
        let ty = self.table.type_or_error(method);
        Expr::new(
            ExprKind::Call {
                receiver,
                method,
                args,
            },
            ty,
            span,
        )
    }

    /// Pick the overload of `name` among `candidates` and convert the
    /// arguments to its parameter types.
    ///
    /// Returns `None` after reporting, or silently when an argument already
    /// failed and the choice is not obvious.
    pub(super) fn resolve_call(
        &mut self,
        name: &str,
        candidates: &[SymbolId],
        args: Vec<Expr>,
        span: Span,
    ) -> Option<(SymbolId, Vec<Expr>)> {
        let matching: Vec<SymbolId> = candidates
            .iter()
            .copied()
            .filter(|&c| self.table.parameters(c).len() == args.len())
            .collect();

        if matching.is_empty() {
            self.report(
                SemanticError::UndefinedFunction {
                    name: name.to_string(),
                    arity: args.len(),
                },
                span,
            );
            return None;
        }

        let method = if let [single] = matching.as_slice() {
            *single
        } else if args.iter().any(Expr::is_error) {
            return None;
        } else {
            let types: Vec<Type> = args.iter().map(|arg| arg.ty.clone()).collect();
            match resolve_overload(&matching, &types, &self.table) {
                Ok(found) => found.method,
                Err(OverloadError::Ambiguous(tied)) => {
                    let candidates = tied
                        .iter()
                        .map(|&m| self.table.display_signature(m))
                        .collect::<Vec<_>>()
                        .join(" and ");
                    self.report(
                        SemanticError::AmbiguousCall {
                            name: name.to_string(),
                            candidates,
                        },
                        span,
                    );
                    return None;
                }
                Err(OverloadError::NoMatch | OverloadError::NoCandidates { .. }) => {
                    let arguments = types
                        .iter()
                        .map(|ty| self.display_type(ty))
                        .collect::<Vec<_>>()
                        .join(", ");
                    self.report(
                        SemanticError::NoMatchingOverload {
                            name: name.to_string(),
                            arguments,
                        },
                        span,
                    );
                    return None;
                }
            }
        };

        let parameters = self.table.parameter_types(method);
        let args = args
            .into_iter()
            .zip(parameters.iter())
            .map(|(arg, ty)| self.convert(arg, ty, false))
            .collect();
        Some((method, args))
    }

    /// `C(args)` or `new C(args)`.
    pub(super) fn bind_constructor(
        &mut self,
        class: SymbolId,
        args: Vec<Expr>,
        span: Span,
    ) -> Expr {
        let entry = self.table.get(class);
        if entry.is_singleton() {
            self.report(
                SemanticError::NotAFunction {
                    name: entry.name.clone(),
                },
                span,
            );
            return Expr::error(span);
        }

        let constructors: Vec<SymbolId> = self
            .table
            .members(class, CONSTRUCTOR_NAME)
            .iter()
            .copied()
            .filter(|&m| self.table.get(m).kind == SymbolKind::Method)
            .collect();
        let name = self.table.qualified_name(class);
        match self.resolve_call(&name, &constructors, args, span) {
            Some((constructor, args)) => Expr::new(
                ExprKind::New { constructor, args },
                Type::Class(class),
                span,
            ),
            None => Expr::error(span),
        }
    }
}
