//! Member access and member calls.
//!
//! The left side of a dot is bound as a [`Receiver`]: a value, a type or a
//! namespace. Types and namespaces only expose their static members.

use ember_core::{SemanticError, Span, SymbolFlags, SymbolId, SymbolKind, Type};
use ember_parser::ast;

use super::{Binder, Result};
use crate::typed::{Expr, ExprKind, Variable};

const ARRAY_LENGTH: &str = "length";

/// What the left side of a member access denotes.
enum Receiver {
    Value(Expr),
    Type(SymbolId),
    Namespace(SymbolId),
}

impl Binder {
    pub(super) fn bind_member(&mut self, member: &ast::MemberExpr<'_>) -> Result<Expr> {
        let receiver = self.bind_receiver(member.object)?;
        Ok(self.member_value(receiver, &member.member, member.span))
    }

    fn bind_receiver(&mut self, expr: &ast::Expr<'_>) -> Result<Receiver> {
        match expr.unparenthesized() {
            ast::Expr::Ident(ident) => {
                let scope = self.context.scope;
                if self.scopes.lookup_variable(&self.table, scope, ident.name).is_none() {
                    if let Some(ty) = self.scopes.lookup_type(&self.table, scope, ident.name) {
                        return Ok(Receiver::Type(ty));
                    }
                    if let Some(ns) = self.scopes.lookup_namespace(&self.table, scope, ident.name) {
                        return Ok(Receiver::Namespace(ns));
                    }
                }
                self.bind_expr(expr).map(Receiver::Value)
            }
            ast::Expr::Member(member) => {
                let inner = self.bind_receiver(member.object)?;
                if let Receiver::Type(container) | Receiver::Namespace(container) = inner
                    && let Some(nested) = self.table.container_member(container, member.member.name)
                {
                    return Ok(match self.table.get(nested).kind {
                        SymbolKind::Namespace => Receiver::Namespace(nested),
                        _ => Receiver::Type(nested),
                    });
                }
                Ok(Receiver::Value(self.member_value(inner, &member.member, member.span)))
            }
            other => self.bind_expr(other).map(Receiver::Value),
        }
    }

    fn member_value(&mut self, receiver: Receiver, member: &ast::Ident<'_>, span: Span) -> Expr {
        let name = member.name;
        match receiver {
            Receiver::Value(value) => {
                if value.is_error() {
                    return Expr::error(span);
                }
                match value.ty.clone() {
                    Type::Array(_) if name == ARRAY_LENGTH => {
                        Expr::new(ExprKind::ArrayLength(Box::new(value)), Type::Int, span)
                    }
                    Type::Class(class) => {
                        let Some(found) = self.table.members(class, name).first().copied() else {
                            return self.undefined_member(&value.ty, name, span);
                        };
                        let field = self
                            .table
                            .members(class, name)
                            .iter()
                            .copied()
                            .find(|&m| self.table.get(m).kind == SymbolKind::Field);
                        match field {
                            Some(field) if self.table.get(field).is_static() => {
                                self.static_field(field, span)
                            }
                            Some(field) => Expr::new(
                                ExprKind::Field {
                                    receiver: Box::new(value),
                                    field,
                                },
                                self.table.type_or_error(field),
                                span,
                            ),
                            None => self.not_a_value(found, span),
                        }
                    }
                    other => self.undefined_member(&other, name, span),
                }
            }
            Receiver::Type(class) => {
                let members = self.table.members(class, name).to_vec();
                let field = members.iter().copied().find(|&m| {
                    let entry = self.table.get(m);
                    entry.kind == SymbolKind::Field && entry.is_static()
                });
                match (field, members.first()) {
                    (Some(field), _) => self.static_field(field, span),
                    (None, Some(&found)) if self.table.get(found).kind != SymbolKind::Field => {
                        self.not_a_value(found, span)
                    }
                    _ => self.undefined_member(&Type::Class(class), name, span),
                }
            }
            Receiver::Namespace(namespace) => {
                let members = self.table.members(namespace, name).to_vec();
                let field = members
                    .iter()
                    .copied()
                    .find(|&m| self.table.get(m).kind == SymbolKind::Field);
                match (field, members.first()) {
                    (Some(field), _) => self.static_field(field, span),
                    (None, Some(&found)) => self.not_a_value(found, span),
                    (None, None) => {
                        self.report(
                            SemanticError::UndefinedMember {
                                container: self.table.qualified_name(namespace),
                                name: name.to_string(),
                            },
                            span,
                        );
                        Expr::error(span)
                    }
                }
            }
        }
    }

    fn static_field(&self, field: SymbolId, span: Span) -> Expr {
        Expr::variable(Variable::Symbol(field), self.table.type_or_error(field), span)
    }

    fn not_a_value(&mut self, symbol: SymbolId, span: Span) -> Expr {
        let entry = self.table.get(symbol);
        let error = SemanticError::NotAValue {
            name: entry.name.clone(),
            kind: entry.kind.describe().to_string(),
        };
        self.report(error, span);
        Expr::error(span)
    }

    fn undefined_member(&mut self, container: &Type, name: &str, span: Span) -> Expr {
        self.report(
            SemanticError::UndefinedMember {
                container: self.display_type(container),
                name: name.to_string(),
            },
            span,
        );
        Expr::error(span)
    }

    /// `receiver.name(args)`.
    pub(super) fn bind_member_call(
        &mut self,
        member: &ast::MemberExpr<'_>,
        args: Vec<Expr>,
        span: Span,
    ) -> Result<Expr> {
        let receiver = self.bind_receiver(member.object)?;
        let name = member.member.name;

        let callable = |binder: &Self, container: SymbolId, static_only: bool| -> Vec<SymbolId> {
            binder
                .table
                .members(container, name)
                .iter()
                .copied()
                .filter(|&m| {
                    let entry = binder.table.get(m);
                    entry.kind == SymbolKind::Method
                        && !entry.has(SymbolFlags::CONSTRUCTOR)
                        && (!static_only || entry.is_static())
                })
                .collect()
        };

        let expr = match receiver {
            Receiver::Value(value) => {
                if value.is_error() {
                    return Ok(Expr::error(span));
                }
                let Type::Class(class) = value.ty.clone() else {
                    return Ok(self.undefined_member(&value.ty, name, member.member.span));
                };
                let methods = callable(&*self, class, false);
                if methods.is_empty() {
                    return Ok(self.not_callable(class, name, member.member.span));
                }
                match self.resolve_call(name, &methods, args, span) {
                    Some((method, args)) => {
                        let receiver =
                            (!self.table.get(method).is_static()).then(|| Box::new(value));
                        self.call_expr(receiver, method, args, span)
                    }
                    None => Expr::error(span),
                }
            }
            Receiver::Type(class) => {
                let methods = callable(&*self, class, true);
                if methods.is_empty() {
                    return Ok(self.not_callable(class, name, member.member.span));
                }
                match self.resolve_call(name, &methods, args, span) {
                    Some((method, args)) => self.call_expr(None, method, args, span),
                    None => Expr::error(span),
                }
            }
            Receiver::Namespace(namespace) => {
                let methods = callable(&*self, namespace, true);
                if !methods.is_empty() {
                    match self.resolve_call(name, &methods, args, span) {
                        Some((method, args)) => self.call_expr(None, method, args, span),
                        None => Expr::error(span),
                    }
                } else if let Some(class) = self
                    .table
                    .container_member(namespace, name)
                    .filter(|&s| self.table.get(s).kind == SymbolKind::Type)
                {
                    self.bind_constructor(class, args, span)
                } else {
                    self.report(
                        SemanticError::UndefinedMember {
                            container: self.table.qualified_name(namespace),
                            name: name.to_string(),
                        },
                        member.member.span,
                    );
                    Expr::error(span)
                }
            }
        };
        Ok(expr)
    }

    /// A call of a member that exists but is no method, or does not exist.
    fn not_callable(&mut self, container: SymbolId, name: &str, span: Span) -> Expr {
        if self.table.members(container, name).is_empty() {
            self.undefined_member(&Type::Class(container), name, span)
        } else {
            self.report(
                SemanticError::NotAFunction {
                    name: name.to_string(),
                },
                span,
            );
            Expr::error(span)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{bind_files, bind_program, bind_script, errors};
    use ember_core::SemanticError;

    #[test]
    fn instance_fields_and_methods() {
        let assembly = bind_program(
            "class P(x: int) {\n def get(): int = x\n}\ndef f(p: P): int = p.x + p.get()",
        );
        assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
    }

    #[test]
    fn object_members_through_type_name() {
        let assembly = bind_script(
            "object Counter {\n var count = 0\n def next(): int = count\n}\n\
             Counter.count = 3\nCounter.next()",
        );
        assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
    }

    #[test]
    fn array_length() {
        let assembly = bind_program("def f(a: Array[int]): int = a.length");
        assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
    }

    #[test]
    fn unknown_member_names_the_container() {
        let assembly = bind_program("class P() {}\ndef f(p: P): int = p.y");
        assert_eq!(
            errors(&assembly),
            vec![SemanticError::UndefinedMember {
                container: "P".to_string(),
                name: "y".to_string()
            }]
        );
    }

    #[test]
    fn method_read_without_call() {
        let assembly = bind_program("class P() {\n def m(): int = 1\n}\ndef f(p: P): int = p.m");
        assert_eq!(
            errors(&assembly),
            vec![SemanticError::NotAValue {
                name: "m".to_string(),
                kind: "method".to_string()
            }]
        );
    }

    #[test]
    fn instance_members_are_not_reachable_through_the_type() {
        let assembly = bind_program("class P(x: int) {}\ndef f(): int = P.x");
        assert_eq!(
            errors(&assembly),
            vec![SemanticError::UndefinedMember {
                container: "P".to_string(),
                name: "x".to_string()
            }]
        );
    }

    #[test]
    fn calling_a_field() {
        let assembly = bind_program("class P(x: int) {}\ndef f(p: P): int = p.x()");
        assert_eq!(
            errors(&assembly),
            vec![SemanticError::NotAFunction {
                name: "x".to_string()
            }]
        );
    }

    #[test]
    fn namespace_qualified_calls_and_constructors() {
        let assembly = bind_files(
            false,
            &[
                "namespace Geo\nclass Point(x: int) {}\ndef origin(): Point = new Point(0)",
                "def f(): int = Geo.origin().x + Geo.Point(1).x",
            ],
        );
        assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
    }

    #[test]
    fn error_receivers_stay_silent() {
        let assembly = bind_program("def f(): int = missing.x.y()");
        assert_eq!(
            errors(&assembly),
            vec![SemanticError::UndefinedName {
                name: "missing".to_string()
            }]
        );
    }
}
