//! Type annotations and conversions.

use ember_core::{SemanticError, SymbolKind, Type};
use ember_parser::ast::TypeExpr;

use super::Binder;
use crate::const_eval::fold_conversion;
use crate::conversion::{Conversion, classify};
use crate::typed::{Expr, ExprKind};

impl Binder {
    /// Resolve a written type in the current scope.
    ///
    /// Unknown names report once and resolve to [`Type::Error`].
    pub fn resolve_type(&mut self, ty: &TypeExpr<'_>) -> Type {
        match ty {
            TypeExpr::Array { element, .. } => Type::array(self.resolve_type(element)),
            TypeExpr::Named(name) => {
                let segments = name.names();
                if let [single] = segments.as_slice()
                    && let Some(builtin) = Type::from_builtin_name(single)
                {
                    return builtin;
                }

                match self.resolve_type_path(&segments) {
                    Some(symbol) => Type::Class(symbol),
                    None => {
                        self.report(
                            SemanticError::UndefinedType {
                                name: name.to_string(),
                            },
                            name.span,
                        );
                        Type::Error
                    }
                }
            }
        }
    }

    /// `A.B.C`: the first segment is looked up lexically, the rest as members.
    fn resolve_type_path(&self, segments: &[&str]) -> Option<ember_core::SymbolId> {
        let (first, rest) = segments.split_first()?;
        let scope = self.context.scope;
        let start = self
            .scopes
            .lookup_type(&self.table, scope, first)
            .or_else(|| self.scopes.lookup_namespace(&self.table, scope, first))?;
        let symbol = self.table.resolve_qualified(start, rest)?;
        (self.table.get(symbol).kind == SymbolKind::Type).then_some(symbol)
    }

    /// Convert `expr` to `to`.
    ///
    /// Without `allow_explicit`, an explicit-only conversion is reported but
    /// still applied. A missing conversion reports unless an error type is
    /// involved and yields an error node.
    pub fn convert(&mut self, expr: Expr, to: &Type, allow_explicit: bool) -> Expr {
        let span = expr.span;
        if to.is_error() {
            return Expr::error(span);
        }

        let conversion = classify(&expr.ty, to);
        match conversion {
            Conversion::Identity => expr,
            Conversion::None => {
                self.report(
                    SemanticError::NoConversion {
                        from: self.display_type(&expr.ty),
                        to: self.display_type(to),
                    },
                    span,
                );
                Expr::error(span)
            }
            Conversion::Explicit | Conversion::Implicit => {
                if conversion == Conversion::Explicit && !allow_explicit {
                    self.report(
                        SemanticError::ImplicitConversionRequired {
                            from: self.display_type(&expr.ty),
                            to: self.display_type(to),
                        },
                        span,
                    );
                }
                let constant = expr
                    .constant
                    .as_ref()
                    .and_then(|value| fold_conversion(value, to));
                Expr::new(
                    ExprKind::Conversion {
                        operand: Box::new(expr),
                        explicit: conversion == Conversion::Explicit,
                    },
                    to.clone(),
                    span,
                )
                .with_constant(constant)
            }
        }
    }
}
