//! Expression binding.

use ember_core::{ConstantValue, SemanticError, SymbolId, SymbolKind, Type};
use ember_parser::ast::{self, LiteralKind};

use super::{Binder, Result};
use crate::const_eval::{fold_binary, fold_short_circuit, fold_unary};
use crate::operators::{lookup_binary, lookup_unary};
use crate::typed::{Expr, ExprKind, Variable};

impl Binder {
    /// Bind an expression in the current context.
    pub fn bind_expr(&mut self, expr: &ast::Expr<'_>) -> Result<Expr> {
        let span = expr.span();
        let bound = match expr {
            ast::Expr::Literal(literal) => bind_literal(&literal.kind, span),
            ast::Expr::Ident(ident) => self.bind_name(ident),
            ast::Expr::This(_) => self.bind_this(span),
            ast::Expr::Paren(paren) => self.bind_expr(paren.expr)?,
            ast::Expr::Unary(unary) => self.bind_unary(unary)?,
            ast::Expr::Binary(binary) => self.bind_binary(binary)?,
            ast::Expr::Index(index) => self.bind_index(index)?,
            ast::Expr::Member(member) => self.bind_member(member)?,
            ast::Expr::Call(call) => self.bind_call(call)?,
            ast::Expr::New(new) => self.bind_new(new)?,
            ast::Expr::NewArray(new) => self.bind_new_array(new)?,
            ast::Expr::Assign(assign) => self.bind_assignment(assign)?,
            ast::Expr::Block(block) => self.bind_block(block)?,
            ast::Expr::If(if_expr) => self.bind_if(if_expr)?,
            ast::Expr::While(while_expr) => self.bind_while(while_expr)?,
            ast::Expr::For(for_expr) => self.bind_for(for_expr)?,
            ast::Expr::Break(_) => self.bind_break(span),
            ast::Expr::Continue(_) => self.bind_continue(span),
        };
        Ok(bound)
    }

    fn bind_name(&mut self, ident: &ast::Ident<'_>) -> Expr {
        let scope = self.context.scope;
        let name = ident.name;
        if let Some(symbol) = self.scopes.lookup_variable(&self.table, scope, name) {
            return self.variable_expr(symbol, ident.span);
        }

        let kind = if self.scopes.lookup_type(&self.table, scope, name).is_some() {
            "type"
        } else if self.scopes.lookup_namespace(&self.table, scope, name).is_some() {
            "namespace"
        } else if !self.scopes.lookup_methods(&self.table, scope, name).is_empty() {
            "method"
        } else {
            self.report(
                SemanticError::UndefinedName {
                    name: name.to_string(),
                },
                ident.span,
            );
            return Expr::error(ident.span);
        };
        self.report(
            SemanticError::NotAValue {
                name: name.to_string(),
                kind: kind.to_string(),
            },
            ident.span,
        );
        Expr::error(ident.span)
    }

    /// A read of a variable found by simple-name lookup.
    ///
    /// Instance fields read through an implicit `this`.
    pub(super) fn variable_expr(&mut self, symbol: SymbolId, span: ember_core::Span) -> Expr {
        let ty = self.table.type_or_error(symbol);
        let entry = self.table.get(symbol);
        if entry.kind == SymbolKind::Field && !entry.is_static() {
            let owner = self.table.containing_type(symbol);
            return match self.context.this_type {
                Some(this) if Some(this) == owner => Expr::new(
                    ExprKind::Field {
                        receiver: Box::new(Expr::new(ExprKind::This, Type::Class(this), span)),
                        field: symbol,
                    },
                    ty,
                    span,
                ),
                _ => {
                    self.report(SemanticError::ThisOutsideClass, span);
                    Expr::error(span)
                }
            };
        }
        Expr::variable(Variable::Symbol(symbol), ty, span)
    }

    fn bind_this(&mut self, span: ember_core::Span) -> Expr {
        match self.context.this_type {
            Some(this) => Expr::new(ExprKind::This, Type::Class(this), span),
            None => {
                self.report(SemanticError::ThisOutsideClass, span);
                Expr::error(span)
            }
        }
    }

    fn bind_unary(&mut self, unary: &ast::UnaryExpr<'_>) -> Result<Expr> {
        let operand = self.bind_expr(unary.operand)?;
        if operand.is_error() {
            return Ok(Expr::error(unary.span));
        }

        let Some(operator) = lookup_unary(unary.op, &operand.ty) else {
            self.report(
                SemanticError::UndefinedUnaryOperator {
                    op: unary.op.as_str().to_string(),
                    operand: self.display_type(&operand.ty),
                },
                unary.span,
            );
            return Ok(Expr::error(unary.span));
        };

        let constant = operand
            .constant
            .as_ref()
            .and_then(|value| fold_unary(operator.kind, value));
        Ok(Expr::new(
            ExprKind::Unary {
                op: operator.kind,
                operand: Box::new(operand),
            },
            operator.result,
            unary.span,
        )
        .with_constant(constant))
    }

    fn bind_binary(&mut self, binary: &ast::BinaryExpr<'_>) -> Result<Expr> {
        let left = self.bind_expr(binary.left)?;
        let right = self.bind_expr(binary.right)?;
        if left.is_error() || right.is_error() {
            return Ok(Expr::error(binary.span));
        }

        let Some(operator) = lookup_binary(binary.op, &left.ty, &right.ty) else {
            self.report(
                SemanticError::UndefinedBinaryOperator {
                    op: binary.op.as_str().to_string(),
                    left: self.display_type(&left.ty),
                    right: self.display_type(&right.ty),
                },
                binary.span,
            );
            return Ok(Expr::error(binary.span));
        };

        let constant = match (&left.constant, &right.constant) {
            (Some(l), Some(r)) => fold_binary(operator.kind, l, r),
            (Some(l), None) if binary.op.is_logical() => fold_short_circuit(operator.kind, l),
            _ => None,
        };
        Ok(Expr::new(
            ExprKind::Binary {
                op: operator.kind,
                left: Box::new(left),
                right: Box::new(right),
            },
            operator.result,
            binary.span,
        )
        .with_constant(constant))
    }

    fn bind_index(&mut self, index: &ast::IndexExpr<'_>) -> Result<Expr> {
        let array = self.bind_expr(index.object)?;
        let position = self.bind_expr(index.index)?;
        if array.is_error() {
            return Ok(Expr::error(index.span));
        }

        let Some(element) = array.ty.element_type().cloned() else {
            self.report(
                SemanticError::NotIndexable {
                    ty: self.display_type(&array.ty),
                },
                index.span,
            );
            return Ok(Expr::error(index.span));
        };
        let position = self.convert(position, &Type::Int, false);
        Ok(Expr::new(
            ExprKind::Index {
                array: Box::new(array),
                index: Box::new(position),
            },
            element,
            index.span,
        ))
    }

    fn bind_new(&mut self, new: &ast::NewExpr<'_>) -> Result<Expr> {
        let ty = self.resolve_type(&new.ty);
        let args = self.bind_args(new.args)?;
        match ty {
            Type::Error => Ok(Expr::error(new.span)),
            Type::Class(class) if !self.table.get(class).is_singleton() => {
                Ok(self.bind_constructor(class, args, new.span))
            }
            other => {
                self.report(
                    SemanticError::TypeMismatch {
                        expected: "class".to_string(),
                        found: self.display_type(&other),
                    },
                    new.span,
                );
                Ok(Expr::error(new.span))
            }
        }
    }

    fn bind_new_array(&mut self, new: &ast::NewArrayExpr<'_>) -> Result<Expr> {
        let element = self.resolve_type(&new.element);
        let size = self.bind_expr(new.size)?;
        let size = self.convert(size, &Type::Int, false);
        if element.is_error() {
            return Ok(Expr::error(new.span));
        }
        Ok(Expr::new(
            ExprKind::NewArray {
                size: Box::new(size),
            },
            Type::array(element),
            new.span,
        ))
    }
}

fn bind_literal(kind: &LiteralKind<'_>, span: ember_core::Span) -> Expr {
    match kind {
        LiteralKind::Int(value) => Expr::literal(ConstantValue::Int(*value), span),
        LiteralKind::Bool(value) => Expr::literal(ConstantValue::Bool(*value), span),
        LiteralKind::Char(value) => Expr::literal(ConstantValue::Char(*value), span),
        LiteralKind::String(value) => Expr::literal(ConstantValue::String(value.to_string()), span),
        LiteralKind::Null => Expr::null(span),
        LiteralKind::Unit => Expr::unit(span),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{bind_program, bind_script, entry_text, errors};
    use ember_core::SemanticError;

    #[test]
    fn constants_fold_through_operators() {
        let assembly = bind_script("val x = 1 + 2 * 3\nx");
        assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
        assert!(entry_text(&assembly).contains("= 7"));
    }

    #[test]
    fn short_circuit_folds_on_left_constant() {
        let assembly = bind_script("def f(): bool = true\nfalse && f()");
        assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
        assert!(entry_text(&assembly).contains("false"));
    }

    #[test]
    fn undefined_name() {
        let assembly = bind_program("def f(): int = y");
        assert_eq!(
            errors(&assembly),
            vec![SemanticError::UndefinedName {
                name: "y".to_string()
            }]
        );
    }

    #[test]
    fn type_used_as_value() {
        let assembly = bind_program("class P() {}\ndef f(): int = P");
        assert_eq!(
            errors(&assembly),
            vec![SemanticError::NotAValue {
                name: "P".to_string(),
                kind: "type".to_string()
            }]
        );
    }

    #[test]
    fn undefined_binary_operator() {
        let assembly = bind_program("def f(): int = 1 + true");
        assert_eq!(
            errors(&assembly),
            vec![SemanticError::UndefinedBinaryOperator {
                op: "+".to_string(),
                left: "int".to_string(),
                right: "bool".to_string()
            }]
        );
    }

    #[test]
    fn undefined_unary_operator() {
        let assembly = bind_program("def f(): bool = -true");
        assert_eq!(
            errors(&assembly),
            vec![SemanticError::UndefinedUnaryOperator {
                op: "-".to_string(),
                operand: "bool".to_string()
            }]
        );
    }

    #[test]
    fn string_concatenation() {
        let assembly = bind_script("\"a\" + \"b\"");
        assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
        assert!(entry_text(&assembly).contains("\"ab\""));
    }

    #[test]
    fn indexing_non_array() {
        let assembly = bind_program("def f(x: int): int = x[0]");
        assert_eq!(
            errors(&assembly),
            vec![SemanticError::NotIndexable {
                ty: "int".to_string()
            }]
        );
    }

    #[test]
    fn this_outside_class() {
        let assembly = bind_program("def f(): int = this");
        assert_eq!(errors(&assembly), vec![SemanticError::ThisOutsideClass]);
    }

    #[test]
    fn reference_equality_with_null() {
        let assembly = bind_program("class P() {}\ndef f(p: P): bool = p == null");
        assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
    }

    #[test]
    fn new_on_object_is_a_mismatch() {
        let assembly = bind_program("object O {}\ndef f(): unit = { new O() }");
        assert_eq!(
            errors(&assembly),
            vec![SemanticError::TypeMismatch {
                expected: "class".to_string(),
                found: "O".to_string()
            }]
        );
    }

    #[test]
    fn new_array_has_array_type() {
        let assembly = bind_program("def f(): Array[int] = new Array[int](3)");
        assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
    }
}
