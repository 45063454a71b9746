//! Structured control flow to label/goto form.
//!
//! Statements come out in execution order. An expression whose operands
//! produce statements of their own (a block, an `if` used as a value, an
//! assignment) has its earlier operands evaluated into temporaries first, so
//! that hoisting a later operand never reorders side effects.

use ember_core::{ConstantValue, Span, Type};

use super::Pass;
use crate::labels::BoundLabel;
use crate::operators::BinaryOperatorKind;
use crate::typed::{Body, Expr, ExprKind, Stmt, TempId, Variable};

/// Rewrites `if`, `while`, `for`, `break`, `continue`, blocks and
/// assignments into the flat statement vocabulary.
pub struct ControlFlowLowering;

impl Pass for ControlFlowLowering {
    fn name(&self) -> &'static str {
        "control-flow"
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn run(&self, body: &Body) -> Body {
        let mut lowerer = Lowerer {
            out: Vec::with_capacity(body.statements.len()),
            temps: body.temps.clone(),
            next_label: 0,
        };
        for stmt in &body.statements {
            lowerer.statement(stmt.clone());
        }
        Body {
            statements: lowerer.out,
            temps: lowerer.temps,
        }
    }
}

struct Lowerer {
    out: Vec<Stmt>,
    temps: Vec<Type>,
    next_label: u32,
}

impl Lowerer {
    fn fresh(&mut self) -> u32 {
        let n = self.next_label;
        self.next_label += 1;
        n
    }

    fn temp(&mut self, ty: Type) -> TempId {
        let id = TempId(self.temps.len() as u32);
        self.temps.push(ty);
        id
    }

    fn emit(&mut self, stmt: Stmt) {
        self.out.push(stmt);
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn statement(&mut self, stmt: Stmt) {
        match stmt {
            Stmt::Expression(expr) => {
                if expr.ty.is_unit() || expr.is_error() {
                    self.effect(expr);
                } else {
                    let value = self.value(expr);
                    self.emit(Stmt::Expression(value));
                }
            }
            Stmt::VariableDeclaration {
                variable,
                initializer,
            } => {
                let initializer = self.value(initializer);
                self.emit(Stmt::VariableDeclaration {
                    variable,
                    initializer,
                });
            }
            Stmt::Assignment { target, value } => self.assign(target, value),
            Stmt::ConditionalGoto {
                label,
                condition,
                jump_if_true,
            } => {
                let condition = self.value(condition);
                self.emit(Stmt::ConditionalGoto {
                    label,
                    condition,
                    jump_if_true,
                });
            }
            Stmt::Label(_) | Stmt::Goto(_) => self.emit(stmt),
        }
    }

    /// Lower an expression evaluated only for its side effects.
    fn effect(&mut self, expr: Expr) {
        let Expr {
            kind,
            ty,
            constant,
            span,
        } = expr;

        match kind {
            ExprKind::Block { statements, value } => {
                for stmt in statements {
                    self.statement(stmt);
                }
                if let Some(value) = value {
                    self.effect(*value);
                }
            }
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.conditional(*condition, *then_branch, else_branch.map(|e| *e), None),
            ExprKind::While {
                condition,
                body,
                break_label,
                continue_label,
            } => {
                self.emit(Stmt::Label(continue_label.clone()));
                let condition = self.value(*condition);
                self.emit(Stmt::ConditionalGoto {
                    label: break_label.clone(),
                    condition,
                    jump_if_true: false,
                });
                self.effect(*body);
                self.emit(Stmt::Goto(continue_label));
                self.emit(Stmt::Label(break_label));
            }
            ExprKind::For {
                variable,
                lower,
                upper,
                body,
                break_label,
                continue_label,
            } => {
                let lower = self.value(*lower);
                self.emit(Stmt::VariableDeclaration {
                    variable: Variable::Symbol(variable),
                    initializer: lower,
                });

                let upper = self.value(*upper);
                let upper = if upper.constant.is_some() {
                    upper
                } else {
                    let temp = self.temp(Type::Int);
                    self.emit(Stmt::VariableDeclaration {
                        variable: Variable::Temp(temp),
                        initializer: upper,
                    });
                    Expr::variable(Variable::Temp(temp), Type::Int, span)
                };

                let top = BoundLabel::new(format!("loop{}", self.fresh()));
                let counter = Expr::variable(Variable::Symbol(variable), Type::Int, span);
                self.emit(Stmt::Label(top.clone()));
                self.emit(Stmt::ConditionalGoto {
                    label: break_label.clone(),
                    condition: binary(
                        BinaryOperatorKind::LessEqual,
                        counter.clone(),
                        upper,
                        Type::Bool,
                    ),
                    jump_if_true: false,
                });
                self.effect(*body);
                // `continue` lands on the increment.
                self.emit(Stmt::Label(continue_label));
                let one = Expr::literal(ConstantValue::Int(1), span);
                self.emit(Stmt::Assignment {
                    target: counter.clone(),
                    value: binary(BinaryOperatorKind::Add, counter, one, Type::Int),
                });
                self.emit(Stmt::Goto(top));
                self.emit(Stmt::Label(break_label));
            }
            ExprKind::Break(label) | ExprKind::Continue(label) => self.emit(Stmt::Goto(label)),
            ExprKind::Assignment { target, value } => self.assign(*target, *value),
            kind => {
                let value = self.value(Expr {
                    kind,
                    ty,
                    constant,
                    span,
                });
                self.emit(Stmt::Expression(value));
            }
        }
    }

    /// Store into a variable, field or array element.
    fn assign(&mut self, target: Expr, value: Expr) {
        let Expr {
            kind,
            ty,
            constant,
            span,
        } = target;

        let (kind, value) = match kind {
            ExprKind::Field { receiver, field } => {
                let (receiver, value) = self.flatten_pair(*receiver, value);
                (
                    ExprKind::Field {
                        receiver: Box::new(receiver),
                        field,
                    },
                    value,
                )
            }
            ExprKind::Index { array, index } => {
                match <[Expr; 3]>::try_from(self.flatten_list(vec![*array, *index, value])) {
                    Ok([array, index, value]) => (
                        ExprKind::Index {
                            array: Box::new(array),
                            index: Box::new(index),
                        },
                        value,
                    ),
                    Err(_) => return,
                }
            }
            kind => (kind, self.value(value)),
        };

        self.emit(Stmt::Assignment {
            target: Expr {
                kind,
                ty,
                constant,
                span,
            },
            value,
        });
    }

    /// Lower `if`; with a result temporary each branch stores its value there.
    fn conditional(
        &mut self,
        condition: Expr,
        then_branch: Expr,
        else_branch: Option<Expr>,
        result: Option<(TempId, &Type)>,
    ) {
        let condition = self.value(condition);
        let n = self.fresh();
        let end = BoundLabel::new(format!("end{}", n));

        match else_branch {
            Some(else_branch) => {
                let else_label = BoundLabel::new(format!("else{}", n));
                self.emit(Stmt::ConditionalGoto {
                    label: else_label.clone(),
                    condition,
                    jump_if_true: false,
                });
                self.arm(then_branch, result);
                self.emit(Stmt::Goto(end.clone()));
                self.emit(Stmt::Label(else_label));
                self.arm(else_branch, result);
            }
            None => {
                self.emit(Stmt::ConditionalGoto {
                    label: end.clone(),
                    condition,
                    jump_if_true: false,
                });
                self.arm(then_branch, result);
            }
        }
        self.emit(Stmt::Label(end));
    }

    fn arm(&mut self, expr: Expr, result: Option<(TempId, &Type)>) {
        match result {
            Some((temp, ty)) => {
                let span = expr.span;
                let value = self.value(expr);
                self.emit(Stmt::Assignment {
                    target: Expr::variable(Variable::Temp(temp), ty.clone(), span),
                    value,
                });
            }
            None => self.effect(expr),
        }
    }

    // ==========================================================================
    // Values
    // ==========================================================================

    /// Lower an expression whose value is needed, returning a flat expression
    /// computing it after all emitted statements have run.
    fn value(&mut self, expr: Expr) -> Expr {
        if let Some(constant) = &expr.constant
            && !matches!(expr.kind, ExprKind::Literal)
        {
            return Expr::literal(constant.clone(), expr.span);
        }

        let Expr {
            kind,
            ty,
            constant,
            span,
        } = expr;

        let kind = match kind {
            ExprKind::Block { statements, value } => {
                for stmt in statements {
                    self.statement(stmt);
                }
                return match value {
                    Some(value) => self.value(*value),
                    None => Expr::unit(span),
                };
            }
            ExprKind::If {
                condition,
                then_branch,
                else_branch: Some(else_branch),
            } if !ty.is_unit() && !ty.is_error() => {
                let temp = self.temp(ty.clone());
                self.conditional(*condition, *then_branch, Some(*else_branch), Some((temp, &ty)));
                return Expr::variable(Variable::Temp(temp), ty, span);
            }
            kind @ (ExprKind::If { .. }
            | ExprKind::While { .. }
            | ExprKind::For { .. }
            | ExprKind::Break(_)
            | ExprKind::Continue(_)
            | ExprKind::Assignment { .. }) => {
                let error = ty.is_error();
                self.effect(Expr {
                    kind,
                    ty,
                    constant,
                    span,
                });
                return if error { Expr::error(span) } else { Expr::unit(span) };
            }
            ExprKind::Binary {
                op: op @ (BinaryOperatorKind::LogicalAnd | BinaryOperatorKind::LogicalOr),
                left,
                right,
            } => return self.short_circuit(op, *left, *right, ty, span),
            ExprKind::Binary { op, left, right } => {
                let (left, right) = self.flatten_pair(*left, *right);
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op,
                operand: Box::new(self.value(*operand)),
            },
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                let has_receiver = receiver.is_some();
                let mut operands: Vec<Expr> = receiver.into_iter().map(|r| *r).collect();
                operands.extend(args);
                let mut operands = self.flatten_list(operands);
                let receiver = if has_receiver {
                    Some(Box::new(operands.remove(0)))
                } else {
                    None
                };
                ExprKind::Call {
                    receiver,
                    method,
                    args: operands,
                }
            }
            ExprKind::New { constructor, args } => ExprKind::New {
                constructor,
                args: self.flatten_list(args),
            },
            ExprKind::NewArray { size } => ExprKind::NewArray {
                size: Box::new(self.value(*size)),
            },
            ExprKind::Conversion { operand, explicit } => ExprKind::Conversion {
                operand: Box::new(self.value(*operand)),
                explicit,
            },
            ExprKind::Field { receiver, field } => ExprKind::Field {
                receiver: Box::new(self.value(*receiver)),
                field,
            },
            ExprKind::Index { array, index } => {
                let (array, index) = self.flatten_pair(*array, *index);
                ExprKind::Index {
                    array: Box::new(array),
                    index: Box::new(index),
                }
            }
            ExprKind::ArrayLength(array) => ExprKind::ArrayLength(Box::new(self.value(*array))),
            kind @ (ExprKind::Error
            | ExprKind::Literal
            | ExprKind::Variable(_)
            | ExprKind::This) => kind,
        };

        Expr {
            kind,
            ty,
            constant,
            span,
        }
    }

    /// `a && b` / `a || b` where `b` needs statements: only run them when the
    /// left operand does not decide the result.
    fn short_circuit(
        &mut self,
        op: BinaryOperatorKind,
        left: Expr,
        right: Expr,
        ty: Type,
        span: Span,
    ) -> Expr {
        let left = self.value(left);
        let outer = std::mem::take(&mut self.out);
        let right = self.value(right);
        let hoisted = std::mem::replace(&mut self.out, outer);

        if hoisted.is_empty() {
            return binary(op, left, right, ty);
        }

        let temp = self.temp(Type::Bool);
        let result = Expr::variable(Variable::Temp(temp), Type::Bool, span);
        let end = BoundLabel::new(format!("end{}", self.fresh()));
        self.emit(Stmt::VariableDeclaration {
            variable: Variable::Temp(temp),
            initializer: left,
        });
        self.emit(Stmt::ConditionalGoto {
            label: end.clone(),
            condition: result.clone(),
            jump_if_true: op == BinaryOperatorKind::LogicalOr,
        });
        self.out.extend(hoisted);
        self.emit(Stmt::Assignment {
            target: result.clone(),
            value: right,
        });
        self.emit(Stmt::Label(end));
        result
    }

    // ==========================================================================
    // Operand ordering
    // ==========================================================================

    /// Store an already-lowered operand in a temporary declared at `at`,
    /// unless reading it later gives the same result.
    fn spill_at(&mut self, at: usize, expr: Expr) -> Expr {
        if expr.is_stable() {
            return expr;
        }
        let span = expr.span;
        let ty = expr.ty.clone();
        let temp = self.temp(ty.clone());
        self.out.insert(
            at,
            Stmt::VariableDeclaration {
                variable: Variable::Temp(temp),
                initializer: expr,
            },
        );
        Expr::variable(Variable::Temp(temp), ty, span)
    }

    fn flatten_pair(&mut self, first: Expr, second: Expr) -> (Expr, Expr) {
        let first = self.value(first);
        let mark = self.out.len();
        let second = self.value(second);
        let first = if self.out.len() > mark {
            self.spill_at(mark, first)
        } else {
            first
        };
        (first, second)
    }

    fn flatten_list(&mut self, exprs: Vec<Expr>) -> Vec<Expr> {
        let mut done: Vec<Expr> = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let mark = self.out.len();
            let value = self.value(expr);
            if self.out.len() > mark {
                let mut at = mark;
                for previous in done.iter_mut() {
                    if previous.is_stable() {
                        continue;
                    }
                    let operand = std::mem::replace(previous, Expr::error(Span::default()));
                    *previous = self.spill_at(at, operand);
                    at += 1;
                }
            }
            done.push(value);
        }
        done
    }
}

fn binary(op: BinaryOperatorKind, left: Expr, right: Expr, ty: Type) -> Expr {
    let span = left.span;
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        ty,
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::Printer;
    use ember_core::{SymbolFlags, SymbolId, SymbolKind, SymbolTable};

    struct Fixture {
        table: SymbolTable,
        c: SymbolId,
        x: SymbolId,
        y: SymbolId,
        i: SymbolId,
    }

    fn fixture() -> Fixture {
        let mut table = SymbolTable::new();
        let root = table.root();
        let mut local = |name: &str, ty: Type| {
            let id = table.create(root, SymbolKind::Local, name, SymbolFlags::empty(), None);
            table.set_type(id, ty).unwrap();
            id
        };
        let c = local("c", Type::Bool);
        let x = local("x", Type::Int);
        let y = local("y", Type::Int);
        let i = local("i", Type::Int);
        Fixture { table, c, x, y, i }
    }

    fn var(id: SymbolId, ty: Type) -> Expr {
        Expr::variable(Variable::Symbol(id), ty, Span::default())
    }

    fn int(value: i32) -> Expr {
        Expr::literal(ConstantValue::Int(value), Span::default())
    }

    fn assign(target: Expr, value: Expr) -> Expr {
        Expr::new(
            ExprKind::Assignment {
                target: Box::new(target),
                value: Box::new(value),
            },
            Type::Unit,
            Span::default(),
        )
    }

    fn block(statements: Vec<Stmt>, value: Option<Expr>) -> Expr {
        let ty = value.as_ref().map(|v| v.ty.clone()).unwrap_or(Type::Unit);
        Expr::new(
            ExprKind::Block {
                statements,
                value: value.map(Box::new),
            },
            ty,
            Span::default(),
        )
    }

    fn if_expr(condition: Expr, then_branch: Expr, else_branch: Option<Expr>, ty: Type) -> Expr {
        Expr::new(
            ExprKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            },
            ty,
            Span::default(),
        )
    }

    fn lower_and_print(f: &Fixture, body: Body) -> (Body, String) {
        let lowered = ControlFlowLowering.run(&body);
        assert!(lowered.is_lowered());
        assert_eq!(ControlFlowLowering.run(&lowered), lowered, "lowering is not idempotent");
        let text = Printer::new(&f.table).body(&lowered);
        (lowered, text)
    }

    #[test]
    fn if_else_for_effect() {
        let f = fixture();
        let body = Body::new(vec![Stmt::Expression(if_expr(
            var(f.c, Type::Bool),
            assign(var(f.x, Type::Int), int(1)),
            Some(assign(var(f.x, Type::Int), int(2))),
            Type::Unit,
        ))]);
        let (lowered, text) = lower_and_print(&f, body);
        assert_eq!(
            text,
            "goto else0 unless c\nx = 1\ngoto end0\nelse0:\nx = 2\nend0:\n"
        );
        assert!(lowered.temps.is_empty());
    }

    #[test]
    fn if_without_else() {
        let f = fixture();
        let body = Body::new(vec![Stmt::Expression(if_expr(
            var(f.c, Type::Bool),
            assign(var(f.x, Type::Int), int(1)),
            None,
            Type::Unit,
        ))]);
        let (_, text) = lower_and_print(&f, body);
        assert_eq!(text, "goto end0 unless c\nx = 1\nend0:\n");
    }

    #[test]
    fn if_as_value_uses_temporary() {
        let f = fixture();
        let body = Body::new(vec![Stmt::VariableDeclaration {
            variable: Variable::Symbol(f.y),
            initializer: if_expr(var(f.c, Type::Bool), int(1), Some(int(2)), Type::Int),
        }]);
        let (lowered, text) = lower_and_print(&f, body);
        assert_eq!(
            text,
            "goto else0 unless c\n$t0 = 1\ngoto end0\nelse0:\n$t0 = 2\nend0:\nval y = $t0\n"
        );
        assert_eq!(lowered.temps, vec![Type::Int]);
    }

    #[test]
    fn while_loop() {
        let f = fixture();
        let increment = assign(
            var(f.x, Type::Int),
            binary(BinaryOperatorKind::Add, var(f.x, Type::Int), int(1), Type::Int),
        );
        let body = Body::new(vec![Stmt::Expression(Expr::new(
            ExprKind::While {
                condition: Box::new(var(f.c, Type::Bool)),
                body: Box::new(block(vec![Stmt::Expression(increment)], None)),
                break_label: BoundLabel::new("break0"),
                continue_label: BoundLabel::new("continue0"),
            },
            Type::Unit,
            Span::default(),
        ))]);
        let (_, text) = lower_and_print(&f, body);
        assert_eq!(
            text,
            "continue0:\ngoto break0 unless c\nx = (x + 1)\ngoto continue0\nbreak0:\n"
        );
    }

    fn for_loop(f: &Fixture, upper: Expr, body: Expr) -> Body {
        Body::new(vec![Stmt::Expression(Expr::new(
            ExprKind::For {
                variable: f.i,
                lower: Box::new(int(1)),
                upper: Box::new(upper),
                body: Box::new(body),
                break_label: BoundLabel::new("break0"),
                continue_label: BoundLabel::new("continue0"),
            },
            Type::Unit,
            Span::default(),
        ))])
    }

    #[test]
    fn for_loop_with_constant_bound() {
        let f = fixture();
        let (lowered, text) = lower_and_print(&f, for_loop(&f, int(3), block(Vec::new(), None)));
        assert_eq!(
            text,
            "val i = 1\nloop0:\ngoto break0 unless (i <= 3)\n\
             continue0:\ni = (i + 1)\ngoto loop0\nbreak0:\n"
        );
        assert!(lowered.temps.is_empty());
    }

    #[test]
    fn for_loop_evaluates_bound_once() {
        let f = fixture();
        let (lowered, text) =
            lower_and_print(&f, for_loop(&f, var(f.y, Type::Int), block(Vec::new(), None)));
        assert!(text.starts_with(
            "val i = 1\nval $t0 = y\nloop0:\ngoto break0 unless (i <= $t0)\n"
        ));
        assert_eq!(lowered.temps, vec![Type::Int]);
    }

    #[test]
    fn break_and_continue_become_gotos() {
        let f = fixture();
        let body = block(
            vec![Stmt::Expression(Expr::new(
                ExprKind::Continue(BoundLabel::new("continue0")),
                Type::Unit,
                Span::default(),
            ))],
            Some(Expr::new(
                ExprKind::Break(BoundLabel::new("break0")),
                Type::Unit,
                Span::default(),
            )),
        );
        let (_, text) = lower_and_print(&f, for_loop(&f, int(2), body));
        assert!(
            text.contains("goto break0 unless (i <= 2)\ngoto continue0\ngoto break0\ncontinue0:\n")
        );
    }

    #[test]
    fn earlier_operand_is_spilled_before_hoisted_statements() {
        let f = fixture();
        // y = x + { x = 5; x }
        let right = block(
            vec![Stmt::Expression(assign(var(f.x, Type::Int), int(5)))],
            Some(var(f.x, Type::Int)),
        );
        let body = Body::new(vec![Stmt::VariableDeclaration {
            variable: Variable::Symbol(f.y),
            initializer: binary(BinaryOperatorKind::Add, var(f.x, Type::Int), right, Type::Int),
        }]);
        let (lowered, text) = lower_and_print(&f, body);
        assert_eq!(text, "val $t0 = x\nx = 5\nval y = ($t0 + x)\n");
        assert_eq!(lowered.temps, vec![Type::Int]);
    }

    #[test]
    fn stable_operands_are_not_spilled() {
        let f = fixture();
        let right = block(
            vec![Stmt::Expression(assign(var(f.x, Type::Int), int(5)))],
            Some(var(f.x, Type::Int)),
        );
        let body = Body::new(vec![Stmt::VariableDeclaration {
            variable: Variable::Symbol(f.y),
            initializer: binary(BinaryOperatorKind::Add, int(1), right, Type::Int),
        }]);
        let (lowered, text) = lower_and_print(&f, body);
        assert_eq!(text, "x = 5\nval y = (1 + x)\n");
        assert!(lowered.temps.is_empty());
    }

    #[test]
    fn short_circuit_guards_hoisted_statements() {
        let f = fixture();
        let right = block(
            vec![Stmt::Expression(assign(var(f.x, Type::Int), int(1)))],
            Some(var(f.c, Type::Bool)),
        );
        let body = Body::new(vec![Stmt::Expression(binary(
            BinaryOperatorKind::LogicalAnd,
            var(f.c, Type::Bool),
            right,
            Type::Bool,
        ))]);
        let (lowered, text) = lower_and_print(&f, body);
        assert_eq!(
            text,
            "val $t0 = c\ngoto end0 unless $t0\nx = 1\n$t0 = c\nend0:\n$t0\n"
        );
        assert_eq!(lowered.temps, vec![Type::Bool]);
    }

    #[test]
    fn plain_short_circuit_is_kept() {
        let f = fixture();
        let body = Body::new(vec![Stmt::Expression(binary(
            BinaryOperatorKind::LogicalOr,
            var(f.c, Type::Bool),
            var(f.c, Type::Bool),
            Type::Bool,
        ))]);
        let (_, text) = lower_and_print(&f, body);
        assert_eq!(text, "(c || c)\n");
    }

    #[test]
    fn folded_constants_become_literals() {
        let f = fixture();
        let folded = binary(BinaryOperatorKind::Add, int(1), int(2), Type::Int)
            .with_constant(Some(ConstantValue::Int(3)));
        let body = Body::new(vec![Stmt::Expression(folded)]);
        let (_, text) = lower_and_print(&f, body);
        assert_eq!(text, "3\n");
    }
}
