//! Expression parsing using Pratt parsing (precedence climbing).
//!
//! This module implements expression parsing with proper operator precedence
//! and associativity using the Pratt parsing algorithm. An infix or postfix
//! token that starts a new line ends the expression instead of continuing it.

use bumpalo::collections::Vec as BumpVec;
use ember_core::{ParseError, ParseErrorKind};

use super::parser::Parser;
use crate::ast::expr::*;
use crate::ast::{
    ASSIGN_BINDING_POWER, BinaryOp, Ident, POSTFIX_BINDING_POWER, TypeExpr, UnaryOp,
};
use crate::lexer::{TokenKind, unescape};

impl<'ast> Parser<'ast> {
    /// Parse an expression with a minimum binding power.
    ///
    /// This is the core of the Pratt parser. It handles operator precedence
    /// by only consuming operators with sufficient binding power.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            if self.at_line_break() {
                break;
            }

            let kind = self.peek().kind;

            // Postfix forms: member access, call, index
            if matches!(
                kind,
                TokenKind::Dot | TokenKind::LeftParen | TokenKind::LeftBracket
            ) {
                if POSTFIX_BINDING_POWER < min_bp {
                    break;
                }
                lhs = match kind {
                    TokenKind::Dot => self.parse_member_access(lhs)?,
                    TokenKind::LeftParen => self.parse_call(lhs)?,
                    _ => self.parse_index(lhs)?,
                };
                continue;
            }

            // Assignment
            if kind == TokenKind::Equal {
                let (l_bp, r_bp) = ASSIGN_BINDING_POWER;
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let value = self.parse_expr(r_bp)?;
                let span = lhs.span().merge(value.span());
                lhs = self.arena.alloc(Expr::Assign(self.arena.alloc(AssignExpr {
                    target: lhs,
                    value,
                    span,
                })));
                continue;
            }

            // Binary operators
            if let Some(op) = BinaryOp::from_token(kind) {
                let (l_bp, r_bp) = op.binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let right = self.parse_expr(r_bp)?;
                let span = lhs.span().merge(right.span());
                lhs = self.arena.alloc(Expr::Binary(self.arena.alloc(BinaryExpr {
                    left: lhs,
                    op,
                    right,
                    span,
                })));
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    /// Parse a prefix expression (the start of an expression).
    fn parse_prefix(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value = parse_int_literal(token.lexeme).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("integer literal '{}' is out of range", token.lexeme),
                    )
                })?;
                Ok(self.literal(LiteralKind::Int(value), token.span))
            }

            TokenKind::StringLiteral => {
                self.advance();
                let body = &token.lexeme[1..token.lexeme.len() - 1];
                let value = self.arena.alloc_str(&unescape(body));
                Ok(self.literal(LiteralKind::String(value), token.span))
            }

            TokenKind::CharLiteral => {
                self.advance();
                let body = &token.lexeme[1..token.lexeme.len() - 1];
                let value = unescape(body).chars().next().ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        "empty character literal",
                    )
                })?;
                Ok(self.literal(LiteralKind::Char(value), token.span))
            }

            TokenKind::True => {
                self.advance();
                Ok(self.literal(LiteralKind::Bool(true), token.span))
            }

            TokenKind::False => {
                self.advance();
                Ok(self.literal(LiteralKind::Bool(false), token.span))
            }

            TokenKind::Null => {
                self.advance();
                Ok(self.literal(LiteralKind::Null, token.span))
            }

            TokenKind::Identifier => {
                self.advance();
                Ok(self
                    .arena
                    .alloc(Expr::Ident(Ident::new(token.lexeme, token.span))))
            }

            TokenKind::This => {
                self.advance();
                Ok(self.arena.alloc(Expr::This(token.span)))
            }

            TokenKind::Break => {
                self.advance();
                Ok(self.arena.alloc(Expr::Break(token.span)))
            }

            TokenKind::Continue => {
                self.advance();
                Ok(self.arena.alloc(Expr::Continue(token.span)))
            }

            // Unit literal or parenthesized expression
            TokenKind::LeftParen => {
                self.advance();
                if let Some(close) = self.eat(TokenKind::RightParen) {
                    return Ok(self.literal(LiteralKind::Unit, token.span.merge(close.span)));
                }
                let expr = self.nested(|p| p.parse_expr(0))?;
                let close = self.nested(|p| p.expect(TokenKind::RightParen))?;
                Ok(self.arena.alloc(Expr::Paren(self.arena.alloc(ParenExpr {
                    expr,
                    span: token.span.merge(close.span),
                }))))
            }

            TokenKind::LeftBrace => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::New => self.parse_new(),

            _ => {
                if let Some(op) = UnaryOp::from_token(token.kind) {
                    self.advance();
                    let operand = self.parse_expr(UnaryOp::binding_power())?;
                    let span = token.span.merge(operand.span());
                    return Ok(self.arena.alloc(Expr::Unary(self.arena.alloc(UnaryExpr {
                        op,
                        operand,
                        span,
                    }))));
                }

                Err(ParseError::new(
                    ParseErrorKind::ExpectedExpression,
                    token.span,
                    format!("expected expression, found {}", token.kind),
                ))
            }
        }
    }

    fn literal(&self, kind: LiteralKind<'ast>, span: ember_core::Span) -> &'ast Expr<'ast> {
        self.arena.alloc(Expr::Literal(LiteralExpr { kind, span }))
    }

    /// Parse member access (dot operator).
    fn parse_member_access(
        &mut self,
        object: &'ast Expr<'ast>,
    ) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::Dot)?;
        let member = self.parse_ident()?;
        let span = object.span().merge(member.span);
        Ok(self.arena.alloc(Expr::Member(self.arena.alloc(MemberExpr {
            object,
            member,
            span,
        }))))
    }

    /// Parse function call.
    fn parse_call(&mut self, callee: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        let args = self.parse_arguments()?;
        let span = callee.span().merge(self.previous_span());
        Ok(self.arena.alloc(Expr::Call(self.arena.alloc(CallExpr {
            callee,
            args,
            span,
        }))))
    }

    /// Parse array indexing.
    fn parse_index(&mut self, object: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftBracket)?;
        let index = self.nested(|p| p.parse_expr(0))?;
        let close = self.nested(|p| p.expect(TokenKind::RightBracket))?;
        let span = object.span().merge(close.span);
        Ok(self.arena.alloc(Expr::Index(self.arena.alloc(IndexExpr {
            object,
            index,
            span,
        }))))
    }

    /// Parse a parenthesized, comma-separated argument list.
    pub(super) fn parse_arguments(
        &mut self,
    ) -> Result<&'ast [&'ast Expr<'ast>], ParseError> {
        self.expect(TokenKind::LeftParen)?;
        self.nested(|p| {
            let mut args = BumpVec::new_in(p.arena);
            if !p.check(TokenKind::RightParen) {
                loop {
                    args.push(p.parse_expr(0)?);
                    if p.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
            }
            p.expect(TokenKind::RightParen)?;
            Ok(args.into_bump_slice())
        })
    }

    /// Parse a block expression `{ stmt* }`.
    ///
    /// Errors inside the block are recorded and recovered from, so one bad
    /// statement does not discard its siblings.
    pub(super) fn parse_block(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let stmts = self.in_block(|p| {
            let mut stmts = BumpVec::new_in(p.arena);
            loop {
                while p.eat(TokenKind::Semicolon).is_some() {}
                if p.check(TokenKind::RightBrace) || p.is_eof() {
                    break;
                }
                let start = p.position;
                match p.parse_statement().and_then(|stmt| {
                    p.expect_statement_end()?;
                    Ok(stmt)
                }) {
                    Ok(stmt) => stmts.push(stmt),
                    Err(error) => {
                        p.error(error);
                        p.synchronize(start);
                    }
                }
            }
            stmts.into_bump_slice()
        });
        let close = self.expect(TokenKind::RightBrace)?;
        Ok(self.arena.alloc(Expr::Block(self.arena.alloc(BlockExpr {
            stmts,
            span: open.span.merge(close.span),
        }))))
    }

    /// Parse a parenthesized condition.
    fn parse_condition(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftParen)?;
        self.nested(|p| {
            let condition = p.parse_expr(0)?;
            p.expect(TokenKind::RightParen)?;
            Ok(condition)
        })
    }

    /// Parse `if (c) then [else otherwise]`. `else` may start a new line.
    fn parse_if(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start = self.expect(TokenKind::If)?.span;
        let condition = self.parse_condition()?;
        let then_branch = self.parse_expr(0)?;

        // Look past statement separators for a dangling `else`.
        let mut offset = 0;
        while self.peek_nth(offset).kind == TokenKind::Semicolon {
            offset += 1;
        }
        let else_branch = if self.peek_nth(offset).kind == TokenKind::Else {
            for _ in 0..=offset {
                self.advance();
            }
            Some(self.parse_expr(0)?)
        } else {
            None
        };

        let end = else_branch.map_or(then_branch.span(), |e| e.span());
        Ok(self.arena.alloc(Expr::If(self.arena.alloc(IfExpr {
            condition,
            then_branch,
            else_branch,
            span: start.merge(end),
        }))))
    }

    /// Parse `while (c) body`.
    fn parse_while(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start = self.expect(TokenKind::While)?.span;
        let condition = self.parse_condition()?;
        let body = self.parse_expr(0)?;
        Ok(self.arena.alloc(Expr::While(self.arena.alloc(WhileExpr {
            condition,
            body,
            span: start.merge(body.span()),
        }))))
    }

    /// Parse `for (i <- lo to hi) body`.
    fn parse_for(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start = self.expect(TokenKind::For)?.span;
        self.expect(TokenKind::LeftParen)?;
        let (variable, lower, upper) = self.nested(|p| {
            let variable = p.parse_ident()?;
            p.expect(TokenKind::LeftArrow)?;
            let lower = p.parse_expr(0)?;
            if !p.check_contextual("to") {
                let token = *p.peek();
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedToken,
                    token.span,
                    format!("expected 'to', found {}", token.kind),
                ));
            }
            p.advance();
            let upper = p.parse_expr(0)?;
            p.expect(TokenKind::RightParen)?;
            Ok((variable, lower, upper))
        })?;
        let body = self.parse_expr(0)?;
        Ok(self.arena.alloc(Expr::For(self.arena.alloc(ForExpr {
            variable,
            lower,
            upper,
            body,
            span: start.merge(body.span()),
        }))))
    }

    /// Parse `new T(args)` or `new Array[T](size)`.
    fn parse_new(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start = self.expect(TokenKind::New)?.span;
        let ty = self.parse_type()?;

        if let TypeExpr::Array { element, .. } = ty {
            self.expect(TokenKind::LeftParen)?;
            let size = self.nested(|p| {
                let size = p.parse_expr(0)?;
                p.expect(TokenKind::RightParen)?;
                Ok(size)
            })?;
            return Ok(self.arena.alloc(Expr::NewArray(self.arena.alloc(NewArrayExpr {
                element: *element,
                size,
                span: start.merge(self.previous_span()),
            }))));
        }

        let args = self.parse_arguments()?;
        Ok(self.arena.alloc(Expr::New(self.arena.alloc(NewExpr {
            ty,
            args,
            span: start.merge(self.previous_span()),
        }))))
    }
}

/// Parse a decimal or `0x` hexadecimal literal into an `i32`.
fn parse_int_literal(lexeme: &str) -> Option<i32> {
    let digits: String = lexeme.chars().filter(|&c| c != '_').collect();
    let value = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    i32::try_from(value).ok()
}
