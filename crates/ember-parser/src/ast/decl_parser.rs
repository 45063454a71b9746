//! Declaration, statement and type parsing.

use bumpalo::collections::Vec as BumpVec;
use ember_core::{ParseError, ParseErrorKind};

use super::parser::Parser;
use crate::ast::{
    ClassDecl, ClassParam, FunctionDecl, Ident, Item, Member, NamespaceDecl, ObjectDecl, Param,
    QualifiedName, Stmt, TypeExpr, UsingDecl, VarDecl,
};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse a whole file: an optional namespace heading, then items.
    pub(super) fn parse_file(&mut self) -> (Option<NamespaceDecl<'ast>>, &'ast [Item<'ast>]) {
        let mut namespace = None;
        let mut items = BumpVec::new_in(self.arena);

        loop {
            while self.eat(TokenKind::Semicolon).is_some() {}
            if self.is_eof() {
                break;
            }

            let start = self.position;
            if self.check(TokenKind::Namespace) {
                match self.parse_namespace() {
                    Ok(decl) if namespace.is_none() && items.is_empty() => namespace = Some(decl),
                    Ok(decl) => self.error(ParseError::new(
                        ParseErrorKind::MisplacedNamespace,
                        decl.span,
                        "a namespace heading must come first in the file",
                    )),
                    Err(error) => {
                        self.error(error);
                        self.synchronize(start);
                    }
                }
                continue;
            }

            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(error) => {
                    self.error(error);
                    self.synchronize(start);
                }
            }
        }

        (namespace, items.into_bump_slice())
    }

    fn parse_namespace(&mut self) -> Result<NamespaceDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Namespace)?.span;
        let name = self.parse_qualified_name()?;
        self.expect_statement_end()?;
        Ok(NamespaceDecl {
            name,
            span: start.merge(name.span),
        })
    }

    /// Parse one top-level item.
    fn parse_item(&mut self) -> Result<Item<'ast>, ParseError> {
        match self.peek().kind {
            TokenKind::Using => {
                let start = self.advance().span;
                let name = self.parse_qualified_name()?;
                self.expect_statement_end()?;
                Ok(Item::Using(UsingDecl {
                    name,
                    span: start.merge(name.span),
                }))
            }
            TokenKind::Class => Ok(Item::Class(self.parse_class()?)),
            TokenKind::Object => Ok(Item::Object(self.parse_object()?)),
            TokenKind::Def => {
                let function = self.parse_function()?;
                self.expect_statement_end()?;
                Ok(Item::Function(function))
            }
            _ => {
                let stmt = self.parse_statement()?;
                self.expect_statement_end()?;
                Ok(Item::Statement(stmt))
            }
        }
    }

    /// Parse `class Name(params) { members }`; both parts are optional.
    fn parse_class(&mut self) -> Result<&'ast ClassDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Class)?.span;
        let name = self.parse_ident()?;

        let params = if self.eat(TokenKind::LeftParen).is_some() {
            self.nested(|p| {
                let mut params = BumpVec::new_in(p.arena);
                if !p.check(TokenKind::RightParen) {
                    loop {
                        params.push(p.parse_class_param()?);
                        if p.eat(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                }
                p.expect(TokenKind::RightParen)?;
                Ok(params.into_bump_slice())
            })?
        } else {
            &[]
        };

        let members = if self.check(TokenKind::LeftBrace) {
            self.parse_members()?
        } else {
            &[]
        };

        Ok(self.arena.alloc(ClassDecl {
            name,
            params,
            members,
            span: start.merge(name.span),
        }))
    }

    fn parse_class_param(&mut self) -> Result<ClassParam<'ast>, ParseError> {
        let start = self.peek().span;
        let mutable = if self.eat(TokenKind::Var).is_some() {
            true
        } else {
            self.eat(TokenKind::Val);
            false
        };
        let name = self.parse_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Ok(ClassParam {
            mutable,
            name,
            ty,
            span: start.merge(ty.span()),
        })
    }

    /// Parse `object Name { members }`.
    fn parse_object(&mut self) -> Result<&'ast ObjectDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Object)?.span;
        let name = self.parse_ident()?;
        let members = self.parse_members()?;
        Ok(self.arena.alloc(ObjectDecl {
            name,
            members,
            span: start.merge(name.span),
        }))
    }

    /// Parse a brace-delimited class or object body.
    fn parse_members(&mut self) -> Result<&'ast [Member<'ast>], ParseError> {
        self.expect(TokenKind::LeftBrace)?;
        let members = self.in_block(|p| {
            let mut members = BumpVec::new_in(p.arena);
            loop {
                while p.eat(TokenKind::Semicolon).is_some() {}
                if p.check(TokenKind::RightBrace) || p.is_eof() {
                    break;
                }
                let start = p.position;
                match p.parse_member().and_then(|member| {
                    p.expect_statement_end()?;
                    Ok(member)
                }) {
                    Ok(member) => members.push(member),
                    Err(error) => {
                        p.error(error);
                        p.synchronize(start);
                    }
                }
            }
            members.into_bump_slice()
        });
        self.expect(TokenKind::RightBrace)?;
        Ok(members)
    }

    fn parse_member(&mut self) -> Result<Member<'ast>, ParseError> {
        match self.peek().kind {
            TokenKind::Def => Ok(Member::Function(self.parse_function()?)),
            TokenKind::Val | TokenKind::Var => Ok(Member::Field(self.parse_var_decl()?)),
            TokenKind::Class | TokenKind::Object | TokenKind::Using | TokenKind::Namespace => {
                let token = *self.peek();
                Err(ParseError::new(
                    ParseErrorKind::ExpectedMember,
                    token.span,
                    format!("{} is not allowed inside a class or object body", token.kind),
                ))
            }
            _ => Ok(Member::Statement(self.parse_expr(0)?)),
        }
    }

    /// Parse `def name(params)[: T] = expr` or `def name(params)[: T] { ... }`.
    fn parse_function(&mut self) -> Result<&'ast FunctionDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Def)?.span;
        let name = self.parse_ident()?;

        self.expect(TokenKind::LeftParen)?;
        let params = self.nested(|p| {
            let mut params = BumpVec::new_in(p.arena);
            if !p.check(TokenKind::RightParen) {
                loop {
                    let name = p.parse_ident()?;
                    p.expect(TokenKind::Colon)?;
                    let ty = p.parse_type()?;
                    params.push(Param {
                        name,
                        ty,
                        span: name.span.merge(ty.span()),
                    });
                    if p.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
            }
            p.expect(TokenKind::RightParen)?;
            Ok(params.into_bump_slice())
        })?;

        let return_type = if self.eat(TokenKind::Colon).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = if self.eat(TokenKind::Equal).is_some() {
            self.parse_expr(0)?
        } else if self.check(TokenKind::LeftBrace) {
            self.parse_block()?
        } else {
            let token = *self.peek();
            return Err(ParseError::new(
                ParseErrorKind::ExpectedToken,
                token.span,
                format!("expected '=' or '{{' before function body, found {}", token.kind),
            ));
        };

        Ok(self.arena.alloc(FunctionDecl {
            name,
            params,
            return_type,
            body,
            span: start.merge(name.span),
        }))
    }

    /// Parse a statement: a variable declaration or an expression.
    pub(super) fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        if matches!(self.peek().kind, TokenKind::Val | TokenKind::Var) {
            return Ok(Stmt::Var(self.parse_var_decl()?));
        }
        Ok(Stmt::Expr(self.parse_expr(0)?))
    }

    /// Parse `val name[: T] = init` or `var name[: T] = init`.
    fn parse_var_decl(&mut self) -> Result<&'ast VarDecl<'ast>, ParseError> {
        let keyword = self.advance();
        let mutable = keyword.kind == TokenKind::Var;
        let name = self.parse_ident()?;
        let ty = if self.eat(TokenKind::Colon).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(TokenKind::Equal)?;
        let init = self.parse_expr(0)?;
        Ok(self.arena.alloc(VarDecl {
            mutable,
            name,
            ty,
            init,
            span: keyword.span.merge(name.span),
        }))
    }

    /// Parse a type: `int`, `A.B.Point` or `Array[T]`.
    pub(super) fn parse_type(&mut self) -> Result<TypeExpr<'ast>, ParseError> {
        if !self.check(TokenKind::Identifier) {
            let token = *self.peek();
            return Err(ParseError::new(
                ParseErrorKind::ExpectedType,
                token.span,
                format!("expected type, found {}", token.kind),
            ));
        }

        if self.check_contextual("Array") && self.peek_nth(1).kind == TokenKind::LeftBracket {
            let start = self.advance().span;
            self.advance();
            let element = self.nested(|p| p.parse_type())?;
            let close = self.expect(TokenKind::RightBracket)?;
            return Ok(TypeExpr::Array {
                element: self.arena.alloc(element),
                span: start.merge(close.span),
            });
        }

        Ok(TypeExpr::Named(self.parse_qualified_name()?))
    }

    /// Parse a dotted name `A.B.C`.
    pub(super) fn parse_qualified_name(&mut self) -> Result<QualifiedName<'ast>, ParseError> {
        let mut segments = BumpVec::new_in(self.arena);
        let first = self.parse_ident()?;
        segments.push(first);
        while self.check(TokenKind::Dot) && self.peek_nth(1).kind == TokenKind::Identifier {
            self.advance();
            segments.push(self.parse_ident()?);
        }
        let span = first.span.merge(self.previous_span());
        Ok(QualifiedName {
            segments: segments.into_bump_slice(),
            span,
        })
    }

    /// Parse a single identifier.
    pub(super) fn parse_ident(&mut self) -> Result<Ident<'ast>, ParseError> {
        let token = *self.peek();
        if token.kind != TokenKind::Identifier {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedIdentifier,
                token.span,
                format!("expected identifier, found {}", token.kind),
            ));
        }
        self.advance();
        Ok(Ident::new(token.lexeme, token.span))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Expr, Item, Member, Stmt, TypeExpr};
    use crate::Parser;
    use bumpalo::Bump;
    use ember_core::{FileId, ParseErrorKind};

    #[test]
    fn parse_function_with_expression_body() {
        let arena = Bump::new();
        let tree = Parser::parse("def add(a: int, b: int): int = a + b", FileId::new(0), &arena);
        assert!(tree.diagnostics().is_empty(), "{:?}", tree.diagnostics());
        let Item::Function(f) = &tree.items()[0] else {
            panic!("expected function");
        };
        assert_eq!(f.name.name, "add");
        assert_eq!(f.params.len(), 2);
        assert!(f.return_type.is_some());
        assert!(matches!(f.body, Expr::Binary(_)));
    }

    #[test]
    fn parse_function_with_block_body() {
        let arena = Bump::new();
        let tree = Parser::parse(
            "def main() {\n  println(1)\n  println(2)\n}",
            FileId::new(0),
            &arena,
        );
        assert!(tree.diagnostics().is_empty());
        let Item::Function(f) = &tree.items()[0] else {
            panic!("expected function");
        };
        assert!(f.return_type.is_none());
        let Expr::Block(block) = f.body else {
            panic!("expected block");
        };
        assert_eq!(block.stmts.len(), 2);
    }

    #[test]
    fn parse_class_with_params_and_members() {
        let arena = Bump::new();
        let source = r#"
class Point(x: int, var y: int) {
    val sum = x + y
    def move(dx: int) = y = y + dx
    println(sum)
}
"#;
        let tree = Parser::parse(source, FileId::new(0), &arena);
        assert!(tree.diagnostics().is_empty(), "{:?}", tree.diagnostics());
        let Item::Class(class) = &tree.items()[0] else {
            panic!("expected class");
        };
        assert_eq!(class.params.len(), 2);
        assert!(!class.params[0].mutable);
        assert!(class.params[1].mutable);
        assert!(matches!(class.members[0], Member::Field(_)));
        assert!(matches!(class.members[1], Member::Function(_)));
        assert!(matches!(class.members[2], Member::Statement(_)));
    }

    #[test]
    fn parse_object() {
        let arena = Bump::new();
        let tree = Parser::parse("object Counter { var count = 0 }", FileId::new(0), &arena);
        assert!(tree.diagnostics().is_empty());
        assert!(matches!(tree.items()[0], Item::Object(_)));
    }

    #[test]
    fn parse_namespace_and_usings() {
        let arena = Bump::new();
        let tree = Parser::parse(
            "namespace Game.Core\nusing System.Math\nval x = 1",
            FileId::new(0),
            &arena,
        );
        assert!(tree.diagnostics().is_empty());
        let namespace = tree.namespace().unwrap();
        assert_eq!(namespace.name.to_string(), "Game.Core");
        let Item::Using(using) = &tree.items()[0] else {
            panic!("expected using");
        };
        assert_eq!(using.name.names(), vec!["System", "Math"]);
    }

    #[test]
    fn misplaced_namespace_is_reported() {
        let arena = Bump::new();
        let tree = Parser::parse("val x = 1\nnamespace A", FileId::new(0), &arena);
        assert_eq!(tree.diagnostics().len(), 1);
        assert_eq!(
            tree.diagnostics()[0].message(),
            "a namespace heading must come first in the file"
        );
    }

    #[test]
    fn parse_types() {
        let arena = Bump::new();
        let tree = Parser::parse(
            "val xs: Array[Array[int]] = null\nval p: A.Point = null",
            FileId::new(0),
            &arena,
        );
        assert!(tree.diagnostics().is_empty());
        let Item::Statement(Stmt::Var(decl)) = &tree.items()[0] else {
            panic!("expected declaration");
        };
        assert!(matches!(decl.ty, Some(TypeExpr::Array { .. })));
        assert_eq!(decl.ty.unwrap().to_string(), "Array[Array[int]]");
    }

    #[test]
    fn statements_separated_by_newlines_and_semicolons() {
        let arena = Bump::new();
        let tree = Parser::parse("var a = 1; a = 2\na = 3", FileId::new(0), &arena);
        assert!(tree.diagnostics().is_empty());
        assert_eq!(tree.items().len(), 3);
    }

    #[test]
    fn two_statements_on_one_line_is_an_error() {
        let arena = Bump::new();
        let tree = Parser::parse("val a = 1 val b = 2", FileId::new(0), &arena);
        assert_eq!(tree.diagnostics().len(), 1);
    }

    #[test]
    fn recovery_keeps_later_items() {
        let arena = Bump::new();
        let tree = Parser::parse("val x = \ndef f() = 1\nval y = 2", FileId::new(0), &arena);
        assert_eq!(tree.diagnostics().len(), 1);
        assert!(tree.items().iter().any(|i| matches!(i, Item::Function(_))));
    }

    #[test]
    fn recovery_inside_block() {
        let arena = Bump::new();
        let tree = Parser::parse("def f() {\n  val = 1\n  println(2)\n}", FileId::new(0), &arena);
        assert_eq!(tree.diagnostics().len(), 1);
        let Item::Function(f) = &tree.items()[0] else {
            panic!("expected function");
        };
        let Expr::Block(block) = f.body else {
            panic!("expected block");
        };
        assert_eq!(block.stmts.len(), 1);
    }

    #[test]
    fn nested_class_is_rejected() {
        let arena = Bump::new();
        let tree = Parser::parse("object A {\n  class B\n}", FileId::new(0), &arena);
        let error = tree.diagnostics()[0].error.clone();
        assert!(matches!(
            error,
            ember_core::DiagnosticError::Parse(ref e) if e.kind == ParseErrorKind::ExpectedMember
        ));
    }
}
