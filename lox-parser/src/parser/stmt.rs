use super::*;
use crate::ast::{FnDeclaration, LiteralValue};
use std::rc::Rc;

/// Maximum number of parameters in a function declaration.
pub const MAX_PARAMS: usize = 255;

impl<'a> Parser<'a> {
    /// Parses a declaration (or statement).
    /// Errors are recovered from here: the parser synchronizes and yields [`Stmt::NoOp`].
    pub fn parse_declaration(&mut self) -> Stmt {
        let stmt = if self.eat(&[TokenKind::Fun]) {
            self.parse_fn_declaration("function")
        } else if self.eat(&[TokenKind::Var]) {
            self.parse_var_declaration()
        } else {
            self.parse_stmt()
        };

        stmt.unwrap_or_else(|_| {
            self.synchronize();
            Stmt::NoOp
        })
    }

    /// Parses a statement.
    pub fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::For => {
                self.next();
                self.parse_for_stmt()
            }
            TokenKind::If => {
                self.next();
                self.parse_if_stmt()
            }
            TokenKind::Print => {
                self.next();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "Expected ';' after value.")?;
                Ok(Stmt::PrintStmt(expr))
            }
            TokenKind::Return => {
                self.next();
                self.parse_return_stmt()
            }
            TokenKind::While => {
                self.next();
                self.parse_while_stmt()
            }
            TokenKind::LeftBrace => {
                self.next();
                Ok(Stmt::Block(self.parse_block()?))
            }
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_expr_stmt(&mut self) -> ParseResult<Stmt> {
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "Expected ';' after expression.")?;
        Ok(Stmt::ExprStmt(expr))
    }

    /// Parses the statements of a block. The opening brace must already be consumed.
    fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            match self.parse_declaration() {
                Stmt::NoOp => {}
                stmt => body.push(stmt),
            }
        }
        self.expect(TokenKind::RightBrace, "Expected '}' after block.")?;
        Ok(body)
    }

    fn parse_var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self
            .expect(TokenKind::Identifier, "Expected variable name.")?
            .clone();
        let initializer = if self.eat(&[TokenKind::Equal]) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(
            TokenKind::Semicolon,
            "Expected ';' after variable declaration.",
        )?;
        Ok(Stmt::VarDeclaration { name, initializer })
    }

    fn parse_fn_declaration(&mut self, kind: &str) -> ParseResult<Stmt> {
        let name = self
            .expect(TokenKind::Identifier, &format!("Expected {} name.", kind))?
            .clone();
        self.expect(
            TokenKind::LeftParen,
            &format!("Expected '(' after {} name.", kind),
        )?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_PARAMS {
                    self.error(self.peek(), "Can't have more than 255 parameters.");
                }
                params.push(
                    self.expect(TokenKind::Identifier, "Expected parameter name.")?
                        .clone(),
                );

                if !self.eat(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "Expected ')' after parameters.")?;

        self.expect(
            TokenKind::LeftBrace,
            &format!("Expected '{{' before {} body.", kind),
        )?;
        let body = self.parse_block()?;

        Ok(Stmt::FnDeclaration(Rc::new(FnDeclaration {
            name,
            params,
            body,
        })))
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "Expected ';' after return value.")?;
        Ok(Stmt::ReturnStmt { keyword, value })
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::LeftParen, "Expected '(' after 'if'.")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RightParen, "Expected ')' after 'if' condition.")?;

        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.eat(&[TokenKind::Else]) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt::IfStmt {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::LeftParen, "Expected '(' after 'while'.")?;
        let condition = self.parse_expr()?;
        self.expect(
            TokenKind::RightParen,
            "Expected ')' after 'while' condition.",
        )?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::WhileStmt { condition, body })
    }

    /// Parses a `for` loop and desugars it into a `while` loop.
    fn parse_for_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::LeftParen, "Expected '(' after 'for'.")?;

        let initializer = if self.eat(&[TokenKind::Semicolon]) {
            None
        } else if self.eat(&[TokenKind::Var]) {
            Some(self.parse_var_declaration()?)
        } else {
            Some(self.parse_expr_stmt()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "Expected ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RightParen, "Expected ')' after 'for' clauses.")?;

        let mut body = self.parse_stmt()?;
        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::ExprStmt(increment)]);
        }
        body = Stmt::WhileStmt {
            condition: condition.unwrap_or(Expr::Literal(LiteralValue::Bool(true))),
            body: Box::new(body),
        };
        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }
        Ok(body)
    }
}
