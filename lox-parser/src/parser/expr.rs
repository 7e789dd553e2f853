use super::*;
use crate::ast::{LiteralValue, NodeId};
use crate::lexer::Literal;

/// Maximum number of arguments in a call expression.
pub const MAX_ARGS: usize = 255;

/// Generates a left-associative binary precedence level.
/// Seeing one of the `$prefix` operators before any left operand raises `$missing`.
macro_rules! binary_level {
    ($name: ident, $next: ident, [$($kind: expr),+], [$($prefix: expr),+], $missing: expr) => {
        fn $name(&mut self) -> ParseResult<Expr> {
            const OPS: &[TokenKind] = &[$($kind),+];
            const PREFIX: &[TokenKind] = &[$($prefix),+];
            if self.eat(PREFIX) {
                return Err(self.error(self.previous(), $missing));
            }

            let mut lhs = self.$next()?;
            while self.eat(OPS) {
                let op = self.previous().clone();
                let rhs = self.$next()?;
                lhs = Expr::Binary {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                };
            }
            Ok(lhs)
        }
    };
}

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses any expression.
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    /// Parses an assignment. Assignment is right associative.
    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_or()?;

        if self.eat(&[TokenKind::Equal]) {
            let equals = self.previous();
            let value = self.parse_assignment()?;

            return match expr {
                Expr::Variable { name, .. } => Ok(Expr::Assignment {
                    id: NodeId::fresh(),
                    name,
                    value: Box::new(value),
                }),
                expr => {
                    // not fatal, keep parsing with the already built lhs
                    self.error(equals, "Invalid assignment target.");
                    Ok(expr)
                }
            };
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&[TokenKind::Or]) {
            let op = self.previous().clone();
            let rhs = self.parse_and()?;
            lhs = Expr::Logical {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&[TokenKind::And]) {
            let op = self.previous().clone();
            let rhs = self.parse_equality()?;
            lhs = Expr::Logical {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    binary_level!(
        parse_equality,
        parse_comparison,
        [TokenKind::BangEqual, TokenKind::EqualEqual],
        [TokenKind::BangEqual, TokenKind::EqualEqual],
        "Expected comparable before equality operator."
    );

    binary_level!(
        parse_comparison,
        parse_term,
        [
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual
        ],
        [
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual
        ],
        "Expected term before comparison operator."
    );

    binary_level!(
        parse_term,
        parse_factor,
        [TokenKind::Minus, TokenKind::Plus],
        // `-` doubles as negation
        [TokenKind::Plus],
        "Expected operand before operator."
    );

    binary_level!(
        parse_factor,
        parse_unary,
        [TokenKind::Slash, TokenKind::Star],
        [TokenKind::Slash, TokenKind::Star],
        "Expected operand before operator."
    );

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        // NOTE: prefix operators are handled here
        if self.eat(&[TokenKind::Bang, TokenKind::Minus]) {
            let op = self.previous().clone();
            let arg = self.parse_unary()?;
            Ok(Expr::Unary {
                op,
                arg: Box::new(arg),
            })
        } else {
            self.parse_call()
        }
    }

    /// Parses a primary expression followed by any number of call suffixes.
    fn parse_call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary_expr()?;
        while self.eat(&[TokenKind::LeftParen]) {
            expr = self.finish_call(expr)?;
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_ARGS {
                    self.error(self.peek(), "Can't have more than 255 arguments.");
                }
                args.push(self.parse_expr()?);

                if !self.eat(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let paren = self
            .expect(TokenKind::RightParen, "Expected ')' after arguments.")?
            .clone();

        Ok(Expr::FnCall {
            callee: Box::new(callee),
            paren,
            args,
        })
    }

    /// Parses a primary (atom) expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        let token = self.peek();
        let expr = match token.kind {
            TokenKind::False => Expr::Literal(LiteralValue::Bool(false)),
            TokenKind::True => Expr::Literal(LiteralValue::Bool(true)),
            TokenKind::Nil => Expr::Literal(LiteralValue::Nil),
            TokenKind::Number | TokenKind::String => Expr::Literal(match &token.literal {
                Some(Literal::Number(val)) => LiteralValue::Number(*val),
                Some(Literal::Str(val)) => LiteralValue::Str(val.clone()),
                None => return Err(self.error(token, "Expected expression.")),
            }),
            TokenKind::Identifier => Expr::Variable {
                id: NodeId::fresh(),
                name: token.clone(),
            },
            TokenKind::LeftParen => {
                self.next();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RightParen, "Expected ')' after expression.")?;
                return Ok(Expr::Grouping(Box::new(expr)));
            }
            _ => return Err(self.error(token, "Expected expression.")),
        };
        self.next(); // eat parsed token
        Ok(expr)
    }
}
