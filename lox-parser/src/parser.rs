use crate::ast::{Expr, Stmt};
use crate::lexer::{Token, TokenKind};
use log::debug;
use lox_source::{ErrorReporter, Location, Response, SyntaxError};

mod expr;
mod stmt;

/// Result of a parse function. The `Err` variant has already been recorded in the parser's
/// [`ErrorReporter`]; it only unwinds to the closest recovery point.
pub type ParseResult<T> = Result<T, SyntaxError>;

/// Recursive descent parser over a scanned token sequence.
/// The token sequence must end with a [`TokenKind::Eof`] token, as produced by [`crate::scanner::scan`].
pub struct Parser<'a> {
    tokens: &'a [Token],
    /// Index of the next token to consume.
    current: usize,
    errors: ErrorReporter<SyntaxError>,
}

impl<'a> Parser<'a> {
    /// # Panics
    /// Panics if `tokens` does not end with a [`TokenKind::Eof`] token.
    /// [`parse_program`] and [`parse_expression`] check this and report an error instead.
    pub fn new(tokens: &'a [Token]) -> Self {
        assert!(
            matches!(tokens.last(), Some(token) if token.kind == TokenKind::Eof),
            "token sequence must end with Eof"
        );
        Self {
            tokens,
            current: 0,
            errors: ErrorReporter::new(),
        }
    }
}

impl<'a> Parser<'a> {
    /// Parses a sequence of declarations until the end of input.
    /// Placeholders created by error recovery are dropped from the result.
    pub fn parse_program(mut self) -> Response<Vec<Stmt>, SyntaxError> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.parse_declaration() {
                Stmt::NoOp => {}
                stmt => statements.push(stmt),
            }
        }
        debug!(
            "parsed {} statements with {} syntax errors",
            statements.len(),
            self.errors.len()
        );
        Response::new(statements, self.errors.into_errors())
    }

    /// Parses a single expression spanning the whole input (REPL style).
    pub fn parse_single_expression(mut self) -> Response<Option<Expr>, SyntaxError> {
        let expr = self.parse_expr().and_then(|expr| {
            if self.is_at_end() {
                Ok(expr)
            } else {
                Err(self.error(self.peek(), "Expected end of expression."))
            }
        });
        Response::new(expr.ok(), self.errors.into_errors())
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    fn peek(&self) -> &'a Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &'a Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Consumes the current token and returns it. Never moves past `Eof`.
    fn next(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    /// Predicate that tests whether the current token has the specified kind.
    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    /// Eats the current token if it has one of the specified kinds.
    fn eat(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|kind| self.check(*kind)) {
            self.next();
            true
        } else {
            false
        }
    }

    /// Eats a token of the specified kind or raises an error with `message`.
    fn expect(&mut self, kind: TokenKind, message: &str) -> ParseResult<&'a Token> {
        if self.check(kind) {
            Ok(self.next())
        } else {
            Err(self.error(self.peek(), message))
        }
    }

    /// Records an error located at `token` and returns it so that it can be propagated.
    fn error(&self, token: &Token, message: &str) -> SyntaxError {
        let location = match token.kind {
            TokenKind::Eof => Location::AtEnd,
            _ => Location::At(token.lexeme.clone()),
        };
        let error = SyntaxError::new(message, location, token.line);
        self.errors.add_error(error.clone());
        error
    }

    /// Discards tokens until a statement boundary is reached.
    fn synchronize(&mut self) {
        self.next();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon || self.peek().kind.starts_statement() {
                return;
            }
            self.next();
        }
    }
}

/// Returns an error if `tokens` was not terminated by the scanner.
fn check_terminated(tokens: &[Token]) -> Result<(), SyntaxError> {
    match tokens.last() {
        Some(token) if token.kind == TokenKind::Eof => Ok(()),
        last => Err(SyntaxError::new(
            "Expected end of input.",
            Location::AtEnd,
            last.map_or(0, |token| token.line),
        )),
    }
}

/// Parses a whole program from a scanned token sequence.
pub fn parse_program(tokens: &[Token]) -> Response<Vec<Stmt>, SyntaxError> {
    match check_terminated(tokens) {
        Ok(()) => Parser::new(tokens).parse_program(),
        Err(err) => Response::new(Vec::new(), vec![err]),
    }
}

/// Parses a single expression from a scanned token sequence.
pub fn parse_expression(tokens: &[Token]) -> Response<Option<Expr>, SyntaxError> {
    match check_terminated(tokens) {
        Ok(()) => Parser::new(tokens).parse_single_expression(),
        Err(err) => Response::new(None, vec![err]),
    }
}
