//! Runs Lox programs from source text.
//!
//! The pipeline is scan → parse → resolve → interpret. Each stage reports every error it finds;
//! the first stage that reports any stops the pipeline and its errors are handed to the caller's
//! `on_error` callback.

pub mod builtin_functions;

use log::debug;
use lox_interp::Interpreter;
use lox_parser::ast::{Expr, Stmt};
use lox_parser::lexer::Token;
use lox_parser::parser::{parse_expression, parse_program};
use lox_parser::scanner::scan;
use lox_passes::resolve::{resolve, resolve_expression};
use lox_source::{LexError, SyntaxError};
use lox_value::{RuntimeError, Value};
use thiserror::Error;

/// Any error the pipeline can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    /// A parse or resolve error.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// The source line the error is located at.
    pub fn line(&self) -> usize {
        match self {
            Error::Lex(err) => err.line,
            Error::Syntax(err) => err.line,
            Error::Runtime(err) => err.token.line,
        }
    }
}

/// Creates an interpreter printing to stdout with the default builtins.
pub fn new_interpreter() -> Interpreter {
    Interpreter::new(&builtin_functions::default_builtin_vars())
}

/// Runs `source` as a program in a fresh interpreter.
/// Returns `None` if any error was reported through `on_error`.
pub fn run(source: &str, on_error: impl FnMut(Error)) -> Option<()> {
    run_in(&mut new_interpreter(), source, on_error)
}

/// Runs `source` as a program in `interpreter`, keeping its globals.
pub fn run_in(
    interpreter: &mut Interpreter,
    source: &str,
    mut on_error: impl FnMut(Error),
) -> Option<()> {
    report(run_program(interpreter, source), &mut on_error)
}

/// Evaluates `source` as a single expression in `interpreter` (REPL style).
pub fn read_eval(
    interpreter: &mut Interpreter,
    source: &str,
    mut on_error: impl FnMut(Error),
) -> Option<Value> {
    report(eval_expression(interpreter, source), &mut on_error)
}

fn run_program(interpreter: &mut Interpreter, source: &str) -> Result<(), Vec<Error>> {
    let statements = parse_source(source)?;
    let locals = resolve(&statements).into_result().map_err(into_errors)?;
    debug!("resolved {} locals", locals.len());
    interpreter.add_locals(locals);
    interpreter
        .interpret_program(&statements)
        .map_err(|err| vec![Error::from(err)])
}

fn eval_expression(interpreter: &mut Interpreter, source: &str) -> Result<Value, Vec<Error>> {
    let expr = parse_source_expression(source)?;
    let locals = resolve_expression(&expr)
        .into_result()
        .map_err(into_errors)?;
    interpreter.add_locals(locals);
    interpreter
        .evaluate_single(&expr)
        .map_err(|err| vec![Error::from(err)])
}

/// Scans `source` into tokens.
pub fn scan_source(source: &str) -> Result<Vec<Token>, Vec<Error>> {
    scan(source).into_result().map_err(into_errors)
}

/// Scans and parses `source` as a program.
pub fn parse_source(source: &str) -> Result<Vec<Stmt>, Vec<Error>> {
    let tokens = scan_source(source)?;
    parse_program(&tokens).into_result().map_err(into_errors)
}

/// Scans and parses `source` as a single expression.
pub fn parse_source_expression(source: &str) -> Result<Expr, Vec<Error>> {
    let tokens = scan_source(source)?;
    let response = parse_expression(&tokens);
    match response.result {
        Some(expr) if response.errors.is_empty() => Ok(expr),
        _ => Err(into_errors(response.errors)),
    }
}

fn into_errors<E: Into<Error>>(errors: Vec<E>) -> Vec<Error> {
    errors.into_iter().map(Into::into).collect()
}

fn report<T>(result: Result<T, Vec<Error>>, on_error: &mut impl FnMut(Error)) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(errors) => {
            for error in errors {
                on_error(error);
            }
            None
        }
    }
}
