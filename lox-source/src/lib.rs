//! Error records and error management shared by every stage of the pipeline.

use std::{cell::RefCell, fmt};
use thiserror::Error;

/// Represents a lexical error (produced by the scanner).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}] Error: {message}")]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

impl LexError {
    /// Create a new lexical error with the specified `message` at `line`.
    pub fn new(message: impl ToString, line: usize) -> Self {
        Self {
            message: message.to_string(),
            line,
        }
    }
}

/// Where a [`SyntaxError`] happened relative to the offending token.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// The error was reported on the end-of-input token.
    AtEnd,
    /// The error was reported on a token with the given lexeme.
    At(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::AtEnd => write!(f, "at end"),
            Location::At(lexeme) => write!(f, "at '{}'", lexeme),
        }
    }
}

/// Represents a syntax error (compile time error).
/// Both the parser and the resolver report this kind of error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}] Error {location}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub location: Location,
    pub message: String,
}

impl SyntaxError {
    /// Create a new syntax error with the specified `message` and `location`.
    pub fn new(message: impl ToString, location: Location, line: usize) -> Self {
        Self {
            message: message.to_string(),
            location,
            line,
        }
    }
}

/// Manages all the errors of a single stage.
pub struct ErrorReporter<E> {
    errors: RefCell<Vec<E>>,
}

impl<E> ErrorReporter<E> {
    /// Create an empty `ErrorReporter`.
    pub fn new() -> Self {
        Self {
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Adds an error to the `ErrorReporter`.
    /// This method uses the interior mutability pattern. This does not require mutability for ergonomics.
    pub fn add_error(&self, error: E) {
        // This should be the only place where self.errors is borrowed mutably.
        self.errors.borrow_mut().push(error);
    }

    /// Number of errors reported so far.
    pub fn len(&self) -> usize {
        self.errors.borrow().len()
    }

    /// Returns `true` if no error has been reported.
    pub fn is_empty(&self) -> bool {
        self.errors.borrow().is_empty()
    }

    /// Consumes `self` and returns the accumulated errors in reporting order.
    pub fn into_errors(self) -> Vec<E> {
        self.errors.into_inner()
    }
}

impl<E> Default for ErrorReporter<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// The output of a pipeline stage: a (possibly partial) result together with every error the stage
/// reported. A response with errors must not be fed to the next stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T, E> {
    pub result: T,
    pub errors: Vec<E>,
}

impl<T, E> Response<T, E> {
    pub fn new(result: T, errors: Vec<E>) -> Self {
        Self { result, errors }
    }

    /// Returns `true` if the stage reported no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts into a `Result`, discarding the partial result if any error was reported.
    pub fn into_result(self) -> Result<T, Vec<E>> {
        if self.errors.is_empty() {
            Ok(self.result)
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(Location::AtEnd.to_string(), "at end");
        assert_eq!(Location::At("fun".to_string()).to_string(), "at 'fun'");
    }

    #[test]
    fn test_syntax_error_display() {
        let error = SyntaxError::new("Expected expression.", Location::At("fun".into()), 3);
        assert_eq!(error.to_string(), "[line 3] Error at 'fun': Expected expression.");
    }

    #[test]
    fn test_reporter_accumulates_in_order() {
        let reporter = ErrorReporter::new();
        assert!(reporter.is_empty());
        reporter.add_error(LexError::new("first", 0));
        reporter.add_error(LexError::new("second", 1));
        assert_eq!(reporter.len(), 2);
        assert!(!reporter.is_empty());

        let errors = reporter.into_errors();
        assert_eq!(errors[0].message, "first");
        assert_eq!(errors[1].line, 1);
    }

    #[test]
    fn test_response_into_result() {
        let ok: Response<u32, LexError> = Response::new(1, Vec::new());
        assert_eq!(ok.into_result(), Ok(1));

        let failed = Response::new(1, vec![LexError::new("oops", 0)]);
        assert!(!failed.is_ok());
        assert_eq!(failed.into_result().unwrap_err().len(), 1);
    }
}
