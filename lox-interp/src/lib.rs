//! Tree-walking interpreter executing resolved programs.

pub mod interpreter;
pub mod output;

pub use interpreter::{Completion, Interpreter};
pub use lox_value::RuntimeError;
