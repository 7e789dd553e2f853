//! Front end of the interpreter: scanning and parsing source text into an AST.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod scanner;
pub mod visitor;
