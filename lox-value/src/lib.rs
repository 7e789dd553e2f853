//! Runtime values and the environment chain they live in.

pub mod environment;
pub mod object;

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use lox_parser::ast::LiteralValue;
use lox_parser::lexer::Token;

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Object(Rc<object::Obj>),
}

impl Value {
    /// Creates a new string value.
    pub fn new_string(string: impl Into<String>) -> Self {
        Value::Object(Rc::new(object::Obj::new_string(string.into())))
    }

    /// Attempts to cast the `Value` into a `&str` or `None` if wrong type.
    pub fn cast_to_str(&self) -> Option<&str> {
        match self {
            Self::Object(obj) => match &obj.kind {
                object::ObjKind::Str(string) => Some(string),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn cast_to_number(&self) -> Option<f64> {
        match self {
            Self::Number(val) => Some(*val),
            _ => None,
        }
    }

    /// `nil` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Numbers print the way JavaScript's `String(number)` does for the values Lox can produce.
    fn print_number(f: &mut fmt::Formatter<'_>, val: f64) -> fmt::Result {
        let abs = val.abs();
        if val.is_infinite() {
            write!(f, "{}", if val > 0.0 { "Infinity" } else { "-Infinity" })
        } else if val == 0.0 {
            // also covers -0
            write!(f, "0")
        } else if abs >= 1e21 || abs < 1e-6 {
            let exp = format!("{:e}", val);
            match exp.split_once('e') {
                Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                    write!(f, "{}e+{}", mantissa, exponent)
                }
                _ => write!(f, "{}", exp),
            }
        } else {
            write!(f, "{}", val)
        }
    }

    fn print_obj(f: &mut fmt::Formatter<'_>, obj: &object::Obj) -> fmt::Result {
        use object::ObjKind;
        match &obj.kind {
            ObjKind::Str(str) => write!(f, "{}", str),
            ObjKind::Fn(func) => write!(f, "<fn {}>", func.declaration.name.lexeme),
            ObjKind::NativeFn(_) => write!(f, "<native fn>"),
        }
    }
}

impl PartialEq for Value {
    /// Numbers, strings and booleans compare by value, callables by identity.
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::Object(l), Value::Object(r)) => l == r,
            _ => false,
        }
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Nil => Value::Nil,
            LiteralValue::Bool(val) => Value::Bool(*val),
            LiteralValue::Number(val) => Value::Number(*val),
            LiteralValue::Str(val) => Value::new_string(val.as_str()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(val) => write!(f, "{}", val),
            Value::Number(val) => Self::print_number(f, *val),
            Value::Object(val) => Self::print_obj(f, val),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Object(obj) if matches!(obj.kind, object::ObjKind::Str(_)) => {
                write!(f, "{:?}", self.cast_to_str().unwrap_or_default())
            }
            _ => fmt::Display::fmt(self, f),
        }
    }
}

/// Represents a runtime error, located at the token of the failing operation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}\n[line {}]", .token.line)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: &Token, message: impl ToString) -> Self {
        Self {
            token: token.clone(),
            message: message.to_string(),
        }
    }
}

/// Native values that are defined in the global environment before a program runs.
#[derive(Default)]
pub struct BuiltinVars {
    pub values: Vec<(String, Value)>,
}

impl BuiltinVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a native function with the specified `arity`.
    pub fn add_native_fn(
        &mut self,
        ident: &str,
        func: &'static dyn Fn(&mut [Value]) -> Value,
        arity: usize,
    ) {
        let obj = object::Obj::new_native_fn(ident, func, arity);
        self.values
            .push((ident.to_string(), Value::Object(Rc::new(obj))));
    }
}
