//! Scope frames. A frame is shared between every closure that captured it, so mutation through one
//! handle is visible through all the others.
//!
//! Frames are plain reference counted handles. A function declared in a frame and bound in that
//! same frame forms a cycle (frame → function → closure → frame), so such a frame is never freed.
//! Bindings are not cleared when a scope exits, because an escaping closure (e.g. a counter
//! returned from its maker) still needs them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use lox_parser::lexer::Token;

use crate::{RuntimeError, Value};

struct Frame {
    values: HashMap<String, Value>,
    enclosing: Option<Environment>,
}

/// A reference counted handle to a scope frame. Cloning the handle aliases the frame.
#[derive(Clone)]
pub struct Environment(Rc<RefCell<Frame>>);

impl Environment {
    /// Creates a frame without a parent (the global frame).
    pub fn new() -> Self {
        Self::with_enclosing(None)
    }

    /// Creates a frame nested inside `enclosing`.
    pub fn new_enclosed(enclosing: &Environment) -> Self {
        Self::with_enclosing(Some(enclosing.clone()))
    }

    fn with_enclosing(enclosing: Option<Environment>) -> Self {
        Environment(Rc::new(RefCell::new(Frame {
            values: HashMap::new(),
            enclosing,
        })))
    }

    /// Binds `name` in this frame, overwriting any previous binding.
    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().values.insert(name.to_string(), value);
    }

    /// Looks `name` up, walking the chain outward.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        let mut env = self.clone();
        loop {
            let enclosing = {
                let frame = env.0.borrow();
                if let Some(value) = frame.values.get(&name.lexeme) {
                    return Ok(value.clone());
                }
                frame.enclosing.clone()
            };
            match enclosing {
                Some(enclosing) => env = enclosing,
                None => return Err(undefined_variable(name)),
            }
        }
    }

    /// Overwrites the closest existing binding of `name`. Never declares a new one.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let mut env = self.clone();
        loop {
            let enclosing = {
                let mut frame = env.0.borrow_mut();
                if let Some(slot) = frame.values.get_mut(&name.lexeme) {
                    *slot = value;
                    return Ok(());
                }
                frame.enclosing.clone()
            };
            match enclosing {
                Some(enclosing) => env = enclosing,
                None => return Err(undefined_variable(name)),
            }
        }
    }

    /// Looks `name` up in the frame exactly `distance` parents up (`0` is `self`).
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        let env = self
            .ancestor(distance)
            .ok_or_else(|| undefined_variable(name))?;
        let value = env.0.borrow().values.get(&name.lexeme).cloned();
        value.ok_or_else(|| undefined_variable(name))
    }

    /// Overwrites `name` in the frame exactly `distance` parents up (`0` is `self`).
    pub fn assign_at(&self, distance: usize, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let env = self
            .ancestor(distance)
            .ok_or_else(|| undefined_variable(name))?;
        let mut frame = env.0.borrow_mut();
        match frame.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined_variable(name)),
        }
    }

    fn ancestor(&self, distance: usize) -> Option<Environment> {
        let mut env = self.clone();
        for _ in 0..distance {
            let enclosing = env.0.borrow().enclosing.clone()?;
            env = enclosing;
        }
        Some(env)
    }

    /// Returns `true` if both handles refer to the same frame.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn undefined_variable(name: &Token) -> RuntimeError {
    RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Obj, ObjKind};
    use lox_parser::ast::FnDeclaration;
    use lox_parser::lexer::TokenKind;

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, None, 0)
    }

    #[test]
    fn test_define_and_redefine() {
        let env = Environment::new();
        env.define("a", Value::Number(1.0));
        env.define("a", Value::Number(2.0));
        assert_eq!(env.get(&ident("a")), Ok(Value::Number(2.0)));
    }

    #[test]
    fn test_get_walks_outward() {
        let global = Environment::new();
        global.define("a", Value::Bool(true));
        let inner = Environment::new_enclosed(&Environment::new_enclosed(&global));
        assert_eq!(inner.get(&ident("a")), Ok(Value::Bool(true)));

        let error = inner.get(&ident("b")).unwrap_err();
        assert_eq!(error.message, "Undefined variable 'b'.");
    }

    #[test]
    fn test_assign_never_declares() {
        let global = Environment::new();
        let inner = Environment::new_enclosed(&global);
        assert!(inner.assign(&ident("a"), Value::Nil).is_err());

        global.define("a", Value::Nil);
        inner.assign(&ident("a"), Value::Number(3.0)).unwrap();
        assert_eq!(global.get(&ident("a")), Ok(Value::Number(3.0)));
        assert!(inner.get_at(0, &ident("a")).is_err());
    }

    #[test]
    fn test_distance_access() {
        let global = Environment::new();
        global.define("a", Value::Number(0.0));
        let middle = Environment::new_enclosed(&global);
        middle.define("a", Value::Number(1.0));
        let inner = Environment::new_enclosed(&middle);
        inner.define("a", Value::Number(2.0));

        assert_eq!(inner.get_at(0, &ident("a")), Ok(Value::Number(2.0)));
        assert_eq!(inner.get_at(1, &ident("a")), Ok(Value::Number(1.0)));
        assert_eq!(inner.get_at(2, &ident("a")), Ok(Value::Number(0.0)));
        assert!(inner.get_at(3, &ident("a")).is_err());

        inner.assign_at(2, &ident("a"), Value::Nil).unwrap();
        assert_eq!(global.get(&ident("a")), Ok(Value::Nil));
        assert_eq!(middle.get(&ident("a")), Ok(Value::Number(1.0)));
    }

    #[test]
    fn test_local_function_captures_its_own_frame() {
        let frame = Environment::new_enclosed(&Environment::new());
        let decl = Rc::new(FnDeclaration {
            name: ident("f"),
            params: Vec::new(),
            body: Vec::new(),
        });
        frame.define("f", Value::Object(Rc::new(Obj::new_fn(decl, frame.clone()))));

        // one handle here, one held by the closure bound inside the frame
        assert_eq!(Rc::strong_count(&frame.0), 2);
        match frame.get(&ident("f")) {
            Ok(Value::Object(obj)) => match &obj.kind {
                ObjKind::Fn(func) => assert!(func.closure.ptr_eq(&frame)),
                _ => panic!("expected a function"),
            },
            _ => panic!("expected a function"),
        }
    }

    #[test]
    fn test_aliased_frames_share_mutation() {
        let frame = Environment::new();
        frame.define("i", Value::Number(0.0));
        let alias = frame.clone();
        alias.assign(&ident("i"), Value::Number(1.0)).unwrap();
        assert!(alias.ptr_eq(&frame));
        assert_eq!(frame.get(&ident("i")), Ok(Value::Number(1.0)));
    }
}
