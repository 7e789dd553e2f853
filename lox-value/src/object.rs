use std::rc::Rc;

use lox_parser::ast::FnDeclaration;

use crate::environment::Environment;
use crate::Value;

#[derive(Clone)]
pub struct NativeFn {
    pub ident: String,
    pub arity: usize,
    pub func: &'static dyn Fn(&mut [Value]) -> Value,
}

/// A user defined function together with the environment active at its declaration.
#[derive(Clone)]
pub struct Function {
    pub declaration: Rc<FnDeclaration>,
    pub closure: Environment,
}

impl Function {
    /// Number of arguments that the function accepts.
    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

#[derive(Clone)]
pub enum ObjKind {
    Str(String),
    Fn(Function),
    NativeFn(NativeFn),
}

pub struct Obj {
    pub kind: ObjKind,
}

impl Obj {
    pub fn new_string(str: String) -> Self {
        Self {
            kind: ObjKind::Str(str),
        }
    }

    pub fn new_fn(declaration: Rc<FnDeclaration>, closure: Environment) -> Self {
        Self {
            kind: ObjKind::Fn(Function {
                declaration,
                closure,
            }),
        }
    }

    pub fn new_native_fn(
        ident: &str,
        func: &'static dyn Fn(&mut [Value]) -> Value,
        arity: usize,
    ) -> Self {
        Self {
            kind: ObjKind::NativeFn(NativeFn {
                ident: ident.to_string(),
                arity,
                func,
            }),
        }
    }

    /// Returns the arity if the object is callable.
    pub fn arity(&self) -> Option<usize> {
        match &self.kind {
            ObjKind::Str(_) => None,
            ObjKind::Fn(func) => Some(func.arity()),
            ObjKind::NativeFn(native) => Some(native.arity),
        }
    }
}

impl PartialEq for Obj {
    /// Strings compare by content, callables by identity.
    fn eq(&self, other: &Obj) -> bool {
        match (&self.kind, &other.kind) {
            (ObjKind::Str(l), ObjKind::Str(r)) => l == r,
            _ => std::ptr::eq(self, other),
        }
    }
}
