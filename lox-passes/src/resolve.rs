//! Variable resolution pass.

use std::collections::HashMap;
use std::mem;

use log::trace;
use lox_parser::ast::{Expr, FnDeclaration, NodeId, Stmt};
use lox_parser::lexer::{Token, TokenKind};
use lox_parser::visitor::{walk_expr, walk_stmt, Visitor};
use lox_source::{ErrorReporter, Location, Response, SyntaxError};

/// A [`HashMap`] mapping resolved [`Expr::Variable`]s and [`Expr::Assignment`]s to the number of
/// scopes between the reference and the scope declaring the variable.
/// Nodes missing from the table are globals.
pub type Locals = HashMap<NodeId, usize>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FunctionKind {
    None,
    Function,
}

/// Variable resolution pass.
pub struct Resolver {
    /// A [`Vec`] of lexical scopes. Each maps a name to whether its declaration is complete.
    /// The global scope is not tracked.
    scopes: Vec<HashMap<String, bool>>,
    locals: Locals,
    current_function: FunctionKind,
    errors: ErrorReporter<SyntaxError>,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            locals: Locals::new(),
            current_function: FunctionKind::None,
            errors: ErrorReporter::new(),
        }
    }

    /// Resolves every statement of a top level program.
    pub fn resolve_program(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.visit_stmt(stmt);
        }
        debug_assert!(self.scopes.is_empty());
    }

    /// Resolves a single top level expression.
    pub fn resolve_expr(&mut self, expr: &Expr) {
        self.visit_expr(expr);
    }

    /// Consumes `self` and returns the resolved table with every static error.
    pub fn finish(self) -> Response<Locals, SyntaxError> {
        trace!("resolved {} local references", self.locals.len());
        Response::new(self.locals, self.errors.into_errors())
    }

    fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn error(&self, token: &Token, message: &str) {
        let location = match token.kind {
            TokenKind::Eof => Location::AtEnd,
            _ => Location::At(token.lexeme.clone()),
        };
        self.errors
            .add_error(SyntaxError::new(message, location, token.line));
    }

    /// Adds `name` to the innermost scope, not yet ready to be referenced.
    fn declare(&mut self, name: &Token) {
        let already_declared = match self.scopes.last_mut() {
            Some(scope) => scope.insert(name.lexeme.clone(), false).is_some(),
            None => return,
        };
        if already_declared {
            self.error(
                name,
                "There's already a variable with this name in this scope.",
            );
        }
    }

    /// Marks `name` as ready to be referenced in the innermost scope.
    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    /// Records the distance to the innermost scope declaring `name`, if any.
    fn resolve_local(&mut self, id: NodeId, name: &Token) {
        let distance = self
            .scopes
            .iter()
            .rev()
            .position(|scope| scope.contains_key(&name.lexeme));
        if let Some(distance) = distance {
            self.locals.insert(id, distance);
        }
    }

    fn resolve_function(&mut self, decl: &FnDeclaration, kind: FunctionKind) {
        let enclosing_function = mem::replace(&mut self.current_function, kind);

        self.enter_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        for stmt in &decl.body {
            self.visit_stmt(stmt);
        }
        self.exit_scope();

        self.current_function = enclosing_function;
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Visitor<'a> for Resolver {
    fn visit_expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::Variable { id, name } => {
                let in_own_initializer = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(&name.lexeme))
                    == Some(&false);
                if in_own_initializer {
                    self.error(name, "Can't read a local variable in its own initializer.");
                }
                self.resolve_local(*id, name);
            }
            Expr::Assignment { id, name, value } => {
                self.visit_expr(value);
                self.resolve_local(*id, name);
            }
            _ => walk_expr(self, expr),
        }
    }

    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Block(body) => {
                self.enter_scope();
                for stmt in body {
                    self.visit_stmt(stmt);
                }
                self.exit_scope();
            }
            Stmt::VarDeclaration { name, initializer } => {
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.visit_expr(initializer);
                }
                self.define(name);
            }
            Stmt::FnDeclaration(decl) => {
                // Define the name first to allow for recursion.
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionKind::Function);
            }
            Stmt::ReturnStmt { keyword, value } => {
                if self.current_function == FunctionKind::None {
                    self.error(keyword, "Can't return from top-level code.");
                }
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            _ => walk_stmt(self, stmt),
        }
    }
}

/// Resolves a whole program.
pub fn resolve(statements: &[Stmt]) -> Response<Locals, SyntaxError> {
    let mut resolver = Resolver::new();
    resolver.resolve_program(statements);
    resolver.finish()
}

/// Resolves a single top level expression.
pub fn resolve_expression(expr: &Expr) -> Response<Locals, SyntaxError> {
    let mut resolver = Resolver::new();
    resolver.resolve_expr(expr);
    resolver.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lox_parser::parser::parse_program;
    use lox_parser::scanner::scan;

    fn program(source: &str) -> Vec<Stmt> {
        let tokens = scan(source);
        assert!(tokens.errors.is_empty());
        let ast = parse_program(&tokens.result);
        assert!(ast.errors.is_empty(), "{:?}", ast.errors);
        ast.result
    }

    /// Collects `(name, distance)` for every variable reference in source order.
    /// Unresolved (global) references have no distance.
    fn distances(statements: &[Stmt], locals: &Locals) -> Vec<(String, Option<usize>)> {
        struct Collect<'l> {
            locals: &'l Locals,
            out: Vec<(String, Option<usize>)>,
        }
        impl<'a, 'l> Visitor<'a> for Collect<'l> {
            fn visit_expr(&mut self, expr: &'a Expr) {
                match expr {
                    Expr::Variable { id, name } | Expr::Assignment { id, name, .. } => {
                        self.out
                            .push((name.lexeme.clone(), self.locals.get(id).copied()));
                    }
                    _ => {}
                }
                walk_expr(self, expr);
            }
        }

        let mut collect = Collect {
            locals,
            out: Vec::new(),
        };
        for stmt in statements {
            collect.visit_stmt(stmt);
        }
        collect.out
    }

    #[test]
    fn test_globals_are_unresolved() {
        let ast = program("var a = 1; print a; a = 2;");
        let locals = resolve(&ast).into_result().unwrap();
        assert!(locals.is_empty());
    }

    #[test]
    fn test_block_distances() {
        let ast = program(
            r#"
            {
                var a = 1;
                {
                    var b = a;
                    print b;
                    a = b;
                }
            }"#,
        );
        let locals = resolve(&ast).into_result().unwrap();
        assert_eq!(
            distances(&ast, &locals),
            vec![
                ("a".to_string(), Some(1)),
                ("b".to_string(), Some(0)),
                ("a".to_string(), Some(1)),
                ("b".to_string(), Some(0)),
            ]
        );
    }

    #[test]
    fn test_closure_and_recursion() {
        let ast = program(
            r#"
            fun outer(x) {
                fun inner() {
                    return x + inner;
                }
                return inner;
            }"#,
        );
        let locals = resolve(&ast).into_result().unwrap();
        assert_eq!(
            distances(&ast, &locals),
            vec![
                ("x".to_string(), Some(1)),
                ("inner".to_string(), Some(1)),
                ("inner".to_string(), Some(0)),
            ]
        );
    }

    #[test]
    fn test_shadowing_is_fixed_at_resolve_time() {
        let ast = program(
            r#"
            var a = "global";
            {
                fun showA() {
                    print a;
                }
                showA();
                var a = "block";
                showA();
            }"#,
        );
        let locals = resolve(&ast).into_result().unwrap();
        assert_eq!(
            distances(&ast, &locals),
            vec![
                ("a".to_string(), None),
                ("showA".to_string(), Some(0)),
                ("showA".to_string(), Some(0)),
            ]
        );
    }

    #[test]
    fn test_own_initializer() {
        let ast = program("{ var a = a; }");
        let errors = resolve(&ast).errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "Can't read a local variable in its own initializer."
        );
        assert_eq!(errors[0].location, Location::At("a".to_string()));

        // Globals may refer to themselves (resolved dynamically).
        assert!(resolve(&program("var a = a;")).is_ok());
    }

    #[test]
    fn test_duplicate_declaration() {
        let ast = program("fun f(a) { var a = 1; } { var b; var b; }");
        let errors = resolve(&ast).errors;
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|error| error.message
            == "There's already a variable with this name in this scope."));

        // Redeclaring globals is allowed.
        assert!(resolve(&program("var a; var a;")).is_ok());
    }

    #[test]
    fn test_top_level_return() {
        let errors = resolve(&program("return 1;")).errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Can't return from top-level code.");
        assert_eq!(errors[0].location, Location::At("return".to_string()));

        assert!(resolve(&program("fun f() { { return; } }")).is_ok());
    }

    #[test]
    fn test_resolving_twice_is_idempotent() {
        let ast = program("fun f(a) { { var b = a; return b; } } { var c = 1; print c; }");
        let first = resolve(&ast).into_result().unwrap();
        let second = resolve(&ast).into_result().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);

        let mut resolver = Resolver::new();
        resolver.resolve_program(&ast);
        resolver.resolve_program(&ast);
        assert_eq!(resolver.finish().into_result().unwrap(), first);
    }
}
