//! Tree-walking evaluator.

use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, trace, warn};
use lox_parser::ast::{Expr, FnDeclaration, NodeId, Stmt};
use lox_parser::lexer::{Token, TokenKind};
use lox_passes::resolve::Locals;
use lox_value::environment::Environment;
use lox_value::object::{Obj, ObjKind};
use lox_value::{BuiltinVars, RuntimeError, Value};

/// How a statement finished executing.
/// `Return` unwinds up to the closest call boundary; it is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Normal,
    Return(Value),
}

pub type ExecResult = Result<Completion, RuntimeError>;
pub type EvalResult = Result<Value, RuntimeError>;

pub struct Interpreter {
    globals: Environment,
    /// The frame of the block or call currently executing.
    environment: Environment,
    /// Scope distances of resolved variable references. Missing entries are globals.
    locals: Locals,
    output: Box<dyn Write>,
}

impl Interpreter {
    /// Creates an interpreter printing to stdout, with `builtin_vars` defined as globals.
    pub fn new(builtin_vars: &BuiltinVars) -> Self {
        Self::with_output(builtin_vars, Box::new(io::stdout()))
    }

    /// Creates an interpreter printing to `output`.
    pub fn with_output(builtin_vars: &BuiltinVars, output: Box<dyn Write>) -> Self {
        let globals = Environment::new();
        for (ident, value) in &builtin_vars.values {
            globals.define(ident, value.clone());
        }
        Self {
            environment: globals.clone(),
            globals,
            locals: Locals::new(),
            output,
        }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// Registers the output of a successful resolver run.
    /// Must be called before interpreting the statements that were resolved.
    pub fn add_locals(&mut self, locals: Locals) {
        self.locals.extend(locals);
    }

    /// Executes a program. Stops at the first runtime error.
    pub fn interpret_program(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        debug!("interpreting {} statements", statements.len());
        for stmt in statements {
            if let Completion::Return(_) = self.execute(stmt)? {
                // rejected by the resolver, nothing to unwind to
                break;
            }
        }
        Ok(())
    }

    /// Evaluates a single expression (REPL style).
    pub fn evaluate_single(&mut self, expr: &Expr) -> EvalResult {
        self.evaluate(expr)
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::ExprStmt(expr) => {
                self.evaluate(expr)?;
            }
            Stmt::PrintStmt(expr) => {
                let value = self.evaluate(expr)?;
                if let Err(err) = writeln!(self.output, "{}", value) {
                    warn!("failed to write program output: {}", err);
                }
            }
            Stmt::VarDeclaration { name, initializer } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Nil,
                };
                self.environment.define(&name.lexeme, value);
            }
            Stmt::Block(body) => {
                let env = Environment::new_enclosed(&self.environment);
                return self.execute_block(body, env);
            }
            Stmt::IfStmt {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }
            Stmt::WhileStmt { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let completion @ Completion::Return(_) = self.execute(body)? {
                        return Ok(completion);
                    }
                }
            }
            Stmt::FnDeclaration(decl) => {
                let func = Obj::new_fn(Rc::clone(decl), self.environment.clone());
                self.environment
                    .define(&decl.name.lexeme, Value::Object(Rc::new(func)));
            }
            Stmt::ReturnStmt { keyword: _, value } => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };
                return Ok(Completion::Return(value));
            }
            Stmt::NoOp => {}
        }
        Ok(Completion::Normal)
    }

    /// Executes `statements` with `env` as the current frame.
    /// The previous frame is restored even if a statement fails.
    pub fn execute_block(&mut self, statements: &[Stmt], env: Environment) -> ExecResult {
        let previous = std::mem::replace(&mut self.environment, env);

        let mut result = Ok(Completion::Normal);
        for stmt in statements {
            result = self.execute(stmt);
            if !matches!(result, Ok(Completion::Normal)) {
                break;
            }
        }

        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Literal(literal) => Ok(Value::from(literal)),
            Expr::Grouping(expr) => self.evaluate(expr),
            Expr::Unary { op, arg } => {
                let arg = self.evaluate(arg)?;
                match op.kind {
                    TokenKind::Minus => match arg {
                        Value::Number(val) => Ok(Value::Number(-val)),
                        _ => Err(RuntimeError::new(op, "Operand must be a number.")),
                    },
                    TokenKind::Bang => Ok(Value::Bool(!arg.is_truthy())),
                    _ => Err(RuntimeError::new(op, "Invalid unary operator.")),
                }
            }
            Expr::Binary { lhs, op, rhs } => {
                let lhs = self.evaluate(lhs)?;
                let rhs = self.evaluate(rhs)?;
                binary_op(op, lhs, rhs)
            }
            Expr::Logical { lhs, op, rhs } => {
                let lhs = self.evaluate(lhs)?;
                let short_circuit = match op.kind {
                    TokenKind::Or => lhs.is_truthy(),
                    _ => !lhs.is_truthy(),
                };
                if short_circuit {
                    Ok(lhs)
                } else {
                    self.evaluate(rhs)
                }
            }
            Expr::Variable { id, name } => self.look_up_variable(*id, name),
            Expr::Assignment { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(id) {
                    Some(distance) => self
                        .environment
                        .assign_at(*distance, name, value.clone())?,
                    None => self.globals.assign(name, value.clone())?,
                }
                Ok(value)
            }
            Expr::FnCall {
                callee,
                paren,
                args,
            } => {
                let callee = self.evaluate(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(callee, args, paren)
            }
        }
    }

    fn look_up_variable(&self, id: NodeId, name: &Token) -> EvalResult {
        match self.locals.get(&id) {
            Some(distance) => self.environment.get_at(*distance, name),
            None => self.globals.get(name),
        }
    }

    fn call(&mut self, callee: Value, mut args: Vec<Value>, paren: &Token) -> EvalResult {
        let obj = match &callee {
            Value::Object(obj) => obj,
            _ => return Err(not_callable(paren)),
        };
        let arity = obj.arity().ok_or_else(|| not_callable(paren))?;
        if args.len() != arity {
            return Err(RuntimeError::new(
                paren,
                format!("Expected {} argument(s) but got {}.", arity, args.len()),
            ));
        }

        match &obj.kind {
            ObjKind::NativeFn(native) => {
                trace!("calling native fn {}", native.ident);
                Ok((native.func)(&mut args))
            }
            ObjKind::Fn(func) => {
                trace!("calling <fn {}>", func.declaration.name.lexeme);
                self.call_function(&func.declaration, &func.closure, args)
            }
            ObjKind::Str(_) => Err(not_callable(paren)),
        }
    }

    /// Runs a user defined function in a new frame whose parent is the captured `closure`.
    fn call_function(
        &mut self,
        declaration: &FnDeclaration,
        closure: &Environment,
        args: Vec<Value>,
    ) -> EvalResult {
        let env = Environment::new_enclosed(closure);
        for (param, arg) in declaration.params.iter().zip(args) {
            env.define(&param.lexeme, arg);
        }

        match self.execute_block(&declaration.body, env)? {
            Completion::Return(value) => Ok(value),
            Completion::Normal => Ok(Value::Nil),
        }
    }
}

fn not_callable(paren: &Token) -> RuntimeError {
    RuntimeError::new(paren, "Can only call functions and classes.")
}

fn binary_op(op: &Token, lhs: Value, rhs: Value) -> EvalResult {
    /// Generate evaluation of a binary operator on two numbers.
    macro_rules! num_binary_op {
        ($op: tt, $result: path) => {
            match (&lhs, &rhs) {
                (Value::Number(a), Value::Number(b)) => Ok($result(*a $op *b)),
                _ => Err(RuntimeError::new(op, "Operands must be numbers.")),
            }
        };

        ($op: tt) => {
            num_binary_op!($op, Value::Number)
        };
    }

    match op.kind {
        TokenKind::Minus => num_binary_op!(-),
        TokenKind::Slash => num_binary_op!(/),
        TokenKind::Star => num_binary_op!(*),
        TokenKind::Plus => match (&lhs, &rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            _ => match (lhs.cast_to_str(), rhs.cast_to_str()) {
                // handle string concatenation
                (Some(a), Some(b)) => Ok(Value::new_string(format!("{}{}", a, b))),
                _ => Err(RuntimeError::new(
                    op,
                    "Operands must be two numbers or two strings.",
                )),
            },
        },
        TokenKind::Greater => num_binary_op!(>, Value::Bool),
        TokenKind::GreaterEqual => num_binary_op!(>=, Value::Bool),
        TokenKind::Less => num_binary_op!(<, Value::Bool),
        TokenKind::LessEqual => num_binary_op!(<=, Value::Bool),
        TokenKind::EqualEqual => Ok(Value::Bool(lhs == rhs)),
        TokenKind::BangEqual => Ok(Value::Bool(lhs != rhs)),
        _ => Err(RuntimeError::new(op, "Invalid binary operator.")),
    }
}
