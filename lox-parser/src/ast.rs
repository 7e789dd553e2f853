use crate::lexer::Token;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Identity of a resolvable AST node.
/// Ids are process-wide unique so that tables built from different parses can be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

static NEXT_NODE_ID: AtomicUsize = AtomicUsize::new(0);

impl NodeId {
    /// Returns a fresh id, never handed out before.
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A literal value appearing in source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralValue),
    /// A parenthesized expression (e.g. `(1 + 1)`).
    Grouping(Box<Expr>),
    /// A unary expression (e.g. `-1` or `!a`).
    Unary { op: Token, arg: Box<Expr> },
    /// A binary expression (e.g. `1+1`).
    Binary {
        lhs: Box<Expr>,
        op: Token,
        rhs: Box<Expr>,
    },
    /// A short-circuiting `and` / `or` expression.
    Logical {
        lhs: Box<Expr>,
        op: Token,
        rhs: Box<Expr>,
    },
    /// A variable reference (e.g. `foo`).
    Variable { id: NodeId, name: Token },
    /// An assignment to a variable (e.g. `foo = 1`).
    Assignment {
        id: NodeId,
        name: Token,
        value: Box<Expr>,
    },
    /// A call expression (e.g. `foo(1, 2)`).
    /// `paren` is the closing parenthesis, used to locate runtime errors.
    FnCall {
        callee: Box<Expr>,
        paren: Token,
        args: Vec<Expr>,
    },
}

/// A function declaration. Shared between the AST and the closures created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDeclaration {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    ExprStmt(Expr),
    PrintStmt(Expr),
    VarDeclaration {
        name: Token,
        initializer: Option<Expr>,
    },
    Block(Vec<Stmt>),
    IfStmt {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    WhileStmt {
        condition: Expr,
        body: Box<Stmt>,
    },
    FnDeclaration(Rc<FnDeclaration>),
    ReturnStmt {
        keyword: Token,
        value: Option<Expr>,
    },
    /// Placeholder produced by error recovery. Never part of a finished program.
    NoOp,
}
