//! Renders expressions in a parenthesized prefix form, e.g. `(+ 3 (/ (group (+ 4 5)) 3))`.

use crate::ast::{Expr, LiteralValue};

/// Renders `expr` in prefix form.
pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(value) => print_literal(value),
        Expr::Grouping(expr) => parenthesize("group", &[&**expr]),
        Expr::Unary { op, arg } => parenthesize(&op.lexeme, &[&**arg]),
        Expr::Binary { lhs, op, rhs } | Expr::Logical { lhs, op, rhs } => {
            parenthesize(&op.lexeme, &[&**lhs, &**rhs])
        }
        Expr::Variable { name, .. } => name.lexeme.clone(),
        Expr::Assignment { name, value, .. } => format!("(= {} {})", name.lexeme, print_expr(value)),
        Expr::FnCall { callee, args, .. } => {
            let mut exprs: Vec<&Expr> = vec![&**callee];
            exprs.extend(args.iter());
            parenthesize("call", &exprs)
        }
    }
}

fn print_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Nil => "nil".to_string(),
        LiteralValue::Bool(val) => val.to_string(),
        LiteralValue::Number(val) => val.to_string(),
        LiteralValue::Str(val) => val.clone(),
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    let mut string = format!("({}", name);
    for expr in exprs {
        string.push(' ');
        string.push_str(&print_expr(expr));
    }
    string.push(')');
    string
}
