//! Expression AST - the core of SQL expression building.
//!
//! This module provides a strongly-typed AST for the SQL expressions an
//! aggregation statement is made of, with exhaustive pattern matching
//! enforced by the compiler.
//!
//! There is no raw-SQL escape hatch. Caller-supplied scalars enter a
//! statement as [`Expr::Param`] or [`Expr::In`] (bound at execution time);
//! inline string literals come from a closed set owned by this crate.

use serde::Serialize;

use super::dialect::Dialect;
use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
///
/// Every variant must be handled in `to_tokens()` - the compiler enforces this.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<String>,
        column: String,
    },

    /// String literal, rendered inline and escaped
    Literal(String),

    /// Bound parameter, rendered as a placeholder
    Param(Literal),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Function call: name(args...)
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },

    /// Membership in an id list bound as a single parameter.
    ///
    /// The placeholder count stays at one however many ids there are; the
    /// dialect decides how the list is expanded on the server.
    In { expr: Box<Expr>, ids: Vec<i64> },

    /// Parenthesized expression
    Paren(Box<Expr>),
}

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    IntList(Vec<i64>),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    And,
}

// =============================================================================
// Expression to Tokens
// =============================================================================

impl Expr {
    /// Convert this expression to a token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { table, column } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }

            Expr::Literal(s) => {
                ts.push(Token::LitString(s.clone()));
            }

            Expr::Param(value) => {
                ts.push(Token::Param(value.clone()));
            }

            Expr::BinaryOp { left, op, right } => {
                ts.append(&left.to_tokens());
                ts.space();
                ts.push(binary_op_to_token(*op));
                ts.space();
                ts.append(&right.to_tokens());
            }

            Expr::Function {
                name,
                args,
                distinct,
            } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                if *distinct {
                    ts.push(Token::Distinct).space();
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens());
                }
                ts.rparen();
            }

            Expr::In { expr, ids } => {
                // Nothing can match an empty list
                if ids.is_empty() {
                    ts.push(Token::False);
                } else {
                    ts.append(&expr.to_tokens());
                    ts.space().push(Token::ParamList(ids.clone()));
                }
            }

            Expr::Paren(inner) => {
                ts.lparen();
                ts.append(&inner.to_tokens());
                ts.rparen();
            }
        }

        ts
    }

    /// Render this expression for a dialect, discarding parameter values.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens().serialize(dialect)
    }
}

fn binary_op_to_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::And => Token::And,
    }
}

// =============================================================================
// Expression Constructors
// =============================================================================

/// Create a column reference.
pub fn col(name: &str) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

/// Create a qualified column reference (table.column).
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

/// Create a string literal.
pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(s.into())
}

/// Create a bound integer parameter.
pub fn param_int(n: i64) -> Expr {
    Expr::Param(Literal::Int(n))
}

// =============================================================================
// Aggregate Functions
// =============================================================================

/// COUNT(DISTINCT expr)
pub fn count_distinct(expr: Expr) -> Expr {
    Expr::Function {
        name: "COUNT".into(),
        args: vec![expr],
        distinct: true,
    }
}

/// AVG(expr)
pub fn avg(expr: Expr) -> Expr {
    Expr::Function {
        name: "AVG".into(),
        args: vec![expr],
        distinct: false,
    }
}

/// Generic function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
        distinct: false,
    }
}

// =============================================================================
// Expression Builder Trait
// =============================================================================

/// Extension trait for building expressions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn eq(self, other: Expr) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self.into_expr()),
            op: BinaryOperator::Eq,
            right: Box::new(other),
        }
    }

    fn and(self, other: Expr) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self.into_expr()),
            op: BinaryOperator::And,
            right: Box::new(other),
        }
    }

    /// `self` is one of `ids`, bound as one list parameter.
    fn in_ids(self, ids: &[i64]) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            ids: ids.to_vec(),
        }
    }

    fn paren(self) -> Expr {
        Expr::Paren(Box::new(self.into_expr()))
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}
