//! SQL Tokens - the atomic units of SQL output.
//!
//! Tokens are dialect-agnostic representations that serialize
//! to dialect-specific strings. Bound parameters travel inside the
//! stream as [`Token::Param`] or [`Token::ParamList`] and are numbered in
//! order of appearance when the stream is rendered.

use super::dialect::{Dialect, SqlDialect};
use super::expr::Literal;

/// SQL Token - every element an aggregation statement can contain.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    And,
    As,
    On,
    Join,
    Inner,
    GroupBy,
    Distinct,
    False,

    // === Punctuation ===
    Comma,
    Dot,
    LParen,
    RParen,

    // === Operators ===
    Eq,

    // === Whitespace / Formatting ===
    Space,
    Newline,
    Indent(usize),

    // === Dynamic Content ===
    /// Simple identifier (table, column, alias)
    Ident(String),
    /// String literal
    LitString(String),
    /// Function name, rendered uppercase
    FunctionName(String),
    /// Bound parameter; rendered as the dialect's placeholder
    Param(Literal),
    /// Membership test against an id list bound as one parameter
    ParamList(Vec<i64>),
}

impl Token {
    /// Serialize this token to a string for the given dialect.
    ///
    /// A [`Token::Param`] or [`Token::ParamList`] pushes its value onto
    /// `params` and renders the placeholder for its 1-based position.
    pub fn serialize(&self, dialect: Dialect, params: &mut Vec<Literal>) -> String {
        match self {
            // Keywords
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::As => "AS".into(),
            Token::On => "ON".into(),
            Token::Join => "JOIN".into(),
            Token::Inner => "INNER".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::Distinct => "DISTINCT".into(),
            Token::False => "FALSE".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            // Operators
            Token::Eq => "=".into(),

            // Whitespace
            Token::Space => " ".into(),
            Token::Newline => "\n".into(),
            Token::Indent(n) => "  ".repeat(*n),

            // Dynamic - dialect-specific formatting
            Token::Ident(name) => dialect.quote_identifier(name),
            Token::LitString(s) => dialect.quote_string(s),
            Token::FunctionName(name) => name.to_uppercase(),
            Token::Param(value) => {
                params.push(value.clone());
                dialect.placeholder(params.len())
            }
            Token::ParamList(ids) => {
                params.push(Literal::IntList(ids.clone()));
                dialect.in_bound_list(&dialect.placeholder(params.len()))
            }
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Extend with multiple tokens.
    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Serialize all tokens to a SQL string, collecting bound parameters
    /// in placeholder order.
    pub fn render(&self, dialect: Dialect) -> (String, Vec<Literal>) {
        let mut params = Vec::new();
        let sql = self
            .tokens
            .iter()
            .map(|t| t.serialize(dialect, &mut params))
            .collect();
        (sql, params)
    }

    /// Serialize all tokens to a SQL string, discarding parameter values.
    pub fn serialize(&self, dialect: Dialect) -> String {
        self.render(dialect).0
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }
    pub fn indent(&mut self, n: usize) -> &mut Self {
        self.push(Token::Indent(n))
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
