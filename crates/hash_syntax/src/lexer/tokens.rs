//! Token types for the Hash lexer.

use std::fmt;

use crate::ast::Span;

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Identifiers and Literals ==========
    Ident(String),
    /// Numeric literals are kept as written; the module system never evaluates them.
    Number(String),
    String(String),
    Char(char),

    // ========== Punctuation ==========
    ColonEq,    // :=
    ColonColon, // ::
    Colon,      // :
    Eq,         // =
    FatArrow,   // =>
    Arrow,      // ->
    Semi,
    Comma,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    /// Any other operator character (`+`, `<`, `&`, ...). Bodies are opaque so these are never
    /// interpreted beyond bracket matching.
    Op(char),

    // ========== Special ==========
    Eof,
}

impl TokenKind {
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, TokenKind::Ident(n) if n == name)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier `{name}`"),
            TokenKind::Number(n) => write!(f, "number `{n}`"),
            TokenKind::String(s) => write!(f, "string {s:?}"),
            TokenKind::Char(c) => write!(f, "char {c:?}"),
            TokenKind::ColonEq => write!(f, "`:=`"),
            TokenKind::ColonColon => write!(f, "`::`"),
            TokenKind::Colon => write!(f, "`:`"),
            TokenKind::Eq => write!(f, "`=`"),
            TokenKind::FatArrow => write!(f, "`=>`"),
            TokenKind::Arrow => write!(f, "`->`"),
            TokenKind::Semi => write!(f, "`;`"),
            TokenKind::Comma => write!(f, "`,`"),
            TokenKind::Dot => write!(f, "`.`"),
            TokenKind::LParen => write!(f, "`(`"),
            TokenKind::RParen => write!(f, "`)`"),
            TokenKind::LBracket => write!(f, "`[`"),
            TokenKind::RBracket => write!(f, "`]`"),
            TokenKind::LBrace => write!(f, "`{{`"),
            TokenKind::RBrace => write!(f, "`}}`"),
            TokenKind::Op(c) => write!(f, "`{c}`"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// A token with its kind and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Construct a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
