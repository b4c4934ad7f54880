//! # Token Types
//!
//! Defines all token types for the Mini-Pascal source language.
//!
//! ## Token Structure
//!
//! Each token contains:
//! - `kind`: The token type (keyword, identifier, literal, operator)
//! - `lexeme`: The original text from source code, spelling preserved
//! - `line`: Source line for error reporting
//!
//! Keywords and identifiers are case-insensitive; the canonical (lowercased)
//! form lives in the `kind` payload while `lexeme` keeps what the programmer
//! wrote. String literal contents are case-sensitive and stored unquoted.

/// A single lexical token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

/// Token types for the Mini-Pascal language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Keywords ===
    KwProgram,
    KwVar,
    KwBegin,
    KwEnd,
    // Reserved by the lexer but accepted by no production; using it is a
    // syntax error.
    KwFunction,
    KwProcedure,
    KwIf,
    KwThen,
    KwElse,
    KwWhile,
    KwDo,
    KwAnd,
    KwOr,
    KwFor,
    KwTo,
    KwDownto,
    KwWriteln,
    KwReadln,
    KwInteger,
    KwBoolean,
    KwString,
    KwReal,
    KwTrue,
    KwFalse,
    KwDiv,
    KwMod,
    KwArray,
    KwOf,

    // === Identifiers & Literals ===
    Ident(String),  // lowercased
    Number(i64),    // decimal integer literal
    StrLit(String), // contents with quotes stripped, escapes resolved

    // === Operators ===
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Equal,        // =
    NotEqual,     // <>
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
    Assign,       // :=

    // === Punctuation & Structural ===
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semicolon,
    Comma,
    Dot,
    DotDot,

    Eof,
}

/// Classify a lowercased word as a keyword, if it is one.
///
/// The lexer matches the full identifier first and reclassifies afterwards,
/// so `downto` can never be split into `do` + `wnto`.
pub fn keyword_kind(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "program" => TokenKind::KwProgram,
        "var" => TokenKind::KwVar,
        "begin" => TokenKind::KwBegin,
        "end" => TokenKind::KwEnd,
        "function" => TokenKind::KwFunction,
        "procedure" => TokenKind::KwProcedure,
        "if" => TokenKind::KwIf,
        "then" => TokenKind::KwThen,
        "else" => TokenKind::KwElse,
        "while" => TokenKind::KwWhile,
        "do" => TokenKind::KwDo,
        "and" => TokenKind::KwAnd,
        "or" => TokenKind::KwOr,
        "for" => TokenKind::KwFor,
        "to" => TokenKind::KwTo,
        "downto" => TokenKind::KwDownto,
        "writeln" => TokenKind::KwWriteln,
        "readln" => TokenKind::KwReadln,
        "integer" => TokenKind::KwInteger,
        "boolean" => TokenKind::KwBoolean,
        "string" => TokenKind::KwString,
        "real" => TokenKind::KwReal,
        "true" => TokenKind::KwTrue,
        "false" => TokenKind::KwFalse,
        "div" => TokenKind::KwDiv,
        "mod" => TokenKind::KwMod,
        "array" => TokenKind::KwArray,
        "of" => TokenKind::KwOf,
        _ => return None,
    };
    Some(kind)
}
