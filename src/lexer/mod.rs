//! # Mini-Pascal Lexer
//!
//! Tokenizes Mini-Pascal source code into a stream of tokens.
//!
//! ## Features
//!
//! - **Keywords**: case-insensitive full-word match (`BEGIN`, `Begin`,
//!   `begin` are the same token)
//! - **Identifiers**: `[A-Za-z_][A-Za-z0-9_]*`, canonicalized to lowercase
//! - **Integer Literals**: decimal digit runs; a run followed by `..` lexes
//!   as two numbers around a range operator
//! - **String Literals**: single-quoted, backslash escapes any following
//!   character (so `\'` embeds a quote); contents keep their case
//! - **Comments**: `{ ... }` and `(* ... *)`, non-nested, discarded
//! - **Operators**: two-character `:= <> <= >= ..` before their one-character
//!   prefixes
//!
//! ## Error Recovery
//!
//! An unrecognized character is recorded with its line number and the lexer
//! skips it and resumes, so a single bad character never hides later errors.
//! The driver refuses to parse when any lexical error was recorded.

pub mod cursor;
pub mod token;


use crate::error::{ErrorKind, SourceError};
use cursor::Cursor;
use token::{keyword_kind, Token, TokenKind};

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<SourceError>,
}

#[must_use]
pub fn tokenize(source: &str) -> LexResult {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    while !cursor.is_at_end() {
        match lex_token(&mut cursor) {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => {}
            Err(err) => errors.push(err),
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        line: cursor.line(),
    });

    LexResult { tokens, errors }
}

fn lex_token(cursor: &mut Cursor) -> Result<Option<Token>, SourceError> {
    // Skip whitespace; the cursor advances the line counter on '\n'.
    while matches!(cursor.peek(), Some(c) if c.is_whitespace()) {
        cursor.advance();
    }

    if cursor.is_at_end() {
        return Ok(None);
    }

    let line = cursor.line();
    let ch = cursor.peek().unwrap();

    match ch {
        '{' => lex_brace_comment(cursor, line),
        '(' if cursor.peek_next() == Some('*') => lex_paren_comment(cursor, line),
        '\'' => lex_string(cursor, line),
        c if c.is_ascii_digit() => lex_number(cursor, line),
        c if c.is_ascii_alphabetic() || c == '_' => Ok(Some(lex_word(cursor, line))),
        _ => lex_operator(cursor, line),
    }
}

fn lex_brace_comment(cursor: &mut Cursor, line: usize) -> Result<Option<Token>, SourceError> {
    cursor.advance(); // consume '{'
    loop {
        match cursor.advance() {
            Some('}') => return Ok(None),
            Some(_) => {}
            None => {
                return Err(SourceError::new(
                    ErrorKind::UnterminatedComment,
                    format!("unterminated comment, line {}", line),
                    line,
                ));
            }
        }
    }
}

fn lex_paren_comment(cursor: &mut Cursor, line: usize) -> Result<Option<Token>, SourceError> {
    cursor.advance(); // consume '('
    cursor.advance(); // consume '*'
    loop {
        match cursor.advance() {
            Some('*') if cursor.peek() == Some(')') => {
                cursor.advance();
                return Ok(None);
            }
            Some(_) => {}
            None => {
                return Err(SourceError::new(
                    ErrorKind::UnterminatedComment,
                    format!("unterminated comment, line {}", line),
                    line,
                ));
            }
        }
    }
}

fn lex_string(cursor: &mut Cursor, line: usize) -> Result<Option<Token>, SourceError> {
    cursor.advance(); // consume opening quote
    let mut contents = String::new();
    let mut raw = String::from("'");

    loop {
        match cursor.peek() {
            None | Some('\n') => {
                return Err(SourceError::new(
                    ErrorKind::UnterminatedString,
                    format!("unterminated string literal, line {}", line),
                    line,
                ));
            }
            Some('\'') => {
                cursor.advance();
                raw.push('\'');
                break;
            }
            Some('\\') => {
                cursor.advance();
                raw.push('\\');
                // A backslash escapes whatever follows, most usefully a quote.
                match cursor.peek() {
                    None | Some('\n') => {
                        return Err(SourceError::new(
                            ErrorKind::UnterminatedString,
                            format!("unterminated string literal, line {}", line),
                            line,
                        ));
                    }
                    Some(esc) => {
                        cursor.advance();
                        contents.push(esc);
                        raw.push(esc);
                    }
                }
            }
            Some(c) => {
                cursor.advance();
                contents.push(c);
                raw.push(c);
            }
        }
    }

    Ok(Some(Token {
        kind: TokenKind::StrLit(contents),
        lexeme: raw,
        line,
    }))
}

fn lex_number(cursor: &mut Cursor, line: usize) -> Result<Option<Token>, SourceError> {
    let mut digits = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
        digits.push(cursor.advance().unwrap());
    }

    let value = digits.parse::<i64>().map_err(|_| {
        SourceError::new(
            ErrorKind::InvalidNumber,
            format!("invalid integer literal '{}', line {}", digits, line),
            line,
        )
    })?;

    Ok(Some(Token {
        kind: TokenKind::Number(value),
        lexeme: digits,
        line,
    }))
}

fn lex_word(cursor: &mut Cursor, line: usize) -> Token {
    let mut word = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
        word.push(cursor.advance().unwrap());
    }

    let lower = word.to_ascii_lowercase();
    let kind = keyword_kind(&lower).unwrap_or(TokenKind::Ident(lower));

    Token {
        kind,
        lexeme: word,
        line,
    }
}

fn lex_operator(cursor: &mut Cursor, line: usize) -> Result<Option<Token>, SourceError> {
    let ch = cursor.advance().unwrap();

    // Two-character operators are decided by one character of lookahead.
    let (kind, lexeme) = match ch {
        ':' if cursor.peek() == Some('=') => {
            cursor.advance();
            (TokenKind::Assign, ":=".to_string())
        }
        '<' if cursor.peek() == Some('>') => {
            cursor.advance();
            (TokenKind::NotEqual, "<>".to_string())
        }
        '<' if cursor.peek() == Some('=') => {
            cursor.advance();
            (TokenKind::LessEqual, "<=".to_string())
        }
        '>' if cursor.peek() == Some('=') => {
            cursor.advance();
            (TokenKind::GreaterEqual, ">=".to_string())
        }
        '.' if cursor.peek() == Some('.') => {
            cursor.advance();
            (TokenKind::DotDot, "..".to_string())
        }
        '+' => (TokenKind::Plus, ch.to_string()),
        '-' => (TokenKind::Minus, ch.to_string()),
        '*' => (TokenKind::Star, ch.to_string()),
        '/' => (TokenKind::Slash, ch.to_string()),
        '=' => (TokenKind::Equal, ch.to_string()),
        '<' => (TokenKind::Less, ch.to_string()),
        '>' => (TokenKind::Greater, ch.to_string()),
        '(' => (TokenKind::LParen, ch.to_string()),
        ')' => (TokenKind::RParen, ch.to_string()),
        '[' => (TokenKind::LBracket, ch.to_string()),
        ']' => (TokenKind::RBracket, ch.to_string()),
        ':' => (TokenKind::Colon, ch.to_string()),
        ';' => (TokenKind::Semicolon, ch.to_string()),
        ',' => (TokenKind::Comma, ch.to_string()),
        '.' => (TokenKind::Dot, ch.to_string()),
        _ => {
            return Err(SourceError::new(
                ErrorKind::IllegalCharacter,
                format!("illegal character '{}', line {}", ch, line),
                line,
            ));
        }
    };

    Ok(Some(Token { kind, lexeme, line }))
}
