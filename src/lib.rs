//! # Mini-Pascal Compiler
//!
//! A complete compiler for a Mini-Pascal subset targeting a stack-based
//! educational virtual machine.
//!
//! ## Pipeline
//!
//! Source text passes through four stages:
//!
//! 1. **Lexer** - Tokenizes source code into tokens (case-insensitive
//!    keywords, comments stripped)
//! 2. **Parser** - Parses tokens into an Abstract Syntax Tree (AST)
//! 3. **Semantic environment** - Symbol and procedure tables, data-segment
//!    addresses, expression types
//! 4. **Code generator** - Walks the AST and emits VM assembly with
//!    label-based control flow
//!
//! ## Example
//!
//! ```rust
//! use minipascal::{codegen::generate, lexer::tokenize, parser::parse};
//!
//! let source = "program hi; begin writeln('hello') end.";
//! let lexed = tokenize(source);
//! assert!(lexed.errors.is_empty());
//! let program = parse(&lexed.tokens).unwrap();
//! let buffer = generate(&program).unwrap();
//!
//! assert_eq!(buffer.lines(), ["PUSHS \"hello\"", "WRITES", "WRITELN", "STOP"]);
//! ```
//!
//! The [`compile`] and [`compile_file`] entry points run the whole pipeline.

pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod semantic;

use std::fs;
use std::path::Path;

use error::CompileError;

/// Compile Mini-Pascal source text into VM assembly.
///
/// Returns the rendered instruction buffer, one instruction or label per
/// line with a trailing newline. Any lexical error aborts before parsing so
/// that every offending character is reported together.
pub fn compile(source: &str) -> Result<String, CompileError> {
    let lexed = lexer::tokenize(source);
    if !lexed.errors.is_empty() {
        return Err(CompileError::Lex(lexed.errors));
    }
    let program = parser::parse(&lexed.tokens).map_err(CompileError::Syntax)?;
    let buffer = codegen::generate(&program)?;
    Ok(buffer.render())
}

/// Compile a source file and write the assembly to `output`.
///
/// Nothing is written when compilation fails, so a previous run's output is
/// never clobbered by a broken build. Errors are returned as display-ready
/// strings.
pub fn compile_file(input: &Path, output: &Path) -> Result<(), String> {
    let source = fs::read_to_string(input)
        .map_err(|err| format!("failed to read {}: {}", input.display(), err))?;
    let assembly = compile(&source).map_err(|err| err.to_string())?;
    fs::write(output, assembly)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))
}
