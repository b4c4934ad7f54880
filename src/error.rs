//! Error types shared across the compilation pipeline.
//!
//! The front end (lexer, parser) reports [`SourceError`]s that carry the
//! offending line; code generation reports [`SemanticError`]s that name the
//! identifier involved. [`CompileError`] is the single type the driver and
//! library entry points surface to callers.

#[derive(Debug, Clone, PartialEq)]
pub struct SourceError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IllegalCharacter,
    UnterminatedString,
    UnterminatedComment,
    InvalidNumber,
    Syntax,
}

impl SourceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
        }
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The message already carries the line number in the format the
        // external tooling expects, so it is printed verbatim.
        f.write_str(&self.message)
    }
}

impl std::error::Error for SourceError {}

/// Errors raised while walking the AST during code generation.
///
/// These abort compilation on first occurrence; there is no recovery and no
/// error list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    UndeclaredIdentifier { name: String },
    UndeclaredProcedure { name: String },
    NotAnArray { name: String },
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticError::UndeclaredIdentifier { name } => {
                write!(f, "undeclared identifier '{}'", name)
            }
            SemanticError::UndeclaredProcedure { name } => {
                write!(f, "undeclared procedure '{}'", name)
            }
            SemanticError::NotAnArray { name } => {
                write!(f, "'{}' is not an array", name)
            }
        }
    }
}

impl std::error::Error for SemanticError {}

/// Any failure of a full compilation run.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// One or more illegal characters or malformed literals. The lexer
    /// resumes after each, so all of them are reported together.
    Lex(Vec<SourceError>),
    /// The single syntax error the parser stopped at.
    Syntax(SourceError),
    /// The semantic error code generation stopped at.
    Semantic(SemanticError),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Lex(errors) => {
                let mut first = true;
                for err in errors {
                    if !first {
                        writeln!(f)?;
                    }
                    write!(f, "{}", err)?;
                    first = false;
                }
                Ok(())
            }
            CompileError::Syntax(err) => write!(f, "{}", err),
            CompileError::Semantic(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<SemanticError> for CompileError {
    fn from(err: SemanticError) -> Self {
        CompileError::Semantic(err)
    }
}
