//! # Mini-Pascal Parser
//!
//! Parses a token stream into an Abstract Syntax Tree (AST).
//!
//! ## Architecture
//!
//! A hand-written recursive-descent parser, one function per production. The
//! expression grammar is layered to encode precedence:
//!
//! - `expression`: at most one relational operator (`= <> < <= > >=`),
//!   non-associative
//! - `simple_expression`: left-associative `+ - or`
//! - `term`: left-associative `* / div mod and`
//! - `factor`: literals, variables, array elements, parenthesized expressions
//!
//! The dangling `else` binds to the nearest unmatched `if` because
//! `parse_statement` consumes an `else` greedily right after the then-branch.
//!
//! ## Error Reporting
//!
//! Parsing stops at the first violation and reports exactly one message,
//! `syntax error at '<token>', line <n>`, or `syntax error at end of input`
//! when the stream ran out. There is no recovery and no partial AST.

pub mod ast;


use crate::error::{ErrorKind, SourceError};
use crate::lexer::token::{Token, TokenKind};
use ast::{BinOp, Block, Direction, Expr, LValue, ProcDecl, Program, Stmt, Type, VarDecl};

pub fn parse(tokens: &[Token]) -> Result<Program, SourceError> {
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_program()
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    // === Token stream helpers ===

    fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| t.kind.clone())
            .unwrap_or(TokenKind::Eof)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|t| t.kind == *kind)
    }

    /// Consume the current token if it matches, otherwise fail with the
    /// standard syntax error at it.
    fn eat(&mut self, kind: TokenKind) -> Result<(), SourceError> {
        if self.check(&kind) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_here())
        }
    }

    fn expect_ident(&mut self) -> Result<String, SourceError> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error_here()),
        }
    }

    fn expect_number(&mut self) -> Result<i64, SourceError> {
        match self.peek_kind() {
            TokenKind::Number(value) => {
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.error_here()),
        }
    }

    fn error_here(&self) -> SourceError {
        self.error_at(self.pos)
    }

    fn error_at(&self, pos: usize) -> SourceError {
        match self.tokens.get(pos) {
            Some(token) if token.kind != TokenKind::Eof => SourceError::new(
                ErrorKind::Syntax,
                format!("syntax error at '{}', line {}", token.lexeme, token.line),
                token.line,
            ),
            other => {
                let line = other.map(|t| t.line).unwrap_or(1);
                SourceError::new(ErrorKind::Syntax, "syntax error at end of input", line)
            }
        }
    }

    // === Productions ===

    /// `program ID ; block .`
    fn parse_program(&mut self) -> Result<Program, SourceError> {
        self.eat(TokenKind::KwProgram)?;
        let name = self.expect_ident()?;
        self.eat(TokenKind::Semicolon)?;
        let block = self.parse_block()?;
        self.eat(TokenKind::Dot)?;
        if !self.check(&TokenKind::Eof) {
            return Err(self.error_here());
        }
        Ok(Program { name, block })
    }

    /// `declarations procedures BEGIN statements END`
    fn parse_block(&mut self) -> Result<Block, SourceError> {
        let decls = self.parse_declarations()?;
        let procs = self.parse_procedures()?;
        self.eat(TokenKind::KwBegin)?;
        let stmts = self.parse_statements()?;
        self.eat(TokenKind::KwEnd)?;
        Ok(Block {
            decls,
            procs,
            stmts,
        })
    }

    /// `VAR (id_list : type ;)+` or nothing.
    fn parse_declarations(&mut self) -> Result<Vec<VarDecl>, SourceError> {
        let mut decls = Vec::new();
        if !self.check(&TokenKind::KwVar) {
            return Ok(decls);
        }
        self.pos += 1;

        loop {
            decls.push(self.parse_var_decl()?);
            self.eat(TokenKind::Semicolon)?;
            // Another declaration line starts with an identifier; anything
            // else ends the var section.
            if !matches!(self.peek_kind(), TokenKind::Ident(_)) {
                break;
            }
        }
        Ok(decls)
    }

    /// `id_list : type`
    fn parse_var_decl(&mut self) -> Result<VarDecl, SourceError> {
        let mut names = vec![self.expect_ident()?];
        while self.check(&TokenKind::Comma) {
            self.pos += 1;
            names.push(self.expect_ident()?);
        }
        self.eat(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Ok(VarDecl { names, ty })
    }

    fn parse_type(&mut self) -> Result<Type, SourceError> {
        let ty = match self.peek_kind() {
            TokenKind::KwInteger => Type::Integer,
            TokenKind::KwBoolean => Type::Boolean,
            TokenKind::KwString => Type::String,
            TokenKind::KwReal => Type::Real,
            TokenKind::KwArray => return self.parse_array_type(),
            _ => return Err(self.error_here()),
        };
        self.pos += 1;
        Ok(ty)
    }

    /// `ARRAY [ NUMBER .. NUMBER ] OF type`
    fn parse_array_type(&mut self) -> Result<Type, SourceError> {
        self.eat(TokenKind::KwArray)?;
        self.eat(TokenKind::LBracket)?;
        let lower = self.expect_number()?;
        self.eat(TokenKind::DotDot)?;
        let upper = self.expect_number()?;
        if lower > upper {
            // Point at the upper bound that made the range empty.
            return Err(self.error_at(self.pos - 1));
        }
        self.eat(TokenKind::RBracket)?;
        self.eat(TokenKind::KwOf)?;
        // Multidimensional arrays are not supported.
        if self.check(&TokenKind::KwArray) {
            return Err(self.error_here());
        }
        let element = self.parse_type()?;
        Ok(Type::Array {
            lower,
            upper,
            element: Box::new(element),
        })
    }

    /// Zero or more `PROCEDURE ID ; declarations BEGIN statements END ;`
    fn parse_procedures(&mut self) -> Result<Vec<ProcDecl>, SourceError> {
        let mut procs = Vec::new();
        while self.check(&TokenKind::KwProcedure) {
            self.pos += 1;
            let name = self.expect_ident()?;
            self.eat(TokenKind::Semicolon)?;
            let decls = self.parse_declarations()?;
            self.eat(TokenKind::KwBegin)?;
            let stmts = self.parse_statements()?;
            self.eat(TokenKind::KwEnd)?;
            self.eat(TokenKind::Semicolon)?;
            procs.push(ProcDecl {
                name,
                decls,
                body: Stmt::Compound(stmts),
            });
        }
        Ok(procs)
    }

    /// `statement (; statement)*`
    fn parse_statements(&mut self) -> Result<Vec<Stmt>, SourceError> {
        let mut stmts = vec![self.parse_statement()?];
        while self.check(&TokenKind::Semicolon) {
            self.pos += 1;
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    fn parse_statement(&mut self) -> Result<Stmt, SourceError> {
        match self.peek_kind() {
            TokenKind::KwBegin => {
                self.pos += 1;
                let stmts = self.parse_statements()?;
                self.eat(TokenKind::KwEnd)?;
                Ok(Stmt::Compound(stmts))
            }
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwFor => self.parse_for(),
            TokenKind::KwWriteln => self.parse_writeln(),
            TokenKind::KwReadln => self.parse_readln(),
            TokenKind::Ident(_) => self.parse_assign_or_call(),
            // The empty statement: produced by `begin end`, trailing
            // semicolons, and `else`-less branches. Consumes nothing.
            _ => Ok(Stmt::Empty),
        }
    }

    /// `IF expression THEN statement [ELSE statement]`
    fn parse_if(&mut self) -> Result<Stmt, SourceError> {
        self.eat(TokenKind::KwIf)?;
        let cond = self.parse_expression()?;
        self.eat(TokenKind::KwThen)?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.check(&TokenKind::KwElse) {
            self.pos += 1;
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    /// `WHILE expression DO statement`
    fn parse_while(&mut self) -> Result<Stmt, SourceError> {
        self.eat(TokenKind::KwWhile)?;
        let cond = self.parse_expression()?;
        self.eat(TokenKind::KwDo)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While { cond, body })
    }

    /// `FOR ID := expression (TO | DOWNTO) expression DO statement`
    fn parse_for(&mut self) -> Result<Stmt, SourceError> {
        self.eat(TokenKind::KwFor)?;
        let var = self.expect_ident()?;
        self.eat(TokenKind::Assign)?;
        let from = self.parse_expression()?;
        let direction = match self.peek_kind() {
            TokenKind::KwTo => Direction::To,
            TokenKind::KwDownto => Direction::Downto,
            _ => return Err(self.error_here()),
        };
        self.pos += 1;
        let to = self.parse_expression()?;
        self.eat(TokenKind::KwDo)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For {
            var,
            from,
            to,
            direction,
            body,
        })
    }

    /// `WRITELN ( expression_list )`
    fn parse_writeln(&mut self) -> Result<Stmt, SourceError> {
        self.eat(TokenKind::KwWriteln)?;
        self.eat(TokenKind::LParen)?;
        let mut args = vec![self.parse_expression()?];
        while self.check(&TokenKind::Comma) {
            self.pos += 1;
            args.push(self.parse_expression()?);
        }
        self.eat(TokenKind::RParen)?;
        Ok(Stmt::Writeln(args))
    }

    /// `READLN ( variable )`
    fn parse_readln(&mut self) -> Result<Stmt, SourceError> {
        self.eat(TokenKind::KwReadln)?;
        self.eat(TokenKind::LParen)?;
        let target = self.parse_lvalue()?;
        self.eat(TokenKind::RParen)?;
        Ok(Stmt::Readln(target))
    }

    /// A statement starting with an identifier: `id := expr`,
    /// `id[expr] := expr`, or a bare procedure call. One token of lookahead
    /// after the identifier decides which.
    fn parse_assign_or_call(&mut self) -> Result<Stmt, SourceError> {
        let name = self.expect_ident()?;
        match self.peek_kind() {
            TokenKind::Assign => {
                self.pos += 1;
                let value = self.parse_expression()?;
                Ok(Stmt::Assign {
                    target: LValue::Var(name),
                    value,
                })
            }
            TokenKind::LBracket => {
                self.pos += 1;
                let index = self.parse_expression()?;
                self.eat(TokenKind::RBracket)?;
                self.eat(TokenKind::Assign)?;
                let value = self.parse_expression()?;
                Ok(Stmt::Assign {
                    target: LValue::ArrayElem { name, index },
                    value,
                })
            }
            // Whether the procedure exists is checked at code generation.
            _ => Ok(Stmt::Call(name)),
        }
    }

    /// `ID` or `ID [ expression ]`
    fn parse_lvalue(&mut self) -> Result<LValue, SourceError> {
        let name = self.expect_ident()?;
        if self.check(&TokenKind::LBracket) {
            self.pos += 1;
            let index = self.parse_expression()?;
            self.eat(TokenKind::RBracket)?;
            Ok(LValue::ArrayElem { name, index })
        } else {
            Ok(LValue::Var(name))
        }
    }

    // === Expressions ===

    /// `simple_expression [relop simple_expression]`, non-associative.
    fn parse_expression(&mut self) -> Result<Expr, SourceError> {
        let lhs = self.parse_simple_expression()?;
        if let Some(op) = relational_op(&self.peek_kind()) {
            self.pos += 1;
            let rhs = self.parse_simple_expression()?;
            return Ok(Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    /// `term ((+ | - | or) term)*`, left-associative.
    fn parse_simple_expression(&mut self) -> Result<Expr, SourceError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                TokenKind::KwOr => BinOp::Or,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    /// `factor ((* | / | div | mod | and) factor)*`, left-associative.
    fn parse_term(&mut self) -> Result<Expr, SourceError> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Divide,
                TokenKind::KwDiv => BinOp::IntDiv,
                TokenKind::KwMod => BinOp::Modulo,
                TokenKind::KwAnd => BinOp::And,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_factor()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> Result<Expr, SourceError> {
        match self.peek_kind() {
            TokenKind::Number(value) => {
                self.pos += 1;
                Ok(Expr::IntLit(value))
            }
            TokenKind::StrLit(value) => {
                self.pos += 1;
                Ok(Expr::StrLit(value))
            }
            TokenKind::KwTrue => {
                self.pos += 1;
                Ok(Expr::BoolLit(true))
            }
            TokenKind::KwFalse => {
                self.pos += 1;
                Ok(Expr::BoolLit(false))
            }
            TokenKind::Ident(_) => {
                let name = self.expect_ident()?;
                if self.check(&TokenKind::LBracket) {
                    self.pos += 1;
                    let index = self.parse_expression()?;
                    self.eat(TokenKind::RBracket)?;
                    Ok(Expr::ArrayElem {
                        name,
                        index: Box::new(index),
                    })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            TokenKind::LParen => {
                self.pos += 1;
                let expr = self.parse_expression()?;
                self.eat(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.error_here()),
        }
    }
}

fn relational_op(kind: &TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::Equal => BinOp::Equal,
        TokenKind::NotEqual => BinOp::NotEqual,
        TokenKind::Less => BinOp::Less,
        TokenKind::LessEqual => BinOp::LessEqual,
        TokenKind::Greater => BinOp::Greater,
        TokenKind::GreaterEqual => BinOp::GreaterEqual,
        _ => return None,
    };
    Some(op)
}
