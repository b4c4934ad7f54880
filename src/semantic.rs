//! # Semantic Environment
//!
//! The symbol table, procedure table, and data-segment address allocator
//! shared by the code generator, plus expression type inference.
//!
//! There is a single flat scope: procedure bodies and their `var` sections
//! share the global symbol table. Addresses are handed out in declaration
//! order starting at 0 and are never reused; an array takes `upper - lower +
//! 1` contiguous slots starting at its base address.

use crate::error::SemanticError;
use crate::parser::ast::{BinOp, Expr, Type};

/// A declared variable: its base address in the data segment and its type.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub address: usize,
    pub ty: Type,
}

/// Insertion-ordered symbol table keyed by lowercased identifier.
///
/// Backed by a single `Vec<(String, Symbol)>`; lookups are O(n) linear
/// scans, which is adequate for the handful of globals a Mini-Pascal
/// program declares.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<(String, Symbol)>,
    next_address: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` with `ty`, reserving its slots.
    ///
    /// Returns the number of slots reserved, or `None` when the name was
    /// already declared: redeclaration keeps the first binding and reserves
    /// nothing.
    pub fn declare(&mut self, name: &str, ty: Type) -> Option<usize> {
        if self.get(name).is_some() {
            return None;
        }
        let size = ty.size();
        self.entries.push((
            name.to_string(),
            Symbol {
                address: self.next_address,
                ty,
            },
        ));
        self.next_address += size;
        Some(size)
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, sym)| sym)
    }

    /// Reserve one anonymous slot (for-loop limit temporaries) and return
    /// its address.
    pub fn alloc_slot(&mut self) -> usize {
        let address = self.next_address;
        self.next_address += 1;
        address
    }

    /// First data-segment address not yet reserved.
    pub fn next_address(&self) -> usize {
        self.next_address
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Procedure table keyed by lowercased name, mapping to the entry label.
///
/// A duplicate declaration rebinds the name to the newest label. Entries are
/// inserted before the body is compiled so recursion resolves, while a call
/// to a procedure declared later in the source fails.
#[derive(Debug, Clone, Default)]
pub struct ProcedureTable {
    entries: Vec<(String, String)>,
}

impl ProcedureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, label: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = label;
        } else {
            self.entries.push((name.to_string(), label));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, label)| label.as_str())
    }
}

/// Infer the semantic type of an expression.
///
/// Drives opcode selection in the code generator: real operands switch
/// arithmetic and comparisons to the F-family, and `writeln` picks its
/// output instruction per argument from this type.
///
/// Rules:
/// - literals have their obvious types
/// - variables and array elements take their declared (element) type
/// - relational and logical operators yield Boolean
/// - `+ - * /` yield Real if either operand is Real, else the left
///   operand's type
/// - `div` and `mod` always yield Integer
///
/// An unknown identifier is an error; there is no fallback.
pub fn infer_type(expr: &Expr, symbols: &SymbolTable) -> Result<Type, SemanticError> {
    match expr {
        Expr::IntLit(_) => Ok(Type::Integer),
        Expr::StrLit(_) => Ok(Type::String),
        Expr::BoolLit(_) => Ok(Type::Boolean),
        Expr::Var(name) => match symbols.get(name) {
            Some(symbol) => Ok(symbol.ty.clone()),
            None => Err(SemanticError::UndeclaredIdentifier { name: name.clone() }),
        },
        Expr::ArrayElem { name, .. } => match symbols.get(name) {
            Some(symbol) => match &symbol.ty {
                Type::Array { element, .. } => Ok((**element).clone()),
                _ => Err(SemanticError::NotAnArray { name: name.clone() }),
            },
            None => Err(SemanticError::UndeclaredIdentifier { name: name.clone() }),
        },
        Expr::Binary { op, lhs, rhs } => match op {
            BinOp::Equal
            | BinOp::NotEqual
            | BinOp::Less
            | BinOp::LessEqual
            | BinOp::Greater
            | BinOp::GreaterEqual
            | BinOp::And
            | BinOp::Or => {
                // Operand types still must resolve for the comparison to be
                // well-formed.
                infer_type(lhs, symbols)?;
                infer_type(rhs, symbols)?;
                Ok(Type::Boolean)
            }
            BinOp::IntDiv | BinOp::Modulo => {
                infer_type(lhs, symbols)?;
                infer_type(rhs, symbols)?;
                Ok(Type::Integer)
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Divide => {
                let left = infer_type(lhs, symbols)?;
                let right = infer_type(rhs, symbols)?;
                if left == Type::Real || right == Type::Real {
                    Ok(Type::Real)
                } else {
                    Ok(left)
                }
            }
        },
    }
}
