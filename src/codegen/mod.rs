//! # Code Generator
//!
//! Lowers a parsed program into stack-VM assembly.
//!
//! ## Emission Order
//!
//! One deterministic walk over the AST fixes the buffer layout:
//!
//! 1. Variable reservations (`PUSHN`) for the main block's declarations, so
//!    data always prefixes executable code
//! 2. Procedures in source order, each as its own reservations followed by
//!    `JUMP skip` / `label:` body `RETURN` / `skip:` so fall-through never
//!    executes a body
//! 3. The main statements
//! 4. A final `STOP`
//!
//! Expressions lower post-order: operands first, then the opcode chosen from
//! the operands' inferred types (real operands switch `+ - * / < <= > >=` to
//! the F-family; `div` and `mod` stay integer).
//!
//! ## State
//!
//! All mutable state (symbol and procedure tables, label counter, buffer)
//! lives in a [`CodeGen`] value created per compilation, so recompiling the
//! same program from fresh state reproduces the buffer exactly.
//!
//! ## Errors
//!
//! Undeclared identifiers or procedures and indexed access to scalars abort
//! the walk immediately; callers must discard the partial buffer.

pub mod instr;

#[cfg(test)]
mod tests;

use crate::error::SemanticError;
use crate::parser::ast::{
    BinOp, Direction, Expr, LValue, ProcDecl, Program, Stmt, Type, VarDecl,
};
use crate::semantic::{infer_type, ProcedureTable, SymbolTable};
use instr::{CodeBuffer, Instr};

/// Generate VM assembly for a whole program.
pub fn generate(program: &Program) -> Result<CodeBuffer, SemanticError> {
    let mut gen = CodeGen::new();
    gen.compile_program(program)?;
    Ok(gen.buffer)
}

struct CodeGen {
    symbols: SymbolTable,
    procedures: ProcedureTable,
    label_counter: usize,
    buffer: CodeBuffer,
}

impl CodeGen {
    fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            procedures: ProcedureTable::new(),
            label_counter: 0,
            buffer: CodeBuffer::new(),
        }
    }

    /// Mint a fresh label. The counter is shared across all prefixes, so
    /// every label in the buffer is unique.
    fn new_label(&mut self, prefix: &str) -> String {
        let label = format!("{}{}", prefix, self.label_counter);
        self.label_counter += 1;
        label
    }

    fn emit(&mut self, instr: Instr) {
        self.buffer.emit(instr);
    }

    fn compile_program(&mut self, program: &Program) -> Result<(), SemanticError> {
        self.declare_vars(&program.block.decls);
        for proc in &program.block.procs {
            self.compile_procedure(proc)?;
        }
        for stmt in &program.block.stmts {
            self.compile_stmt(stmt)?;
        }
        self.emit(Instr::Stop);
        Ok(())
    }

    /// Reserve data-segment slots for a `var` section. Redeclared names keep
    /// their first binding and reserve nothing.
    fn declare_vars(&mut self, decls: &[VarDecl]) {
        for decl in decls {
            for name in &decl.names {
                if let Some(size) = self.symbols.declare(name, decl.ty.clone()) {
                    self.emit(Instr::PushN(size));
                }
            }
        }
    }

    fn compile_procedure(&mut self, proc: &ProcDecl) -> Result<(), SemanticError> {
        // Procedure-local declarations live in the shared global segment;
        // their reservations land before the skip jump.
        self.declare_vars(&proc.decls);

        let proc_label = self.new_label(&format!("proc{}", proc.name));
        // The entry goes in before the body is compiled: recursion resolves,
        // calls to procedures declared later do not.
        self.procedures.insert(&proc.name, proc_label.clone());

        let skip_label = self.new_label("skipproc");
        self.emit(Instr::Jump(skip_label.clone()));
        self.emit(Instr::Label(proc_label));
        self.compile_stmt(&proc.body)?;
        self.emit(Instr::Return);
        self.emit(Instr::Label(skip_label));
        Ok(())
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Assign { target, value } => self.compile_assign(target, value),
            Stmt::Writeln(args) => self.compile_writeln(args),
            Stmt::Readln(target) => self.compile_readln(target),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => self.compile_if(cond, then_branch, else_branch.as_deref()),
            Stmt::While { cond, body } => self.compile_while(cond, body),
            Stmt::For {
                var,
                from,
                to,
                direction,
                body,
            } => self.compile_for(var, from, to, *direction, body),
            Stmt::Compound(stmts) => {
                for stmt in stmts {
                    self.compile_stmt(stmt)?;
                }
                Ok(())
            }
            Stmt::Call(name) => self.compile_call(name),
            Stmt::Empty => Ok(()),
        }
    }

    /// Value first, then the destination: `STOREG` for scalars, the address
    /// chain plus `STOREN` for array elements.
    fn compile_assign(&mut self, target: &LValue, value: &Expr) -> Result<(), SemanticError> {
        self.compile_expr(value)?;
        match target {
            LValue::Var(name) => {
                let address = self.lookup_address(name)?;
                self.emit(Instr::StoreG(address));
            }
            LValue::ArrayElem { name, index } => {
                self.compile_element_address(name, index)?;
                self.emit(Instr::StoreN);
            }
        }
        Ok(())
    }

    fn compile_writeln(&mut self, args: &[Expr]) -> Result<(), SemanticError> {
        for arg in args {
            self.compile_expr(arg)?;
            let write = match infer_type(arg, &self.symbols)? {
                Type::Integer | Type::Boolean => Instr::WriteI,
                Type::Real => Instr::WriteF,
                Type::String => Instr::WriteS,
                // Whole-array arguments degrade to an integer write of the
                // base value.
                Type::Array { .. } => Instr::WriteI,
            };
            self.emit(write);
        }
        self.emit(Instr::WriteLn);
        Ok(())
    }

    fn compile_readln(&mut self, target: &LValue) -> Result<(), SemanticError> {
        self.emit(Instr::Read);
        match target {
            LValue::Var(name) => {
                let (address, ty) = match self.symbols.get(name) {
                    Some(symbol) => (symbol.address, symbol.ty.clone()),
                    None => {
                        return Err(SemanticError::UndeclaredIdentifier { name: name.clone() });
                    }
                };
                if let Some(conv) = read_conversion(&ty) {
                    self.emit(conv);
                }
                self.emit(Instr::StoreG(address));
            }
            LValue::ArrayElem { name, index } => {
                let element = self.element_type(name)?;
                if let Some(conv) = read_conversion(&element) {
                    self.emit(conv);
                }
                self.compile_element_address(name, index)?;
                self.emit(Instr::StoreN);
            }
        }
        Ok(())
    }

    fn compile_if(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> Result<(), SemanticError> {
        self.compile_expr(cond)?;
        match else_branch {
            Some(else_branch) => {
                let else_label = self.new_label("else");
                let end_label = self.new_label("endif");
                self.emit(Instr::Jz(else_label.clone()));
                self.compile_stmt(then_branch)?;
                self.emit(Instr::Jump(end_label.clone()));
                self.emit(Instr::Label(else_label));
                self.compile_stmt(else_branch)?;
                self.emit(Instr::Label(end_label));
            }
            None => {
                let end_label = self.new_label("endif");
                self.emit(Instr::Jz(end_label.clone()));
                self.compile_stmt(then_branch)?;
                self.emit(Instr::Label(end_label));
            }
        }
        Ok(())
    }

    fn compile_while(&mut self, cond: &Expr, body: &Stmt) -> Result<(), SemanticError> {
        let start_label = self.new_label("while");
        let end_label = self.new_label("endwhile");
        self.emit(Instr::Label(start_label.clone()));
        self.compile_expr(cond)?;
        self.emit(Instr::Jz(end_label.clone()));
        self.compile_stmt(body)?;
        self.emit(Instr::Jump(start_label));
        self.emit(Instr::Label(end_label));
        Ok(())
    }

    fn compile_for(
        &mut self,
        var: &str,
        from: &Expr,
        to: &Expr,
        direction: Direction,
        body: &Stmt,
    ) -> Result<(), SemanticError> {
        let var_address = self.lookup_address(var)?;

        let start_label = self.new_label("for");
        let end_label = self.new_label("endfor");

        self.compile_expr(from)?;
        self.emit(Instr::StoreG(var_address));

        // The loop limit lives in a fresh anonymous slot, reserved mid-stream.
        let limit_address = self.symbols.alloc_slot();
        self.emit(Instr::PushN(1));
        self.compile_expr(to)?;
        self.emit(Instr::StoreG(limit_address));

        self.emit(Instr::Label(start_label.clone()));
        self.emit(Instr::PushG(var_address));
        self.emit(Instr::PushG(limit_address));
        match direction {
            Direction::To => self.emit(Instr::InfEq),
            Direction::Downto => self.emit(Instr::SupEq),
        }
        self.emit(Instr::Jz(end_label.clone()));

        self.compile_stmt(body)?;

        self.emit(Instr::PushG(var_address));
        self.emit(Instr::PushI(1));
        match direction {
            Direction::To => self.emit(Instr::Add),
            Direction::Downto => self.emit(Instr::Sub),
        }
        self.emit(Instr::StoreG(var_address));

        self.emit(Instr::Jump(start_label));
        self.emit(Instr::Label(end_label));
        Ok(())
    }

    fn compile_call(&mut self, name: &str) -> Result<(), SemanticError> {
        let label = self
            .procedures
            .get(name)
            .ok_or_else(|| SemanticError::UndeclaredProcedure {
                name: name.to_string(),
            })?
            .to_string();
        self.emit(Instr::PushA(label));
        self.emit(Instr::Call);
        Ok(())
    }

    // === Expressions ===

    fn compile_expr(&mut self, expr: &Expr) -> Result<(), SemanticError> {
        match expr {
            Expr::IntLit(value) => {
                self.emit(Instr::PushI(*value));
                Ok(())
            }
            Expr::StrLit(text) => {
                self.emit(Instr::PushS(text.clone()));
                Ok(())
            }
            Expr::BoolLit(value) => {
                self.emit(Instr::PushI(i64::from(*value)));
                Ok(())
            }
            Expr::Var(name) => {
                let address = self.lookup_address(name)?;
                self.emit(Instr::PushG(address));
                Ok(())
            }
            Expr::ArrayElem { name, index } => {
                self.compile_element_address(name, index)?;
                self.emit(Instr::LoadN);
                Ok(())
            }
            Expr::Binary { op, lhs, rhs } => self.compile_binary(*op, lhs, rhs),
        }
    }

    /// Post-order: both operands on the stack, then the opcode. The operand
    /// types picked up here decide integer vs. real instruction families.
    fn compile_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<(), SemanticError> {
        self.compile_expr(lhs)?;
        self.compile_expr(rhs)?;

        let left = infer_type(lhs, &self.symbols)?;
        let right = infer_type(rhs, &self.symbols)?;
        let real = left == Type::Real || right == Type::Real;

        match op {
            BinOp::Add => self.emit(if real { Instr::FAdd } else { Instr::Add }),
            BinOp::Sub => self.emit(if real { Instr::FSub } else { Instr::Sub }),
            BinOp::Mul => self.emit(if real { Instr::FMul } else { Instr::Mul }),
            BinOp::Divide => self.emit(if real { Instr::FDiv } else { Instr::Div }),
            BinOp::IntDiv => self.emit(Instr::Div),
            BinOp::Modulo => self.emit(Instr::Mod),
            BinOp::Equal => self.emit(Instr::Equal),
            BinOp::NotEqual => {
                self.emit(Instr::Equal);
                self.emit(Instr::Not);
            }
            BinOp::Less => self.emit(if real { Instr::FInf } else { Instr::Inf }),
            BinOp::LessEqual => self.emit(if real { Instr::FInfEq } else { Instr::InfEq }),
            BinOp::Greater => self.emit(if real { Instr::FSup } else { Instr::Sup }),
            BinOp::GreaterEqual => self.emit(if real { Instr::FSupEq } else { Instr::SupEq }),
            BinOp::And => self.emit(Instr::And),
            BinOp::Or => self.emit(Instr::Or),
        }
        Ok(())
    }

    // === Lookups and address chains ===

    fn lookup_address(&self, name: &str) -> Result<usize, SemanticError> {
        self.symbols
            .get(name)
            .map(|symbol| symbol.address)
            .ok_or_else(|| SemanticError::UndeclaredIdentifier {
                name: name.to_string(),
            })
    }

    fn element_type(&self, name: &str) -> Result<Type, SemanticError> {
        match self.symbols.get(name) {
            Some(symbol) => match &symbol.ty {
                Type::Array { element, .. } => Ok((**element).clone()),
                _ => Err(SemanticError::NotAnArray {
                    name: name.to_string(),
                }),
            },
            None => Err(SemanticError::UndeclaredIdentifier {
                name: name.to_string(),
            }),
        }
    }

    /// Leave an element's absolute address on the stack:
    /// `index; PUSHI lower; SUB; PUSHI base; ADD`.
    fn compile_element_address(&mut self, name: &str, index: &Expr) -> Result<(), SemanticError> {
        let (base, lower) = match self.symbols.get(name) {
            Some(symbol) => match &symbol.ty {
                Type::Array { lower, .. } => (symbol.address, *lower),
                _ => {
                    return Err(SemanticError::NotAnArray {
                        name: name.to_string(),
                    });
                }
            },
            None => {
                return Err(SemanticError::UndeclaredIdentifier {
                    name: name.to_string(),
                });
            }
        };

        self.compile_expr(index)?;
        self.emit(Instr::PushI(lower));
        self.emit(Instr::Sub);
        self.emit(Instr::PushI(base as i64));
        self.emit(Instr::Add);
        Ok(())
    }
}

/// Conversion applied after `READ`, per target type: `ATOI` for integers and
/// booleans, `ATOF` for reals, none for strings.
fn read_conversion(ty: &Type) -> Option<Instr> {
    match ty {
        Type::Integer | Type::Boolean => Some(Instr::AtoI),
        Type::Real => Some(Instr::AtoF),
        _ => None,
    }
}
