//! # VM Instruction Model
//!
//! The textual assembly consumed by the external stack machine, as a typed
//! instruction set plus the append-only buffer the code generator fills.
//!
//! Each buffer entry renders to exactly one output line: a label definition
//! (`endif3:`) or an uppercase mnemonic with at most one operand
//! (`PUSHI 4`, `PUSHS "hello"`, `STOP`).

use std::fmt;

/// One line of VM assembly.
///
/// Operand conventions: `PushG`/`StoreG`/`PushN` take data-segment addresses
/// or slot counts, `PushA`/`Jump`/`Jz` take label names, `PushI` takes the
/// literal. `StoreN` pops an address from the top of the stack and the value
/// beneath it; `LoadN` pops an address and pushes the value stored there.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    // Stack pushes
    PushI(i64),
    PushS(String),
    PushG(usize),
    PushN(usize),
    PushA(String),

    // Stores and indirect access
    StoreG(usize),
    StoreN,
    LoadN,

    // Integer arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Real arithmetic
    FAdd,
    FSub,
    FMul,
    FDiv,

    // Integer comparisons, pushing 0/1
    Equal,
    Inf,
    InfEq,
    Sup,
    SupEq,

    // Real comparisons
    FInf,
    FInfEq,
    FSup,
    FSupEq,

    // Logic on 0/1
    And,
    Or,
    Not,

    // Input and conversions
    Read,
    AtoI,
    AtoF,

    // Typed output
    WriteI,
    WriteF,
    WriteS,
    WriteLn,

    // Control flow
    Jump(String),
    Jz(String),
    Call,
    Return,
    Stop,

    /// A label definition line, `name:`.
    Label(String),
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::PushI(value) => write!(f, "PUSHI {}", value),
            Instr::PushS(text) => write!(f, "PUSHS \"{}\"", text),
            Instr::PushG(addr) => write!(f, "PUSHG {}", addr),
            Instr::PushN(count) => write!(f, "PUSHN {}", count),
            Instr::PushA(label) => write!(f, "PUSHA {}", label),
            Instr::StoreG(addr) => write!(f, "STOREG {}", addr),
            Instr::StoreN => f.write_str("STOREN"),
            Instr::LoadN => f.write_str("LOADN"),
            Instr::Add => f.write_str("ADD"),
            Instr::Sub => f.write_str("SUB"),
            Instr::Mul => f.write_str("MUL"),
            Instr::Div => f.write_str("DIV"),
            Instr::Mod => f.write_str("MOD"),
            Instr::FAdd => f.write_str("FADD"),
            Instr::FSub => f.write_str("FSUB"),
            Instr::FMul => f.write_str("FMUL"),
            Instr::FDiv => f.write_str("FDIV"),
            Instr::Equal => f.write_str("EQUAL"),
            Instr::Inf => f.write_str("INF"),
            Instr::InfEq => f.write_str("INFEQ"),
            Instr::Sup => f.write_str("SUP"),
            Instr::SupEq => f.write_str("SUPEQ"),
            Instr::FInf => f.write_str("FINF"),
            Instr::FInfEq => f.write_str("FINFEQ"),
            Instr::FSup => f.write_str("FSUP"),
            Instr::FSupEq => f.write_str("FSUPEQ"),
            Instr::And => f.write_str("AND"),
            Instr::Or => f.write_str("OR"),
            Instr::Not => f.write_str("NOT"),
            Instr::Read => f.write_str("READ"),
            Instr::AtoI => f.write_str("ATOI"),
            Instr::AtoF => f.write_str("ATOF"),
            Instr::WriteI => f.write_str("WRITEI"),
            Instr::WriteF => f.write_str("WRITEF"),
            Instr::WriteS => f.write_str("WRITES"),
            Instr::WriteLn => f.write_str("WRITELN"),
            Instr::Jump(label) => write!(f, "JUMP {}", label),
            Instr::Jz(label) => write!(f, "JZ {}", label),
            Instr::Call => f.write_str("CALL"),
            Instr::Return => f.write_str("RETURN"),
            Instr::Stop => f.write_str("STOP"),
            Instr::Label(name) => write!(f, "{}:", name),
        }
    }
}

/// Append-only, insertion-ordered instruction buffer.
///
/// Filled during one compilation, read-only afterwards. The external writer
/// serializes it with [`CodeBuffer::render`], one entry per line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeBuffer {
    entries: Vec<Instr>,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, instr: Instr) {
        self.entries.push(instr);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instr> {
        self.entries.iter()
    }

    /// The buffer as formatted text lines, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|i| i.to_string()).collect()
    }

    /// Render the whole buffer, one line per entry, with a trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for instr in &self.entries {
            out.push_str(&instr.to_string());
            out.push('\n');
        }
        out
    }
}
