//! Instruction and opcode types for the register-augmented stack machine.
//!
//! Opcode numeric values are part of the external interface (§6): the VM's
//! trace output and any external instruction-stream file depend on exactly
//! these discriminants, so they are given explicitly rather than left to
//! enum auto-numbering.

/// A single stack-machine instruction: `{op, r, l, m}`.
///
/// `r` selects a register (0-7); `l` is a lexical-level delta for memory
/// ops or a second register index for register-register ops; `m` is an
/// immediate, a code address, or a third register index depending on `op`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Opcode,
    pub r: u8,
    pub l: u32,
    pub m: i64,
}

impl Instruction {
    pub fn new(op: Opcode, r: u8, l: u32, m: i64) -> Self {
        Self { op, r, l, m }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.op as u8, self.r, self.l, self.m)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Lit = 1,
    Rtn = 2,
    Lod = 3,
    Sto = 4,
    Cal = 5,
    Inc = 6,
    Jmp = 7,
    Jpc = 8,
    SioWrite = 9,
    SioRead = 10,
    SioHalt = 11,
    Neg = 12,
    Add = 13,
    Sub = 14,
    Mul = 15,
    Div = 16,
    Odd = 17,
    Mod = 18,
    Eql = 19,
    Neq = 20,
    Lss = 21,
    Leq = 22,
    Gtr = 23,
    Geq = 24,
}

impl Opcode {
    /// Trace-output mnemonic (§6).
    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Lit => "lit",
            Rtn => "rtn",
            Lod => "lod",
            Sto => "sto",
            Cal => "cal",
            Inc => "inc",
            Jmp => "jmp",
            Jpc => "jpc",
            SioWrite | SioRead | SioHalt => "sio",
            Neg => "neg",
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            Div => "div",
            Odd => "odd",
            Mod => "mod",
            Eql => "eql",
            Neq => "neq",
            Lss => "lss",
            Leq => "leq",
            Gtr => "gtr",
            Geq => "geq",
        }
    }

    pub fn from_u8(n: u8) -> Option<Self> {
        use Opcode::*;
        Some(match n {
            1 => Lit,
            2 => Rtn,
            3 => Lod,
            4 => Sto,
            5 => Cal,
            6 => Inc,
            7 => Jmp,
            8 => Jpc,
            9 => SioWrite,
            10 => SioRead,
            11 => SioHalt,
            12 => Neg,
            13 => Add,
            14 => Sub,
            15 => Mul,
            16 => Div,
            17 => Odd,
            18 => Mod,
            19 => Eql,
            20 => Neq,
            21 => Lss,
            22 => Leq,
            23 => Gtr,
            24 => Geq,
            _ => return None,
        })
    }
}
