//! # Translator
//!
//! Single-pass recursive-descent translator: parsing, symbol-table
//! construction, and machine-code emission are interleaved in one
//! traversal of the token stream, driven directly by the grammar
//! (`program = block "." .`).
//!
//! This collapses what a multi-stage pipeline would split into separate
//! parse/resolve/encode passes into one: each grammar production both
//! consumes tokens and emits code as it recognizes them, patching forward
//! jumps once their target is known.

pub mod instruction;
pub mod symbol_table;

#[cfg(test)]
mod tests;

use crate::error::{AsmError, ErrorKind, Span};
use crate::lexer::token::{Token, TokenKind};
use instruction::{Instruction, Opcode};
use symbol_table::{Symbol, SymbolKind, SymbolTable};

/// Fixed capacity of code memory (§3 "Code memory").
pub const MAX_CODE_LENGTH: usize = 512;
/// Register file size assumed by the register-stack discipline (§4.2, §9).
pub const REGISTER_COUNT: usize = 8;

pub struct TranslateResult {
    pub code: Vec<Instruction>,
    pub symbols: SymbolTable,
}

/// Translate a token stream (as produced by [`crate::lexer::tokenize`])
/// into an instruction array and symbol table. Stops at the first error.
pub fn translate(tokens: Vec<Token>) -> Result<TranslateResult, AsmError> {
    let mut translator = Translator {
        tokens,
        pos: 0,
        code: Vec::new(),
        symbols: SymbolTable::new(),
        current_level: None,
        current_scope: None,
    };
    translator.program()?;
    Ok(TranslateResult {
        code: translator.code,
        symbols: translator.symbols,
    })
}

struct Translator {
    tokens: Vec<Token>,
    pos: usize,
    code: Vec<Instruction>,
    symbols: SymbolTable,
    /// `None` before the outermost block is entered; `Some(0)` inside it.
    current_level: Option<u32>,
    current_scope: Option<usize>,
}

impl Translator {
    fn current(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn bump(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn error(&self, kind: ErrorKind) -> AsmError {
        AsmError::new(kind, self.current_span())
    }

    fn expect(&mut self, kind: TokenKind, err: ErrorKind) -> Result<(), AsmError> {
        if *self.current() == kind {
            self.bump();
            Ok(())
        } else {
            Err(self.error(err))
        }
    }

    fn expect_ident(&mut self, err: ErrorKind) -> Result<String, AsmError> {
        match self.current().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(name)
            }
            _ => Err(self.error(err)),
        }
    }

    fn expect_number(&mut self, err: ErrorKind) -> Result<i64, AsmError> {
        match *self.current() {
            TokenKind::Number(n) => {
                self.bump();
                Ok(n)
            }
            _ => Err(self.error(err)),
        }
    }

    fn level(&self) -> u32 {
        self.current_level
            .expect("level queried outside of a block")
    }

    fn emit(&mut self, op: Opcode, r: u8, l: u32, m: i64) -> Result<usize, AsmError> {
        debug_assert!((r as usize) < REGISTER_COUNT, "register index out of range");
        if self.code.len() >= MAX_CODE_LENGTH {
            return Err(self.error(ErrorKind::CodeMemoryExhausted));
        }
        let index = self.code.len();
        log::debug!("emit[{index}] {} r={r} l={l} m={m}", op.mnemonic());
        self.code.push(Instruction::new(op, r, l, m));
        Ok(index)
    }

    fn patch(&mut self, index: usize, m: i64) {
        log::debug!("patch[{index}] m {} -> {m}", self.code[index].m);
        self.code[index].m = m;
    }

    fn here(&self) -> i64 {
        self.code.len() as i64
    }

    fn resolve(&self, name: &str) -> Result<usize, AsmError> {
        self.symbols
            .find(self.current_scope, name)
            .ok_or_else(|| self.error(ErrorKind::UndeclaredIdentifier))
    }

    fn program(&mut self) -> Result<(), AsmError> {
        self.block()?;
        self.expect(TokenKind::Period, ErrorKind::PeriodExpected)?;
        self.emit(Opcode::SioHalt, 0, 0, 3)?;
        Ok(())
    }

    fn block(&mut self) -> Result<(), AsmError> {
        self.current_level = Some(self.current_level.map_or(0, |l| l + 1));
        log::info!("entering block at level {}", self.level());

        self.emit(Opcode::Inc, 0, 0, 4)?;
        self.const_declaration()?;
        self.var_declaration()?;

        let jmp_past_procs = self.emit(Opcode::Jmp, 0, 0, 0)?;
        self.proc_declaration()?;
        self.patch(jmp_past_procs, self.here());

        self.statement(0)?;
        // The outermost block has no caller to return to: its activation
        // record's return-address/dynamic-link slots are never populated by
        // a CAL, so an RTN here would jump to PC 0 off a zero-initialized
        // stack and loop forever instead of reaching the HALT that follows.
        // Only nested procedure blocks emit RTN.
        if self.level() > 0 {
            self.emit(Opcode::Rtn, 0, 0, 0)?;
        }

        self.current_level = match self.level() {
            0 => None,
            l => Some(l - 1),
        };
        log::info!("exiting block, returning to level {:?}", self.current_level);
        Ok(())
    }

    fn const_declaration(&mut self) -> Result<(), AsmError> {
        if *self.current() != TokenKind::Const {
            return Ok(());
        }
        self.bump();
        loop {
            let name = self.expect_ident(ErrorKind::IdentifierExpected)?;
            self.expect(TokenKind::Eq, ErrorKind::EqExpected)?;
            let value = self.expect_number(ErrorKind::NumberExpectedAfterEq)?;
            self.symbols.insert(Symbol {
                kind: SymbolKind::Const,
                name,
                level: self.level(),
                scope: self.current_scope,
                value,
                address: 0,
            });
            if *self.current() == TokenKind::Comma {
                self.bump();
                continue;
            }
            break;
        }
        self.expect(TokenKind::Semicolon, ErrorKind::SemicolonExpectedDecl)
    }

    fn var_declaration(&mut self) -> Result<(), AsmError> {
        if *self.current() != TokenKind::Var {
            return Ok(());
        }
        self.bump();
        let mut count: i64 = 0;
        loop {
            count += 1;
            let name = self.expect_ident(ErrorKind::IdentifierExpected)?;
            self.symbols.insert(Symbol {
                kind: SymbolKind::Var,
                name,
                level: self.level(),
                scope: self.current_scope,
                value: 0,
                address: count + 3,
            });
            if *self.current() == TokenKind::Comma {
                self.bump();
                continue;
            }
            break;
        }
        self.expect(TokenKind::Semicolon, ErrorKind::SemicolonExpectedDecl)?;
        self.emit(Opcode::Inc, 0, 0, count)?;
        Ok(())
    }

    fn proc_declaration(&mut self) -> Result<(), AsmError> {
        while *self.current() == TokenKind::Procedure {
            self.bump();
            let name = self.expect_ident(ErrorKind::IdentifierExpected)?;
            let entry = self.here();
            let enclosing_scope = self.current_scope;
            let index = self.symbols.insert(Symbol {
                kind: SymbolKind::Proc,
                name,
                level: self.level(),
                scope: enclosing_scope,
                value: 0,
                address: entry,
            });
            self.current_scope = Some(index);
            self.expect(TokenKind::Semicolon, ErrorKind::SemicolonExpectedProc)?;
            self.block()?;
            self.expect(TokenKind::Semicolon, ErrorKind::SemicolonExpectedProc)?;
            self.current_scope = enclosing_scope;
        }
        Ok(())
    }

    fn statement(&mut self, reg: u8) -> Result<(), AsmError> {
        match self.current().clone() {
            TokenKind::Ident(name) => {
                let index = self.resolve(&name)?;
                if self.symbols.get(index).kind != SymbolKind::Var {
                    return Err(self.error(ErrorKind::AssignTargetNotVar));
                }
                self.bump();
                self.expect(TokenKind::Becomes, ErrorKind::BecomesExpected)?;
                self.expression(reg)?;
                let sym = self.symbols.get(index).clone();
                let delta = self.level() - sym.level;
                self.emit(Opcode::Sto, reg, delta, sym.address)?;
            }
            TokenKind::Call => {
                self.bump();
                let name = self.expect_ident(ErrorKind::IdentifierExpectedAfterCall)?;
                let index = self.resolve(&name)?;
                let sym = self.symbols.get(index).clone();
                if sym.kind != SymbolKind::Proc {
                    return Err(self.error(ErrorKind::CallTargetNotProc));
                }
                let delta = self.level() - sym.level;
                self.emit(Opcode::Cal, 0, delta, sym.address)?;
            }
            TokenKind::Begin => {
                self.bump();
                self.statement(reg)?;
                while *self.current() == TokenKind::Semicolon {
                    self.bump();
                    self.statement(reg)?;
                }
                self.expect(TokenKind::End, ErrorKind::EndExpected)?;
            }
            TokenKind::If => {
                self.bump();
                self.condition(reg)?;
                self.expect(TokenKind::Then, ErrorKind::ThenExpected)?;
                let jpc = self.emit(Opcode::Jpc, reg, 0, 0)?;
                self.statement(reg)?;
                self.patch(jpc, self.here());
                if *self.current() == TokenKind::Else {
                    self.bump();
                    // Redirect the pending JPC past the JMP we're about to emit.
                    self.patch(jpc, self.here() + 1);
                    let jmp = self.emit(Opcode::Jmp, 0, 0, 0)?;
                    self.statement(reg)?;
                    self.patch(jmp, self.here());
                }
            }
            TokenKind::While => {
                let head = self.here();
                self.bump();
                self.condition(reg)?;
                let jpc = self.emit(Opcode::Jpc, reg, 0, 0)?;
                self.expect(TokenKind::Do, ErrorKind::DoExpected)?;
                self.statement(reg)?;
                self.emit(Opcode::Jmp, 0, 0, head)?;
                self.patch(jpc, self.here());
            }
            TokenKind::Read => {
                self.bump();
                let name = self.expect_ident(ErrorKind::IdentifierExpected)?;
                let index = self.resolve(&name)?;
                let sym = self.symbols.get(index).clone();
                if sym.kind != SymbolKind::Var {
                    return Err(self.error(ErrorKind::AssignTargetNotVar));
                }
                self.emit(Opcode::SioRead, reg, 0, 2)?;
                let delta = self.level() - sym.level;
                self.emit(Opcode::Sto, reg, delta, sym.address)?;
            }
            TokenKind::Write => {
                self.bump();
                // `write` takes either a declared name (var/const) or a bare
                // number literal — spec.md's own if/else scenario writes a
                // literal (`write 0`) in its else branch.
                match self.current().clone() {
                    TokenKind::Ident(name) => {
                        let index = self.resolve(&name)?;
                        let sym = self.symbols.get(index).clone();
                        self.bump();
                        match sym.kind {
                            SymbolKind::Var => {
                                let delta = self.level() - sym.level;
                                self.emit(Opcode::Lod, reg, delta, sym.address)?;
                            }
                            SymbolKind::Const => {
                                self.emit(Opcode::Lit, reg, 0, sym.value)?;
                            }
                            SymbolKind::Proc => return Err(self.error(ErrorKind::IoTargetInvalid)),
                        }
                    }
                    TokenKind::Number(n) => {
                        self.bump();
                        self.emit(Opcode::Lit, reg, 0, n)?;
                    }
                    _ => return Err(self.error(ErrorKind::IdentifierExpected)),
                }
                self.emit(Opcode::SioWrite, reg, 0, 1)?;
            }
            // statement is optional in the grammar; nothing to do here.
            _ => {}
        }
        Ok(())
    }

    fn condition(&mut self, reg: u8) -> Result<(), AsmError> {
        if *self.current() == TokenKind::Odd {
            self.bump();
            self.expression(reg)?;
            self.emit(Opcode::Odd, reg, 0, 0)?;
        } else {
            self.expression(reg)?;
            let op = match self.current() {
                TokenKind::Eq => Opcode::Eql,
                TokenKind::Neq => Opcode::Neq,
                TokenKind::Lss => Opcode::Lss,
                TokenKind::Leq => Opcode::Leq,
                TokenKind::Gtr => Opcode::Gtr,
                TokenKind::Geq => Opcode::Geq,
                _ => return Err(self.error(ErrorKind::RelOpExpected)),
            };
            self.bump();
            self.expression(reg + 1)?;
            self.emit(op, reg, reg as u32, (reg + 1) as i64)?;
        }
        Ok(())
    }

    fn expression(&mut self, reg: u8) -> Result<(), AsmError> {
        let leading_minus = match self.current() {
            TokenKind::Plus => {
                self.bump();
                false
            }
            TokenKind::Minus => {
                self.bump();
                true
            }
            _ => false,
        };

        self.term(reg)?;
        if leading_minus {
            self.emit(Opcode::Neg, reg, reg as u32, 0)?;
        }

        loop {
            match self.current() {
                TokenKind::Plus => {
                    self.bump();
                    self.term(reg + 1)?;
                    self.emit(Opcode::Add, reg, reg as u32, (reg + 1) as i64)?;
                }
                TokenKind::Minus => {
                    self.bump();
                    self.term(reg + 1)?;
                    self.emit(Opcode::Sub, reg, reg as u32, (reg + 1) as i64)?;
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn term(&mut self, reg: u8) -> Result<(), AsmError> {
        self.factor(reg)?;
        loop {
            match self.current() {
                TokenKind::Star => {
                    self.bump();
                    self.factor(reg + 1)?;
                    self.emit(Opcode::Mul, reg, reg as u32, (reg + 1) as i64)?;
                }
                TokenKind::Slash => {
                    self.bump();
                    self.factor(reg + 1)?;
                    self.emit(Opcode::Div, reg, reg as u32, (reg + 1) as i64)?;
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn factor(&mut self, reg: u8) -> Result<(), AsmError> {
        match self.current().clone() {
            TokenKind::Ident(name) => {
                let index = self.resolve(&name)?;
                let sym = self.symbols.get(index).clone();
                self.bump();
                match sym.kind {
                    SymbolKind::Var => {
                        let delta = self.level() - sym.level;
                        self.emit(Opcode::Lod, reg, delta, sym.address)?;
                    }
                    SymbolKind::Const => {
                        self.emit(Opcode::Lit, reg, 0, sym.value)?;
                    }
                    // Mirrors the original toolchain's choice of error code for
                    // a procedure name used where a value is expected.
                    SymbolKind::Proc => return Err(self.error(ErrorKind::AssignTargetNotVar)),
                }
            }
            TokenKind::Number(n) => {
                self.bump();
                self.emit(Opcode::Lit, reg, 0, n)?;
            }
            TokenKind::LParen => {
                self.bump();
                self.expression(reg)?;
                self.expect(TokenKind::RParen, ErrorKind::RightParenExpected)?;
            }
            _ => return Err(self.error(ErrorKind::InvalidFactorStart)),
        }
        Ok(())
    }
}
