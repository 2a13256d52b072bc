//! # pl0vm
//!
//! Stack-machine simulator for `pl0c`-translated programs: a fetch/execute
//! loop over a register file and a call stack with a static-link chain for
//! resolving non-local variable references.
//!
//! Presentation (trace formatting, stack-dump rendering) lives outside
//! this crate's core: [`VirtualMachine::run`] returns structured
//! [`TraceEntry`] records, and a formatter (the `pl0vm` binary, or a TUI)
//! renders them.

pub mod error;


use error::VmError;
use pl0c::translator::instruction::{Instruction, Opcode};

/// Stack capacity. Not specified by the source; chosen generous enough
/// for deeply nested procedure calls.
pub const MAX_STACK: usize = 4096;
pub const REGISTER_COUNT: usize = 8;

/// One executed instruction's worth of trace data (§6 "Trace output
/// format": `# OP R L M PC BP SP STK`). `stack_dump` holds one inner
/// vector per activation record, bottom of the call chain first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub ir: usize,
    pub op: Opcode,
    pub r: u8,
    pub l: u32,
    pub m: i64,
    pub pc: i64,
    pub bp: i64,
    pub sp: i64,
    pub stack_dump: Vec<Vec<i64>>,
}

/// Everything a run of the VM produces: the values written by `SIO_WRITE`,
/// in execution order, and the per-instruction trace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VmOutcome {
    pub output: Vec<i64>,
    pub trace: Vec<TraceEntry>,
}

/// The result of a single fetch/execute cycle ([`VirtualMachine::step`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub entry: TraceEntry,
    pub output: Option<i64>,
    pub halted: bool,
}

pub struct VirtualMachine {
    code: Vec<Instruction>,
    registers: [i64; REGISTER_COUNT],
    stack: Vec<i64>,
    bp: i64,
    sp: i64,
    pc: i64,
}

impl VirtualMachine {
    pub fn new(code: Vec<Instruction>) -> Self {
        Self {
            code,
            registers: [0; REGISTER_COUNT],
            stack: vec![0; MAX_STACK],
            bp: 1,
            sp: 0,
            pc: 0,
        }
    }

    /// Run to completion (normal halt on `SIO_HALT`, or an abnormal halt
    /// surfaced as `Err`). `input` feeds `SIO_READ` in execution order.
    pub fn run(&mut self, input: &mut dyn Iterator<Item = i64>) -> Result<VmOutcome, VmError> {
        let mut outcome = VmOutcome::default();
        loop {
            let step = self.step(input)?;
            if let Some(value) = step.output {
                outcome.output.push(value);
            }
            let halted = step.halted;
            outcome.trace.push(step.entry);
            if halted {
                return Ok(outcome);
            }
        }
    }

    /// Execute exactly one fetch/execute cycle. Used by the TUI debugger
    /// to step through a program instruction by instruction.
    pub fn step(&mut self, input: &mut dyn Iterator<Item = i64>) -> Result<StepOutcome, VmError> {
        if self.pc < 0 || self.pc as usize >= self.code.len() {
            log::error!("pc {} out of range", self.pc);
            return Err(VmError::PcOutOfRange { pc: self.pc });
        }

        let ir = self.pc as usize;
        self.pc += 1;
        let instr = self.code[ir];
        log::trace!("fetch ir={ir} {instr}");

        let mut output = Vec::new();
        let halted = self.execute(instr, input, &mut output)?;

        let entry = TraceEntry {
            ir,
            op: instr.op,
            r: instr.r,
            l: instr.l,
            m: instr.m,
            pc: self.pc,
            bp: self.bp,
            sp: self.sp,
            stack_dump: self.dump_stack()?,
        };

        Ok(StepOutcome {
            entry,
            output: output.first().copied(),
            halted,
        })
    }

    fn stack_get(&self, index: i64) -> Result<i64, VmError> {
        if index < 0 {
            return Err(VmError::StackUnderflow);
        }
        self.stack
            .get(index as usize)
            .copied()
            .ok_or(VmError::StackOverflow)
    }

    fn stack_set(&mut self, index: i64, value: i64) -> Result<(), VmError> {
        if index < 0 {
            return Err(VmError::StackUnderflow);
        }
        let slot = self
            .stack
            .get_mut(index as usize)
            .ok_or(VmError::StackOverflow)?;
        *slot = value;
        Ok(())
    }

    fn register(&self, index: u32) -> Result<i64, VmError> {
        self.registers
            .get(index as usize)
            .copied()
            .ok_or(VmError::RegisterOutOfRange { index: index as i64 })
    }

    /// Walk the static-link chain `l` frames out from `self.bp`.
    fn base(&self, mut l: u32) -> Result<i64, VmError> {
        let mut b = self.bp;
        while l > 0 {
            b = self.stack_get(b + 1)?;
            l -= 1;
        }
        Ok(b)
    }

    fn execute(
        &mut self,
        instr: Instruction,
        input: &mut dyn Iterator<Item = i64>,
        output: &mut Vec<i64>,
    ) -> Result<bool, VmError> {
        use Opcode::*;
        let r = instr.r as usize;
        match instr.op {
            Lit => self.registers[r] = instr.m,
            Rtn => {
                self.sp = self.bp - 1;
                self.bp = self.stack_get(self.sp + 3)?;
                self.pc = self.stack_get(self.sp + 4)?;
            }
            Lod => {
                let base = self.base(instr.l)?;
                self.registers[r] = self.stack_get(base + instr.m)?;
            }
            Sto => {
                let base = self.base(instr.l)?;
                self.stack_set(base + instr.m, self.registers[r])?;
            }
            Cal => {
                let static_link = self.base(instr.l)?;
                self.stack_set(self.sp + 1, 0)?;
                self.stack_set(self.sp + 2, static_link)?;
                self.stack_set(self.sp + 3, self.bp)?;
                self.stack_set(self.sp + 4, self.pc)?;
                self.bp = self.sp + 1;
                self.pc = instr.m;
            }
            Inc => self.sp += instr.m,
            Jmp => self.pc = instr.m,
            Jpc => {
                if self.registers[r] == 0 {
                    self.pc = instr.m;
                }
            }
            SioWrite => {
                if instr.m == 1 {
                    output.push(self.registers[r]);
                }
            }
            SioRead => {
                if instr.m == 2 {
                    self.registers[r] = input.next().ok_or(VmError::InputExhausted)?;
                }
            }
            SioHalt => {
                if instr.m == 3 {
                    return Ok(true);
                }
            }
            Neg => self.registers[r] = -self.register(instr.l)?,
            Add => self.registers[r] = self.register(instr.l)? + self.register(instr.m as u32)?,
            Sub => self.registers[r] = self.register(instr.l)? - self.register(instr.m as u32)?,
            Mul => self.registers[r] = self.register(instr.l)? * self.register(instr.m as u32)?,
            Div => {
                let divisor = self.register(instr.m as u32)?;
                if divisor == 0 {
                    return Err(VmError::DivisionByZero);
                }
                self.registers[r] = self.register(instr.l)? / divisor;
            }
            // Supersedes the source toolchain's degenerate no-op ODD.
            Odd => self.registers[r] &= 1,
            Mod => {
                let divisor = self.register(instr.m as u32)?;
                if divisor == 0 {
                    return Err(VmError::DivisionByZero);
                }
                self.registers[r] = self.register(instr.l)? % divisor;
            }
            Eql => self.registers[r] = (self.register(instr.l)? == self.register(instr.m as u32)?) as i64,
            Neq => self.registers[r] = (self.register(instr.l)? != self.register(instr.m as u32)?) as i64,
            Lss => self.registers[r] = (self.register(instr.l)? < self.register(instr.m as u32)?) as i64,
            Leq => self.registers[r] = (self.register(instr.l)? <= self.register(instr.m as u32)?) as i64,
            Gtr => self.registers[r] = (self.register(instr.l)? > self.register(instr.m as u32)?) as i64,
            Geq => self.registers[r] = (self.register(instr.l)? >= self.register(instr.m as u32)?) as i64,
        }
        Ok(false)
    }

    /// Structured equivalent of the source's recursive `dumpStack`: one
    /// inner vector per activation record, outermost frame first.
    fn dump_stack(&self) -> Result<Vec<Vec<i64>>, VmError> {
        let mut frames = Vec::new();
        self.dump_stack_rec(self.sp, self.bp, &mut frames)?;
        Ok(frames)
    }

    fn dump_stack_rec(&self, sp: i64, bp: i64, frames: &mut Vec<Vec<i64>>) -> Result<(), VmError> {
        if bp == 0 {
            return Ok(());
        }
        if bp == 1 {
            frames.push(vec![0]);
        }
        if bp != 1 {
            let dynamic_link = self.stack_get(bp + 2)?;
            self.dump_stack_rec(bp - 1, dynamic_link, frames)?;
        }
        if bp <= sp {
            let mut frame = Vec::new();
            for i in bp..=sp {
                frame.push(self.stack_get(i)?);
            }
            frames.push(frame);
        }
        Ok(())
    }

    pub fn pc(&self) -> i64 {
        self.pc
    }

    pub fn bp(&self) -> i64 {
        self.bp
    }

    pub fn sp(&self) -> i64 {
        self.sp
    }

    pub fn registers(&self) -> &[i64; REGISTER_COUNT] {
        &self.registers
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }
}

/// Parse a whitespace-separated `op r l m` instruction stream (§6).
pub fn parse_instruction_stream(source: &str) -> Result<Vec<Instruction>, VmError> {
    let mut numbers = source.split_whitespace();
    let mut code = Vec::new();
    loop {
        let op = match numbers.next() {
            Some(tok) => tok,
            None => break,
        };
        let op: u8 = op.parse().map_err(|_| VmError::UnknownOpcode { op: 0, pc: code.len() as i64 })?;
        let r: u8 = numbers
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or(VmError::RegisterOutOfRange { index: -1 })?;
        let l: u32 = numbers
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or(VmError::PcOutOfRange { pc: -1 })?;
        let m: i64 = numbers
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or(VmError::PcOutOfRange { pc: -1 })?;
        let opcode = Opcode::from_u8(op).ok_or(VmError::UnknownOpcode { op, pc: code.len() as i64 })?;
        code.push(Instruction::new(opcode, r, l, m));
    }
    Ok(code)
}
