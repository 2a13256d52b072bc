//! VM failure modes.
//!
//! The source specification leaves stack over/underflow and division by
//! zero unspecified ("implementations should treat these as fatal"); this
//! VM diagnoses them as typed errors rather than reading out of bounds or
//! panicking.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("unknown opcode {op} at pc={pc}")]
    UnknownOpcode { op: u8, pc: i64 },
    #[error("program counter {pc} out of range")]
    PcOutOfRange { pc: i64 },
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("register index {index} out of range")]
    RegisterOutOfRange { index: i64 },
    #[error("SIO_READ requested an integer but the input stream was exhausted")]
    InputExhausted,
}
