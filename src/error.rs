//! Error model shared by the lexer and translator.
//!
//! Both stages abort at their first error (no recovery) and report it with
//! a source location.

use thiserror::Error;

/// A line/column location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Lexer and translator error kinds.
///
/// Translator variants carry the numeric codes from the error taxonomy;
/// `ErrorKind::code` exposes the bare integer for callers that print it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("identifier exceeds 11 characters")]
    NameTooLong,
    #[error("number exceeds 5 digits")]
    NumberTooLong,
    #[error("identifier cannot start with a digit")]
    NonLetterVarInitial,
    #[error("invalid symbol")]
    InvalidSymbol,
    #[error("no source code")]
    NoSourceCode,

    #[error("number expected after '=' in const declaration")]
    NumberExpectedAfterEq,
    #[error("'=' expected after identifier in const declaration")]
    EqExpected,
    #[error("identifier expected")]
    IdentifierExpected,
    #[error("';' expected ending declaration")]
    SemicolonExpectedDecl,
    #[error("';' expected after procedure header or body")]
    SemicolonExpectedProc,
    #[error("'.' expected at program end")]
    PeriodExpected,
    #[error("':=' expected in assignment")]
    BecomesExpected,
    #[error("identifier expected after 'call'")]
    IdentifierExpectedAfterCall,
    #[error("'then' expected")]
    ThenExpected,
    #[error("'end' expected")]
    EndExpected,
    #[error("'do' expected")]
    DoExpected,
    #[error("relational operator expected")]
    RelOpExpected,
    #[error("')' expected")]
    RightParenExpected,
    #[error("factor cannot begin with this symbol")]
    InvalidFactorStart,
    #[error("undeclared identifier")]
    UndeclaredIdentifier,
    #[error("assignment target must be a variable")]
    AssignTargetNotVar,
    #[error("'call' target must be a procedure")]
    CallTargetNotProc,
    #[error("'write'/'read' target must be a variable or constant")]
    IoTargetInvalid,

    #[error("code memory exhausted (MAX_CODE_LENGTH reached)")]
    CodeMemoryExhausted,
}

impl ErrorKind {
    /// Numeric translator error code (§7). `None` for lexer errors, which
    /// are reported by name rather than number.
    pub fn code(&self) -> Option<u8> {
        use ErrorKind::*;
        match self {
            NumberExpectedAfterEq => Some(1),
            EqExpected => Some(2),
            IdentifierExpected => Some(3),
            SemicolonExpectedDecl => Some(4),
            SemicolonExpectedProc => Some(5),
            PeriodExpected => Some(6),
            BecomesExpected => Some(7),
            IdentifierExpectedAfterCall => Some(8),
            ThenExpected => Some(9),
            EndExpected => Some(10),
            DoExpected => Some(11),
            RelOpExpected => Some(12),
            RightParenExpected => Some(13),
            InvalidFactorStart => Some(14),
            UndeclaredIdentifier => Some(15),
            AssignTargetNotVar => Some(16),
            CallTargetNotProc => Some(17),
            IoTargetInvalid => Some(18),
            _ => None,
        }
    }
}

/// A single lexer or translator failure, with the location it was detected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("line {}: {}", span.line, kind)]
pub struct AsmError {
    pub kind: ErrorKind,
    pub span: Span,
}

impl AsmError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}
