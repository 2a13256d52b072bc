//! # pl0c
//!
//! A lexer and single-pass recursive-descent translator for a PL/0-family
//! language, targeting a register-augmented stack machine.
//!
//! ## Pipeline
//!
//! 1. **Lexer** — tokenizes source text via a DFA cluster.
//! 2. **Translator** — one recursive-descent pass that interleaves parsing,
//!    symbol-table construction, and instruction emission, including
//!    patch-back for forward jumps.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pl0c::{lexer::tokenize, translator::translate};
//!
//! let source = std::fs::read_to_string("program.pl0").unwrap();
//! let lexed = tokenize(&source).expect("lexical error");
//! let translated = translate(lexed.tokens).expect("translation error");
//! println!("emitted {} instructions", translated.code.len());
//! ```

pub mod error;
pub mod lexer;
pub mod translator;
