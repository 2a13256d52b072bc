//! # Lexer
//!
//! Tokenizes PL/0 source text via a DFA cluster: a maximal-munch
//! alphanumeric sub-automaton for identifiers and keywords, a digit
//! sub-automaton for numeric literals, and a special-symbol sub-automaton
//! for operators, punctuation, and block comments.
//!
//! Unlike a recovering lexer, this one stops at the first error (§4.1:
//! "the lexer stops at the first error and returns the partial token list
//! plus `(error_kind, line_number)`. No recovery.").

pub mod cursor;
pub mod token;

#[cfg(test)]
mod tests;

use crate::error::{AsmError, ErrorKind, Span};
use cursor::Cursor;
use token::{Token, TokenKind};

const MAX_IDENT_LEN: usize = 11;
const MAX_NUMBER_DIGITS: usize = 5;

pub struct LexResult {
    pub tokens: Vec<Token>,
}

/// Tokenize `source`, stopping at the first lexical error.
pub fn tokenize(source: &str) -> Result<LexResult, AsmError> {
    if source.trim().is_empty() {
        return Err(AsmError::new(ErrorKind::NoSourceCode, Span::new(1, 1)));
    }

    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();

    loop {
        skip_whitespace(&mut cursor);
        if cursor.is_at_end() {
            break;
        }

        let (sl, sc) = cursor.current_pos();
        let ch = cursor.peek().unwrap();

        let token = if ch.is_ascii_alphabetic() {
            lex_word(&mut cursor, sl, sc)?
        } else if ch.is_ascii_digit() {
            lex_number(&mut cursor, sl, sc)?
        } else if is_special(ch) {
            match lex_special(&mut cursor, sl, sc)? {
                Some(tok) => tok,
                None => continue, // comment consumed, no token produced
            }
        } else {
            cursor.advance();
            return Err(AsmError::new(ErrorKind::InvalidSymbol, Span::new(sl, sc)));
        };

        log::trace!("token {:?} {:?}", token.kind, token.lexeme);
        tokens.push(token);
    }

    let (el, ec) = cursor.current_pos();
    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        span: Span::new(el, ec),
    });

    Ok(LexResult { tokens })
}

fn is_special(ch: char) -> bool {
    matches!(
        ch,
        '+' | '-' | '*' | '/' | '(' | ')' | '=' | ',' | '.' | '<' | '>' | ';' | ':'
    )
}

fn skip_whitespace(cursor: &mut Cursor) {
    while matches!(cursor.peek(), Some(c) if c.is_ascii_whitespace()) {
        cursor.advance();
    }
}

fn lex_word(cursor: &mut Cursor, sl: usize, sc: usize) -> Result<Token, AsmError> {
    let mut word = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphanumeric()) {
        word.push(cursor.advance().unwrap());
        if word.len() > MAX_IDENT_LEN {
            return Err(AsmError::new(ErrorKind::NameTooLong, Span::new(sl, sc)));
        }
    }

    let kind = TokenKind::keyword(&word).unwrap_or_else(|| TokenKind::Ident(word.clone()));
    Ok(Token {
        kind,
        lexeme: word,
        span: cursor.make_span(sl, sc),
    })
}

fn lex_number(cursor: &mut Cursor, sl: usize, sc: usize) -> Result<Token, AsmError> {
    let mut digits = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
        digits.push(cursor.advance().unwrap());
        if digits.len() > MAX_NUMBER_DIGITS {
            return Err(AsmError::new(ErrorKind::NumberTooLong, Span::new(sl, sc)));
        }
    }

    if matches!(cursor.peek(), Some(c) if c.is_ascii_alphabetic()) {
        return Err(AsmError::new(
            ErrorKind::NonLetterVarInitial,
            Span::new(sl, sc),
        ));
    }

    let value: i64 = digits.parse().expect("digit run parses as i64");
    Ok(Token {
        kind: TokenKind::Number(value),
        lexeme: digits,
        span: cursor.make_span(sl, sc),
    })
}

/// Returns `None` when a block comment was consumed and produced no token.
fn lex_special(
    cursor: &mut Cursor,
    sl: usize,
    sc: usize,
) -> Result<Option<Token>, AsmError> {
    let ch = cursor.advance().unwrap();

    if ch == '/' && cursor.peek() == Some('*') {
        cursor.advance();
        loop {
            if cursor.is_at_end() {
                return Err(AsmError::new(ErrorKind::InvalidSymbol, Span::new(sl, sc)));
            }
            if cursor.peek() == Some('*') && cursor.peek_next() == Some('/') {
                cursor.advance();
                cursor.advance();
                return Ok(None);
            }
            cursor.advance();
        }
    }

    let (kind, lexeme) = match ch {
        '+' => (TokenKind::Plus, "+"),
        '-' => (TokenKind::Minus, "-"),
        '*' => (TokenKind::Star, "*"),
        '/' => (TokenKind::Slash, "/"),
        '(' => (TokenKind::LParen, "("),
        ')' => (TokenKind::RParen, ")"),
        '=' => (TokenKind::Eq, "="),
        ',' => (TokenKind::Comma, ","),
        ';' => (TokenKind::Semicolon, ";"),
        '.' => (TokenKind::Period, "."),
        '<' => match cursor.peek() {
            Some('>') => {
                cursor.advance();
                (TokenKind::Neq, "<>")
            }
            Some('=') => {
                cursor.advance();
                (TokenKind::Leq, "<=")
            }
            _ => (TokenKind::Lss, "<"),
        },
        '>' => match cursor.peek() {
            Some('=') => {
                cursor.advance();
                (TokenKind::Geq, ">=")
            }
            _ => (TokenKind::Gtr, ">"),
        },
        ':' => match cursor.peek() {
            Some('=') => {
                cursor.advance();
                (TokenKind::Becomes, ":=")
            }
            _ => return Err(AsmError::new(ErrorKind::InvalidSymbol, Span::new(sl, sc))),
        },
        _ => unreachable!("is_special guarantees one of the above"),
    };

    Ok(Some(Token {
        kind,
        lexeme: lexeme.to_string(),
        span: cursor.make_span(sl, sc),
    }))
}
