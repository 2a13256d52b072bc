use super::*;
use crate::error::ErrorKind;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .unwrap()
        .tokens
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn empty_program_is_a_single_period() {
    let kinds = kinds(".");
    assert_eq!(kinds, vec![TokenKind::Period, TokenKind::Eof]);
}

#[test]
fn keywords_take_priority_over_identifiers() {
    let kinds = kinds("begin end if then while do call const var procedure write read else odd");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Begin,
            TokenKind::End,
            TokenKind::If,
            TokenKind::Then,
            TokenKind::While,
            TokenKind::Do,
            TokenKind::Call,
            TokenKind::Const,
            TokenKind::Var,
            TokenKind::Procedure,
            TokenKind::Write,
            TokenKind::Read,
            TokenKind::Else,
            TokenKind::Odd,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn compound_operators_require_lookahead() {
    let kinds = kinds(":= <> <= >= < >");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Becomes,
            TokenKind::Neq,
            TokenKind::Leq,
            TokenKind::Geq,
            TokenKind::Lss,
            TokenKind::Gtr,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn block_comment_is_transparent() {
    let with_comment = kinds("var x; /* a comment spanning\nmultiple lines */ write x.");
    let without_comment = kinds("var x; write x.");
    assert_eq!(with_comment, without_comment);
}

#[test]
fn identifier_and_number_ids_match_canonical_table() {
    let tokens = tokenize("abc 123").unwrap().tokens;
    assert_eq!(tokens[0].kind.id(), 2);
    assert_eq!(tokens[1].kind.id(), 3);
}

#[test]
fn canonical_token_ids() {
    assert_eq!(TokenKind::Eof.id(), 1);
    assert_eq!(TokenKind::Plus.id(), 4);
    assert_eq!(TokenKind::Odd.id(), 8);
    assert_eq!(TokenKind::Eq.id(), 9);
    assert_eq!(TokenKind::LParen.id(), 15);
    assert_eq!(TokenKind::RParen.id(), 16);
    assert_eq!(TokenKind::Period.id(), 19);
    assert_eq!(TokenKind::Becomes.id(), 20);
    assert_eq!(TokenKind::Else.id(), 33);
}

#[test]
fn identifier_over_eleven_chars_is_name_too_long() {
    let err = tokenize("abcdefghijkl").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NameTooLong);
}

#[test]
fn number_over_five_digits_is_number_too_long() {
    let err = tokenize("123456").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NumberTooLong);
}

#[test]
fn digit_run_followed_by_letter_is_nonletter_var_initial() {
    let err = tokenize("12abc").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NonLetterVarInitial);
}

#[test]
fn bare_colon_is_invalid_symbol() {
    let err = tokenize("x : y").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSymbol);
}

#[test]
fn stray_character_is_invalid_symbol() {
    let err = tokenize("x @ y").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSymbol);
}

#[test]
fn blank_source_is_no_source_code() {
    let err = tokenize("   \n\t ").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoSourceCode);
}

#[test]
fn line_numbers_advance_across_newlines() {
    let tokens = tokenize("x\ny\nz").unwrap().tokens;
    assert_eq!(tokens[0].span.line, 1);
    assert_eq!(tokens[1].span.line, 2);
    assert_eq!(tokens[2].span.line, 3);
}
