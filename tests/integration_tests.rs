use pl0c::lexer::tokenize;
use pl0c::translator::instruction::Opcode;
use pl0c::translator::{translate, TranslateResult};

/// Run lexer -> translator end to end, asserting no errors at either stage.
fn run_pipeline(source: &str) -> TranslateResult {
    let lexed = tokenize(source).unwrap_or_else(|err| panic!("lexer error: {err}"));
    translate(lexed.tokens).unwrap_or_else(|err| panic!("translator error: {err}"))
}

#[test]
fn empty_program_emits_prelude_return_and_halt() {
    let result = run_pipeline(".");
    let ops: Vec<_> = result.code.iter().map(|i| i.op).collect();
    // block() always emits a JMP past the procedure-declarations section,
    // even when that section is empty. The outermost block has no caller
    // to return to, so it emits no RTN and falls straight through to HALT.
    assert_eq!(ops, vec![Opcode::Inc, Opcode::Jmp, Opcode::SioHalt]);
}

#[test]
fn constant_write_emits_literal_and_write() {
    let result = run_pipeline("const a = 7; write a.");
    assert!(result.code.iter().any(|i| i.op == Opcode::Lit && i.m == 7));
    assert!(result.code.iter().any(|i| i.op == Opcode::SioWrite));
}

#[test]
fn assignment_and_arithmetic_evaluates_left_to_right_with_precedence() {
    let result = run_pipeline("var x; begin x := 2 + 3 * 4; write x end.");
    let mul_index = result.code.iter().position(|i| i.op == Opcode::Mul).unwrap();
    let add_index = result.code.iter().position(|i| i.op == Opcode::Add).unwrap();
    assert!(mul_index < add_index, "multiplication must bind tighter than addition");
}

#[test]
fn while_loop_jumps_back_to_its_head() {
    let result = run_pipeline("var i; begin i := 0; while i < 3 do i := i + 1; write i end.");
    // The block-level JMP past the (empty) procedure-declarations section
    // comes first; the loop's own back-edge JMP is the last one emitted.
    let jmp = result.code.iter().rev().find(|i| i.op == Opcode::Jmp).expect("loop-back jmp");
    assert!((jmp.m as usize) < result.code.len());
    assert_eq!(result.code[jmp.m as usize].op, Opcode::Lod);
}

#[test]
fn nested_procedure_resolves_non_local_variable_through_static_link() {
    let result = run_pipeline(
        "var x; procedure p; begin x := x + 1 end; begin x := 10; call p; write x end.",
    );
    let cal = result.code.iter().find(|i| i.op == Opcode::Cal).unwrap();
    assert_eq!(cal.l, 0, "call site is at the same level as its procedure's declaration");
    let non_local_lod = result
        .code
        .iter()
        .find(|i| i.op == Opcode::Lod && i.l == 1)
        .expect("a level-1 LOD for x inside p");
    assert_eq!(non_local_lod.m, 4, "x is the first local at offset 4 in the global frame");
}

#[test]
fn if_else_both_branches_reach_the_same_join_point() {
    let result = run_pipeline("var x; begin x := 5; if x > 3 then write x else write 0 end.");
    let jpc_index = result.code.iter().position(|i| i.op == Opcode::Jpc).unwrap();
    // Skip the block-level JMP past the (empty) procedure-declarations
    // section; the if/else's own unconditional jump is the last JMP.
    let jmp_index = result
        .code
        .iter()
        .enumerate()
        .filter(|(_, i)| i.op == Opcode::Jmp)
        .last()
        .unwrap()
        .0;
    assert_eq!(result.code[jpc_index].m as usize, jmp_index + 1);
    // The outermost block emits no RTN, so the join point falls one
    // instruction short of the end (just before the trailing HALT).
    assert_eq!(result.code[jmp_index].m as usize, result.code.len() - 1);
}

#[test]
fn no_placeholder_jumps_survive_translation() {
    for source in [
        ".",
        "const a = 7; write a.",
        "var x; begin x := 2 + 3 * 4; write x end.",
        "var i; begin i := 0; while i < 3 do i := i + 1; write i end.",
        "var x; procedure p; begin x := x + 1 end; begin x := 10; call p; write x end.",
        "var x; begin x := 5; if x > 3 then write x else write 0 end.",
    ] {
        let result = run_pipeline(source);
        for (index, instr) in result.code.iter().enumerate() {
            if matches!(instr.op, Opcode::Jmp | Opcode::Jpc) {
                assert_ne!(instr.m, 0, "instruction {index} still has a placeholder target");
            }
        }
    }
}

#[test]
fn missing_equals_in_const_declaration_is_error_two() {
    let tokens = tokenize("const a 5;").unwrap().tokens;
    let err = translate(tokens).unwrap_err();
    assert_eq!(err.kind.code(), Some(2));
}

#[test]
fn missing_period_at_program_end_is_error_six() {
    let tokens = tokenize("var x; x := 1 1").unwrap().tokens;
    let err = translate(tokens).unwrap_err();
    assert!(matches!(err.kind.code(), Some(6) | Some(14)));
}

#[test]
fn identifier_over_eleven_characters_is_name_too_long() {
    let err = tokenize("var abcdefghijkl;").unwrap_err();
    assert_eq!(err.kind, pl0c::error::ErrorKind::NameTooLong);
}

#[test]
fn number_over_five_digits_is_number_too_long() {
    let err = tokenize("const a = 123456;").unwrap_err();
    assert_eq!(err.kind, pl0c::error::ErrorKind::NumberTooLong);
}

#[test]
fn digit_run_followed_by_letter_is_nonletter_var_initial() {
    let err = tokenize("12abc").unwrap_err();
    assert_eq!(err.kind, pl0c::error::ErrorKind::NonLetterVarInitial);
}
