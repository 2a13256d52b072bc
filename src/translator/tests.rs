use super::*;
use crate::lexer::tokenize;

fn translate_source(source: &str) -> TranslateResult {
    let tokens = tokenize(source).expect("lex").tokens;
    translate(tokens).expect("translate")
}

fn ops(result: &TranslateResult) -> Vec<Opcode> {
    result.code.iter().map(|i| i.op).collect()
}

#[test]
fn empty_program() {
    let result = translate_source(".");
    // block() always emits a JMP past the (here, empty) procedure-declarations
    // section before the statement, even when there are no procedures. The
    // outermost block has no caller, so it emits no RTN — only nested
    // procedure blocks do.
    assert_eq!(
        ops(&result),
        vec![Opcode::Inc, Opcode::Jmp, Opcode::SioHalt]
    );
    assert_eq!(result.code[0], Instruction::new(Opcode::Inc, 0, 0, 4));
    assert_eq!(result.code[1], Instruction::new(Opcode::Jmp, 0, 0, 2));
    assert_eq!(result.code[2], Instruction::new(Opcode::SioHalt, 0, 0, 3));
}

#[test]
fn constant_write() {
    let result = translate_source("const a = 7; write a.");
    assert_eq!(
        ops(&result),
        vec![
            Opcode::Inc,
            Opcode::Jmp,
            Opcode::Lit,
            Opcode::SioWrite,
            Opcode::SioHalt
        ]
    );
    assert_eq!(result.code[2], Instruction::new(Opcode::Lit, 0, 0, 7));
}

#[test]
fn assignment_and_arithmetic() {
    let result = translate_source("var x; begin x := 2 + 3 * 4; write x end.");
    // INC(prelude) INC(var) JMP(past procs) LIT LIT LIT MUL ADD STO LOD SIO_WRITE HALT
    assert_eq!(
        ops(&result),
        vec![
            Opcode::Inc,
            Opcode::Inc,
            Opcode::Jmp,
            Opcode::Lit,
            Opcode::Lit,
            Opcode::Lit,
            Opcode::Mul,
            Opcode::Add,
            Opcode::Sto,
            Opcode::Lod,
            Opcode::SioWrite,
            Opcode::SioHalt,
        ]
    );
    let x_addr = 4; // first VAR at count+3 with count=1
    assert_eq!(result.code[8], Instruction::new(Opcode::Sto, 0, 0, x_addr));
    assert_eq!(result.code[9], Instruction::new(Opcode::Lod, 0, 0, x_addr));
}

#[test]
fn while_loop_patches_jpc_to_fallthrough() {
    let result = translate_source("var i; begin i := 0; while i < 3 do i := i + 1; write i end.");
    let jpc_index = result
        .code
        .iter()
        .position(|i| i.op == Opcode::Jpc)
        .unwrap();
    // The block-level JMP past the (empty) procedure-declarations section is
    // always emitted first; the loop's own back-edge JMP is the last one.
    let jmp_index = result
        .code
        .iter()
        .enumerate()
        .filter(|(_, i)| i.op == Opcode::Jmp)
        .last()
        .unwrap()
        .0;
    // JPC is patched to fall through to just past the loop's own JMP-to-head.
    assert_eq!(result.code[jpc_index].m as usize, jmp_index + 1);
    assert!((result.code[jmp_index].m as usize) < jpc_index);
}

#[test]
fn nested_procedure_non_local_access_uses_level_delta_one() {
    let result = translate_source(
        "var x; procedure p; begin x := x + 1 end; begin x := 10; call p; write x end.",
    );
    let lod = result
        .code
        .iter()
        .find(|i| i.op == Opcode::Lod)
        .expect("a LOD for x inside p");
    assert_eq!(lod.l, 1);
    let cal = result.code.iter().find(|i| i.op == Opcode::Cal).unwrap();
    assert_eq!(cal.l, 0);
}

#[test]
fn if_else_patches_jpc_past_the_unconditional_jump() {
    let result = translate_source("var x; begin x := 5; if x > 3 then write x else write 0 end.");
    let jpc_index = result.code.iter().position(|i| i.op == Opcode::Jpc).unwrap();
    // The block-level JMP past the (empty) procedure-declarations section
    // precedes the if/else's own unconditional jump; take the last one.
    let jmp_index = result
        .code
        .iter()
        .enumerate()
        .filter(|(_, i)| i.op == Opcode::Jmp)
        .last()
        .unwrap()
        .0;
    assert_eq!(result.code[jpc_index].m as usize, jmp_index + 1);
    assert!(result.code.iter().all(|i| i.op != Opcode::Jpc || i.m != 0));
}

#[test]
fn missing_eq_after_const_ident_is_error_two() {
    let tokens = tokenize("const a 5;").expect("lex").tokens;
    let err = translate(tokens).unwrap_err();
    assert_eq!(err.kind.code(), Some(2));
}

#[test]
fn undeclared_identifier_is_error_fifteen() {
    let tokens = tokenize("write missing.").expect("lex").tokens;
    let err = translate(tokens).unwrap_err();
    assert_eq!(err.kind.code(), Some(15));
}

#[test]
fn var_used_as_call_target_is_error_seventeen() {
    let tokens = tokenize("var x; begin call x end.").expect("lex").tokens;
    let err = translate(tokens).unwrap_err();
    assert_eq!(err.kind.code(), Some(17));
}

#[test]
fn proc_declarations_restore_enclosing_scope() {
    // Sibling procedures must each be declared in the outer (global) scope,
    // not nested inside the previous sibling.
    let source = "var x; procedure p; begin x := 1 end; procedure q; begin x := 2 end; begin call p; call q end.";
    let result = translate_source(source);
    let procs: Vec<_> = result
        .symbols
        .iter()
        .filter(|s| s.kind == symbol_table::SymbolKind::Proc)
        .collect();
    assert_eq!(procs.len(), 2);
    assert!(procs.iter().all(|s| s.scope.is_none()));
}
