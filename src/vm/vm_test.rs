// SPDX-License-Identifier: GPL-3.0-or-later

use super::*;
use crate::builtins;
use crate::bytecode::{BuiltinCall, Instruction, Program};
use crate::value::{TypeName, TypeStore, encode_i32, encode_u64};

fn run_program(program: Program) -> RunOutcome {
    run(&program, &TypeStore::new(), VmConfig::default()).expect("program runs without error")
}

#[test]
fn straight_line_program_leaves_an_empty_stack() {
    let mut program = Program::new();
    program.push(Instruction::LoadBytes(encode_i32(7).to_vec()));
    program.push(Instruction::Pop(4));

    let outcome = run_program(program);
    assert_eq!(outcome.final_stack_len, 0);
    assert_eq!(outcome.bytes_in_use, 0);
}

#[test]
fn jump_skips_instructions_between_it_and_its_target() {
    let mut program = Program::new();
    program.push(Instruction::Jump(2)); // pc 0 -> pc 2
    program.push(Instruction::LoadBytes(encode_i32(999).to_vec())); // skipped
    program.push(Instruction::LoadBytes(encode_i32(1).to_vec()));

    let outcome = run_program(program);
    assert_eq!(outcome.final_stack_len, 4);
}

#[test]
fn jump_if_false_falls_through_when_condition_is_true() {
    let mut program = Program::new();
    program.push(Instruction::LoadBytes(vec![1])); // true
    program.push(Instruction::JumpIfFalse(3));
    program.push(Instruction::LoadBytes(encode_i32(1).to_vec()));

    let outcome = run_program(program);
    assert_eq!(outcome.final_stack_len, 4);
}

#[test]
fn jump_if_false_branches_when_condition_is_false() {
    let mut program = Program::new();
    program.push(Instruction::LoadBytes(vec![0])); // false
    program.push(Instruction::JumpIfFalse(2)); // pc 1 -> pc 2... but skip pc 2's load below by targeting past it
    program.push(Instruction::LoadBytes(encode_i32(999).to_vec())); // would run if condition were true

    let outcome = run_program(program);
    assert_eq!(outcome.final_stack_len, 0);
}

#[test]
fn arithmetic_builtin_call_collapses_two_operands_into_one_result() {
    let entry = builtins::registry().resolve("+", &[TypeName::i32(), TypeName::i32()]).unwrap();

    let mut program = Program::new();
    program.push(Instruction::LoadBytes(encode_i32(3).to_vec()));
    program.push(Instruction::LoadBytes(encode_i32(4).to_vec()));
    program.push(Instruction::BuiltinCall(BuiltinCall {
        name: "+".to_string(),
        routine: entry.routine,
        args_size: 8,
    }));

    let outcome = run_program(program);
    assert_eq!(outcome.final_stack_len, 4);
}

#[test]
fn division_by_zero_surfaces_as_a_builtin_fault() {
    let entry = builtins::registry().resolve("/", &[TypeName::i32(), TypeName::i32()]).unwrap();

    let mut program = Program::new();
    program.push(Instruction::LoadBytes(encode_i32(1).to_vec()));
    program.push(Instruction::LoadBytes(encode_i32(0).to_vec()));
    program.push(Instruction::BuiltinCall(BuiltinCall {
        name: "/".to_string(),
        routine: entry.routine,
        args_size: 8,
    }));

    let err = run(&program, &TypeStore::new(), VmConfig::default()).unwrap_err();
    assert!(matches!(err, RuntimeError::Builtin { .. }));
}

#[test]
fn deallocate_rejects_a_stack_pointer() {
    let mut program = Program::new();
    program.push(Instruction::PushGlobalAddr(0));
    program.push(Instruction::Deallocate);

    let err = run(&program, &TypeStore::new(), VmConfig::default()).unwrap_err();
    assert!(matches!(err, RuntimeError::DeallocateNonHeapPointer { .. }));
}

#[test]
fn allocate_then_deallocate_leaves_nothing_in_use() {
    let mut program = Program::new();
    program.push(Instruction::LoadBytes(encode_u64(10).to_vec())); // count
    program.push(Instruction::Allocate(4)); // 10 i32 elements
    program.push(Instruction::Deallocate);

    let outcome = run_program(program);
    assert_eq!(outcome.final_stack_len, 0);
    assert_eq!(outcome.bytes_in_use, 0);
}

#[test]
fn allocate_without_a_matching_deallocate_is_reported_as_a_leak() {
    let mut program = Program::new();
    program.push(Instruction::LoadBytes(encode_u64(5).to_vec()));
    program.push(Instruction::Allocate(8));
    program.push(Instruction::Pop(8)); // drop the pointer, never freeing the block

    let outcome = run_program(program);
    assert_eq!(outcome.bytes_in_use, 48); // 5 * 8 + 8-byte size header
}

#[test]
fn modify_ptr_offsets_within_the_same_region() {
    // A struct-field-style access: take the address of local 0, step forward
    // by 4 bytes, and load a 4-byte value from there.
    let mut program = Program::new();
    program.push(Instruction::LoadBytes(encode_i32(0).to_vec())); // local @0..4, unused
    program.push(Instruction::LoadBytes(encode_i32(55).to_vec())); // local @4..8
    program.push(Instruction::PushGlobalAddr(0));
    program.push(Instruction::LoadBytes(encode_u64(4).to_vec()));
    program.push(Instruction::ModifyPtr);
    program.push(Instruction::Load(4));

    let outcome = run_program(program);
    // 8 bytes of locals + 4 bytes loaded back on top.
    assert_eq!(outcome.final_stack_len, 12);
}

#[test]
fn save_overwrites_a_local_and_balances_the_stack() {
    let mut program = Program::new();
    program.push(Instruction::LoadBytes(encode_i32(1).to_vec())); // local @0..4
    program.push(Instruction::LoadBytes(encode_i32(99).to_vec())); // value to store
    program.push(Instruction::PushGlobalAddr(0));
    program.push(Instruction::Save(4));

    let outcome = run_program(program);
    assert_eq!(outcome.final_stack_len, 4);
}

/// Builds a tiny hand-assembled "function": a single parameter is loaded
/// and returned unchanged. Exercises the frame-header convention `Save`/
/// `FunctionCall`/`Return` agree on: the compiler reserves a 16-byte
/// placeholder ahead of the arguments, and `FunctionCall` locates it by
/// walking back `args_size + 16` bytes from the top of the stack.
#[test]
fn function_call_returns_its_argument_into_the_caller_frame() {
    let mut program = Program::new();
    let header_index = program.push(Instruction::FunctionHeader(0));
    let entry_pc = program.len() as u64;
    program.push(Instruction::PushLocalAddr(16));
    program.push(Instruction::Load(4));
    program.push(Instruction::Return(4));
    let end_pc = program.len() as u64;
    program.patch(header_index, Instruction::FunctionHeader(end_pc));

    program.push(Instruction::LoadBytes(vec![0u8; 16]));
    program.push(Instruction::LoadBytes(encode_i32(42).to_vec()));
    program.push(Instruction::FunctionCall { target_pc: entry_pc, args_size: 4 });

    let outcome = run_program(program);
    assert_eq!(outcome.final_stack_len, 4);
}

#[test]
fn debug_instruction_does_not_touch_the_stack() {
    let mut program = Program::new();
    program.push(Instruction::LoadBytes(encode_i32(1).to_vec()));
    program.push(Instruction::Debug("checkpoint".to_string()));
    program.push(Instruction::Pop(4));

    let outcome = run_program(program);
    assert_eq!(outcome.final_stack_len, 0);
}
