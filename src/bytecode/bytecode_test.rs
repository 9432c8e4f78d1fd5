// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Instruction, Program};

#[test]
fn push_returns_the_index_it_landed_at() {
    let mut program = Program::new();
    assert_eq!(program.push(Instruction::Deallocate), 0);
    assert_eq!(program.push(Instruction::Deallocate), 1);
}

#[test]
fn patch_overwrites_a_placeholder() {
    let mut program = Program::new();
    let index = program.push(Instruction::Jump(0));
    program.patch(index, Instruction::Jump(5));
    assert_eq!(program.get(index as u64), Some(&Instruction::Jump(5)));
}

#[test]
fn get_is_none_past_the_end() {
    let program = Program::new();
    assert_eq!(program.get(0), None);
}

#[test]
fn display_renders_one_line_per_instruction() {
    let mut program = Program::new();
    program.push(Instruction::Pop(4));
    program.push(Instruction::Return(0));
    let rendered = program.to_string();
    assert_eq!(rendered.lines().count(), 2);
    assert!(rendered.lines().next().unwrap().contains("pop 4"));
}
