// SPDX-License-Identifier: GPL-3.0-or-later

//! The flat instruction set the compiler emits and the VM executes.

mod instruction;
mod program;

#[cfg(test)]
mod bytecode_test;

pub use instruction::{BuiltinCall, BuiltinFault, BuiltinRoutine, Instruction};
pub use program::Program;
