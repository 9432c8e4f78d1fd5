// SPDX-License-Identifier: GPL-3.0-or-later

//! The stack-machine interpreter: program counter, base pointer, a
//! combined stack and heap, and the instruction dispatch loop.

mod context;
mod error;
mod run;

#[cfg(test)]
mod vm_test;

pub use context::VmConfig;
pub use error::RuntimeError;
pub use run::{RunOutcome, run};
