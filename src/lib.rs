// SPDX-License-Identifier: GPL-3.0-or-later

//! # Flint
//!
//! Compiler and virtual machine core for a small statically-typed,
//! imperative language.
//!
//! This crate provides:
//! - A type model and byte-level value encoding (see [`value`])
//! - A flat instruction set with debug rendering (see [`bytecode`])
//! - A built-in function registry with overload resolution (see [`builtins`])
//! - A tree-to-bytecode compiler (see [`compiler`])
//! - A free-list heap allocator (see [`allocator`])
//! - A stack-machine interpreter over a combined stack+heap address space
//!   (see [`vm`])
//!
//! Lexing, parsing, the command-line driver, and type inference are out of
//! scope: this crate consumes an already-typed [`ast::Stmt`] tree and
//! produces or executes a [`bytecode::Program`]. Callers that need a front
//! end supply their own lexer/parser and build an [`ast::Stmt`] tree
//! directly.

pub mod allocator;
pub mod ast;
pub mod builtins;
pub mod bytecode;
pub mod compiler;
pub mod types;
pub mod value;
pub mod vm;

pub use ast::{Expr, Stmt};
pub use bytecode::{Instruction, Program};
pub use compiler::{CompileError, compile};
pub use types::Pointer;
pub use value::{TypeName, TypeStore};
pub use vm::{RunOutcome, RuntimeError, VmConfig};
