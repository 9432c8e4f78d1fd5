// SPDX-License-Identifier: GPL-3.0-or-later

//! Lowers a [`crate::ast::Stmt`] tree into a [`crate::bytecode::Program`].
//!
//! The compiler is single-pass: a function becomes callable once its
//! `FunctionDef` statement has been processed, not before. Forward
//! references between mutually recursive functions aren't supported; a
//! function may call itself since its own table entry is recorded before
//! its body is lowered.

mod error;
mod expr;
mod stmt;


pub use error::CompileError;

use std::collections::HashMap;

use crate::ast::Stmt;
use crate::bytecode::Program;
use crate::value::{TypeName, TypeStore};

#[derive(Debug, Clone)]
pub(crate) struct FunctionInfo {
    pub entry_pc: u64,
    pub return_type: TypeName,
}

#[derive(Debug, Clone)]
pub(crate) struct LocalVar {
    pub offset: u64,
    pub ty: TypeName,
}

type Scope = HashMap<String, LocalVar>;

#[derive(Debug, Default)]
pub(crate) struct LoopFrame {
    pub break_indices: Vec<usize>,
    pub continue_indices: Vec<usize>,
}

/// Mutable state threaded through lowering: the program built so far, the
/// function and type tables, the active local scopes, and the stack of
/// enclosing loops (for `break`/`continue` patching).
pub(crate) struct CompilerContext {
    pub program: Program,
    pub types: TypeStore,
    pub functions: HashMap<String, FunctionInfo>,
    pub scopes: Vec<Scope>,
    pub frame_size: u64,
    pub loop_stack: Vec<LoopFrame>,
    synthetic_counter: u64,
}

impl CompilerContext {
    fn new(types: TypeStore) -> Self {
        Self {
            program: Program::new(),
            types,
            functions: HashMap::new(),
            scopes: vec![Scope::new()],
            frame_size: 0,
            loop_stack: Vec::new(),
            synthetic_counter: 0,
        }
    }

    pub(crate) fn fresh_name(&mut self, hint: &str) -> String {
        self.synthetic_counter += 1;
        format!("__{hint}#{}", self.synthetic_counter)
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pop the innermost scope, emitting a `Pop` for the bytes it
    /// reserved so the runtime stack shrinks back to its pre-scope size.
    pub(crate) fn pop_scope_with_cleanup(&mut self) {
        let scope = self.scopes.pop().expect("scope stack underflow");
        let freed: u64 = scope.values().map(|local| self.types.size_of(&local.ty).unwrap_or(0)).sum();
        if freed > 0 {
            self.program.push(crate::bytecode::Instruction::Pop(freed));
        }
        self.frame_size -= freed;
    }

    /// Pop the innermost scope without emitting cleanup code, because the
    /// caller (a `Return`) is about to tear down the whole frame anyway.
    pub(crate) fn pop_scope_silent(&mut self) {
        let scope = self.scopes.pop().expect("scope stack underflow");
        let freed: u64 = scope.values().map(|local| self.types.size_of(&local.ty).unwrap_or(0)).sum();
        self.frame_size -= freed;
    }

    pub(crate) fn declare_local(&mut self, name: &str, ty: TypeName) -> u64 {
        let offset = self.frame_size;
        let size = self.types.size_of(&ty).unwrap_or(0);
        self.scopes
            .last_mut()
            .expect("at least one scope always open")
            .insert(name.to_string(), LocalVar { offset, ty });
        self.frame_size += size;
        offset
    }

    pub(crate) fn resolve_local(&self, name: &str) -> Option<&LocalVar> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

/// Compile a statement tree into a linear program.
///
/// `types` seeds the compiler's type store (e.g. with types the caller
/// registered ahead of time); any `struct` statements in `stmt` add to an
/// internal copy, which is not handed back to the caller.
///
/// `stmt` is lowered the same way any nested block is: a top-level `let`
/// is a local of the implicit outermost block, and its storage is popped
/// back off once that block ends, leaving the stack exactly as it was
/// before the program ran (see spec.md §8 scenario 1, `final stack
/// empty`).
///
/// # Errors
///
/// Returns [`CompileError`] on an unknown identifier, an unresolved
/// operator or built-in overload, a duplicate type name, `break`/
/// `continue` outside a loop, or a type mismatch in an assignment or
/// declaration.
pub fn compile(stmt: &Stmt, types: &TypeStore) -> Result<Program, CompileError> {
    let mut ctx = CompilerContext::new(types.clone());
    stmt::lower_stmt(&mut ctx, stmt)?;
    Ok(ctx.program)
}
