// SPDX-License-Identifier: GPL-3.0-or-later

//! [`Instruction`]: the tagged union of op-codes the VM dispatches on.

/// The signature every built-in routine satisfies: it mutates the VM's
/// byte stack in place, popping `args_size` bytes of arguments from the
/// top and pushing its encoded return value. `args_size` is carried
/// alongside the call rather than hardcoded per routine because a few
/// overloads (the `List{char,n}` string rule) accept a size that varies
/// per call site.
pub type BuiltinRoutine = fn(&mut Vec<u8>, args_size: u64) -> Result<(), BuiltinFault>;

/// A built-in routine failed (e.g. division by zero). Carried as a plain
/// message; the VM wraps it into a runtime error with the failing `pc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinFault(pub String);

impl core::fmt::Display for BuiltinFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved built-in call: the name (kept for disassembly) and the
/// routine selected by overload resolution at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinCall {
    /// The built-in's name, as written in source.
    pub name: String,
    /// The routine chosen by exact argument-type match.
    pub routine: BuiltinRoutine,
    /// Total bytes of encoded arguments already on the stack.
    pub args_size: u64,
}

/// One bytecode instruction. See the module-level table in the compiler
/// and VM designs for the effect each has on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Push these bytes verbatim.
    LoadBytes(Vec<u8>),
    /// Push a stack-region pointer at this absolute position.
    PushGlobalAddr(u64),
    /// Push a stack-region pointer at `bp + offset`.
    PushLocalAddr(u64),
    /// Pop `offset`, pop `ptr`, push `ptr + offset` (region bit preserved).
    ModifyPtr,
    /// Pop a pointer, push `size` bytes read from the region it addresses.
    Load(u64),
    /// Pop a pointer, write the top `size` bytes into the region it
    /// addresses, removing them from the stack.
    Save(u64),
    /// Drop the top `size` bytes.
    Pop(u64),
    /// Pop a `u64` count, allocate `count * elem_size + 8` bytes on the
    /// heap, write a size header, push a pointer past the header.
    Allocate(u64),
    /// Pop a heap pointer, read its size header, free it.
    Deallocate,
    /// `pc += delta`.
    Jump(i64),
    /// Pop one byte; if zero, `pc += delta`, else `pc += 1`.
    JumpIfFalse(i64),
    /// Set `pc` to `jump`, skipping a function body encountered at top
    /// level. The field is patched once the body's length is known.
    FunctionHeader(u64),
    /// Set up a call frame and jump to `target_pc`.
    FunctionCall {
        /// The callee's entry instruction index.
        target_pc: u64,
        /// Total bytes of frame header plus arguments already pushed.
        args_size: u64,
    },
    /// Tear down the current call frame, returning `size` bytes.
    Return(u64),
    /// Invoke a resolved built-in routine.
    BuiltinCall(BuiltinCall),
    /// Print a debug message; used by the compiler's `debug` mode, never
    /// emitted by ordinary compilation.
    Debug(String),
}

impl core::fmt::Display for Instruction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LoadBytes(bytes) => write!(f, "load_bytes {bytes:?}"),
            Self::PushGlobalAddr(pos) => write!(f, "push_global_addr {pos}"),
            Self::PushLocalAddr(offset) => write!(f, "push_local_addr {offset}"),
            Self::ModifyPtr => write!(f, "modify_ptr"),
            Self::Load(size) => write!(f, "load {size}"),
            Self::Save(size) => write!(f, "save {size}"),
            Self::Pop(size) => write!(f, "pop {size}"),
            Self::Allocate(elem_size) => write!(f, "allocate {elem_size}"),
            Self::Deallocate => write!(f, "deallocate"),
            Self::Jump(delta) => write!(f, "jump {delta}"),
            Self::JumpIfFalse(delta) => write!(f, "jump_if_false {delta}"),
            Self::FunctionHeader(jump) => write!(f, "function_header {jump}"),
            Self::FunctionCall { target_pc, args_size } => {
                write!(f, "function_call {target_pc} {args_size}")
            }
            Self::Return(size) => write!(f, "return {size}"),
            Self::BuiltinCall(call) => write!(f, "builtin_call {}", call.name),
            Self::Debug(message) => write!(f, "debug {message:?}"),
        }
    }
}
