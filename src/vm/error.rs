// SPDX-License-Identifier: GPL-3.0-or-later

use crate::bytecode::BuiltinFault;

/// A fatal runtime condition. The VM never recovers from one of these
/// itself — it bubbles the error up to the caller, which decides whether
/// to abort the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A stack `Save` would write past the end of the stack.
    StackBoundsViolation {
        /// The instruction index at which the violation was detected.
        pc: u64,
        /// The offset that would have been written past the stack end.
        offset: u64,
        /// The number of bytes the write would have touched.
        size: u64,
    },
    /// `Deallocate` was asked to free a stack pointer; only heap
    /// pointers may be freed.
    DeallocateNonHeapPointer {
        /// The instruction index at which the violation was detected.
        pc: u64,
    },
    /// A built-in routine reported a failure (e.g. division by zero).
    Builtin {
        /// The instruction index the faulting call was at.
        pc: u64,
        /// The routine's failure message.
        fault: BuiltinFault,
    },
    /// `FunctionCall` nesting exceeded `VmConfig::max_call_depth`.
    CallStackOverflow {
        /// The instruction index at which the limit was hit.
        pc: u64,
        /// The configured limit.
        limit: u64,
    },
    /// `Deallocate` freed more bytes than the allocator has outstanding —
    /// the heap's size header doesn't match any block it handed out.
    DoubleFree {
        /// The instruction index at which the violation was detected.
        pc: u64,
    },
}

impl core::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::StackBoundsViolation { pc, offset, size } => {
                write!(f, "pc {pc}: stack write of {size} bytes at offset {offset} out of bounds")
            }
            Self::DeallocateNonHeapPointer { pc } => {
                write!(f, "pc {pc}: deallocate called on a non-heap pointer")
            }
            Self::Builtin { pc, fault } => write!(f, "pc {pc}: {fault}"),
            Self::CallStackOverflow { pc, limit } => {
                write!(f, "pc {pc}: call stack exceeded the configured depth limit of {limit}")
            }
            Self::DoubleFree { pc } => {
                write!(f, "pc {pc}: deallocate freed more bytes than the allocator has outstanding")
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
