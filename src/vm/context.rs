// SPDX-License-Identifier: GPL-3.0-or-later

use crate::allocator::Allocator;
use crate::types::{Pointer, Region};

/// Knobs controlling one [`super::run`] invocation.
///
/// None of these change program semantics; they only affect diagnostics.
/// The CLI's `debug` mode (per-instruction tracing to standard output) is
/// out of scope here, but a caller building one can set `trace` and
/// watch the `tracing` events this crate emits.
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Emit a `tracing` event for every instruction executed, at
    /// `TRACE` level.
    pub trace: bool,
    /// Bytes to reserve up front in the stack buffer, to avoid early
    /// reallocation for programs with large frames.
    pub initial_stack_capacity: usize,
    /// Bytes to reserve up front in the heap buffer.
    pub initial_heap_capacity: usize,
    /// Maximum number of nested `FunctionCall`s before `run` gives up with
    /// [`super::RuntimeError::CallStackOverflow`], guarding against
    /// unbounded (or accidentally infinite) recursion.
    pub max_call_depth: u64,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            trace: false,
            initial_stack_capacity: 4096,
            initial_heap_capacity: 0,
            max_call_depth: 4096,
        }
    }
}

/// Program counter, base pointer, combined stack and heap storage, and
/// the allocator handle. Lifetimes: stack storage is scoped to calls;
/// heap storage is released only by explicit `delete`.
pub(crate) struct RuntimeContext {
    pub pc: u64,
    pub bp: u64,
    pub stack: Vec<u8>,
    pub heap: Vec<u8>,
    pub allocator: Allocator,
    pub call_depth: u64,
    pub max_call_depth: u64,
}

impl RuntimeContext {
    pub fn new(config: &VmConfig) -> Self {
        Self {
            pc: 0,
            bp: 0,
            stack: Vec::with_capacity(config.initial_stack_capacity),
            heap: Vec::with_capacity(config.initial_heap_capacity),
            allocator: Allocator::new(),
            call_depth: 0,
            max_call_depth: config.max_call_depth,
        }
    }

    /// The byte buffer a pointer's region bit selects.
    pub fn region_buffer(&mut self, ptr: Pointer) -> &mut Vec<u8> {
        match ptr.region() {
            Region::Stack => &mut self.stack,
            Region::Heap => &mut self.heap,
        }
    }

    /// Grow the heap buffer so it covers at least `len` bytes, zero-filled.
    pub fn ensure_heap_len(&mut self, len: u64) {
        let len = len as usize;
        if self.heap.len() < len {
            self.heap.resize(len, 0);
        }
    }
}
