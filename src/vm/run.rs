// SPDX-License-Identifier: GPL-3.0-or-later

use tracing::{trace, warn};

use super::context::RuntimeContext;
use super::error::RuntimeError;
use super::VmConfig;
use crate::bytecode::{Instruction, Program};
use crate::types::{Pointer, Region};
use crate::value::{TypeStore, decode_u64};

/// The result of a completed run: diagnostics, not program output (which
/// built-ins write directly to standard output as they execute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The stack's size, in bytes, when the program ran out of
    /// instructions.
    pub final_stack_len: u64,
    /// Bytes still allocated on the heap at shutdown. Nonzero indicates a
    /// leak; this is a diagnostic, not a failure of `run` itself.
    pub bytes_in_use: u64,
}

/// Execute `program` to completion.
///
/// `types` is consulted only indirectly (values are already sized by the
/// compiler; the VM itself is untyped and moves bytes around). It's taken
/// for symmetry with [`crate::compiler::compile`] and so a future
/// instruction that needs type information has somewhere to get it.
///
/// Execution starts with an empty stack, `bp = 0`, `pc = 0`, and runs
/// until `pc` falls off the end of `program` — the only terminator this
/// instruction set has, reached naturally once top-level straight-line
/// code (which skips every `FunctionHeader` it meets) runs out.
///
/// # Errors
///
/// Returns [`RuntimeError`] on a stack bounds violation, a
/// `Deallocate` of a non-heap pointer or of an already-freed block, or a
/// built-in routine fault (e.g. division by zero).
pub fn run(program: &Program, types: &TypeStore, config: VmConfig) -> Result<RunOutcome, RuntimeError> {
    let _ = types;
    let mut ctx = RuntimeContext::new(&config);

    while let Some(instruction) = program.get(ctx.pc) {
        if config.trace {
            trace!(pc = ctx.pc, bp = ctx.bp, op = %instruction, "step");
        }
        step(&mut ctx, instruction)?;
    }

    let bytes_in_use = ctx.allocator.bytes_in_use();
    if bytes_in_use > 0 {
        warn!(bytes_in_use, "heap leak at shutdown");
    }

    Ok(RunOutcome { final_stack_len: ctx.stack.len() as u64, bytes_in_use })
}

fn pop_n(stack: &mut Vec<u8>, n: usize) -> Vec<u8> {
    let start = stack.len() - n;
    stack.split_off(start)
}

fn pop_u64(stack: &mut Vec<u8>) -> u64 {
    decode_u64(&pop_n(stack, 8))
}

fn pop_ptr(stack: &mut Vec<u8>) -> Pointer {
    Pointer::from_raw(pop_u64(stack))
}

fn push_ptr(stack: &mut Vec<u8>, ptr: Pointer) {
    stack.extend_from_slice(&crate::value::encode_u64(ptr.raw()));
}

#[allow(clippy::too_many_lines)]
fn step(ctx: &mut RuntimeContext, instruction: &Instruction) -> Result<(), RuntimeError> {
    match instruction {
        Instruction::LoadBytes(bytes) => {
            ctx.stack.extend_from_slice(bytes);
            ctx.pc += 1;
        }
        Instruction::PushGlobalAddr(pos) => {
            push_ptr(&mut ctx.stack, Pointer::stack(*pos));
            ctx.pc += 1;
        }
        Instruction::PushLocalAddr(offset) => {
            push_ptr(&mut ctx.stack, Pointer::stack(ctx.bp + offset));
            ctx.pc += 1;
        }
        Instruction::ModifyPtr => {
            let offset = pop_u64(&mut ctx.stack);
            let ptr = pop_ptr(&mut ctx.stack);
            push_ptr(&mut ctx.stack, ptr.add_offset(offset));
            ctx.pc += 1;
        }
        Instruction::Load(size) => {
            let ptr = pop_ptr(&mut ctx.stack);
            let start = ptr.offset() as usize;
            let end = start + *size as usize;
            if ptr.region() == Region::Heap {
                ctx.ensure_heap_len(end as u64);
            }
            let bytes = ctx.region_buffer(ptr)[start..end].to_vec();
            ctx.stack.extend_from_slice(&bytes);
            ctx.pc += 1;
        }
        Instruction::Save(size) => {
            let ptr = pop_ptr(&mut ctx.stack);
            let value_start = ctx.stack.len() - *size as usize;
            let value = ctx.stack[value_start..].to_vec();
            let start = ptr.offset() as usize;
            let end = start + *size as usize;
            if ptr.region() == Region::Stack && end > value_start {
                return Err(RuntimeError::StackBoundsViolation {
                    pc: ctx.pc,
                    offset: ptr.offset(),
                    size: *size,
                });
            }
            if ptr.region() == Region::Heap {
                ctx.ensure_heap_len(end as u64);
            }
            ctx.region_buffer(ptr)[start..end].copy_from_slice(&value);
            ctx.stack.truncate(value_start);
            ctx.pc += 1;
        }
        Instruction::Pop(size) => {
            let new_len = ctx.stack.len() - *size as usize;
            ctx.stack.truncate(new_len);
            ctx.pc += 1;
        }
        Instruction::Allocate(elem_size) => {
            let count = pop_u64(&mut ctx.stack);
            let payload_size = count * elem_size;
            let header_offset = ctx.allocator.allocate(payload_size + 8);
            ctx.ensure_heap_len(header_offset + 8 + payload_size);
            ctx.heap[header_offset as usize..header_offset as usize + 8]
                .copy_from_slice(&crate::value::encode_u64(payload_size));
            push_ptr(&mut ctx.stack, Pointer::heap(header_offset + 8));
            ctx.pc += 1;
        }
        Instruction::Deallocate => {
            let ptr = pop_ptr(&mut ctx.stack);
            if !ptr.is_heap() {
                return Err(RuntimeError::DeallocateNonHeapPointer { pc: ctx.pc });
            }
            let header_offset = ptr.offset() - 8;
            let payload_size =
                decode_u64(&ctx.heap[header_offset as usize..header_offset as usize + 8]);
            ctx.allocator
                .deallocate(header_offset, payload_size + 8)
                .map_err(|_| RuntimeError::DoubleFree { pc: ctx.pc })?;
            ctx.pc += 1;
        }
        Instruction::Jump(delta) => {
            ctx.pc = ctx.pc.wrapping_add_signed(*delta);
        }
        Instruction::JumpIfFalse(delta) => {
            let flag = pop_n(&mut ctx.stack, 1)[0];
            if flag == 0 {
                ctx.pc = ctx.pc.wrapping_add_signed(*delta);
            } else {
                ctx.pc += 1;
            }
        }
        Instruction::FunctionHeader(jump) => {
            ctx.pc = *jump;
        }
        Instruction::FunctionCall { target_pc, args_size } => {
            if ctx.call_depth >= ctx.max_call_depth {
                return Err(RuntimeError::CallStackOverflow { pc: ctx.pc, limit: ctx.max_call_depth });
            }
            let new_bp = ctx.stack.len() as u64 - args_size - 16;
            let saved_bp = ctx.bp;
            let saved_pc = ctx.pc + 1;
            let header_start = new_bp as usize;
            ctx.stack[header_start..header_start + 8]
                .copy_from_slice(&crate::value::encode_u64(saved_bp));
            ctx.stack[header_start + 8..header_start + 16]
                .copy_from_slice(&crate::value::encode_u64(saved_pc));
            ctx.bp = new_bp;
            ctx.pc = *target_pc;
            ctx.call_depth += 1;
        }
        Instruction::Return(size) => {
            let bp = ctx.bp as usize;
            let saved_bp = decode_u64(&ctx.stack[bp..bp + 8]);
            let saved_pc = decode_u64(&ctx.stack[bp + 8..bp + 16]);
            let top_start = ctx.stack.len() - *size as usize;
            let return_bytes = ctx.stack[top_start..].to_vec();
            ctx.stack[bp..bp + *size as usize].copy_from_slice(&return_bytes);
            ctx.stack.truncate(bp + *size as usize);
            ctx.bp = saved_bp;
            ctx.pc = saved_pc;
            ctx.call_depth -= 1;
        }
        Instruction::BuiltinCall(call) => {
            (call.routine)(&mut ctx.stack, call.args_size)
                .map_err(|fault| RuntimeError::Builtin { pc: ctx.pc, fault })?;
            ctx.pc += 1;
        }
        Instruction::Debug(message) => {
            println!("{message}");
            ctx.pc += 1;
        }
    }
    Ok(())
}
