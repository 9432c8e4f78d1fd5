// SPDX-License-Identifier: GPL-3.0-or-later

use super::expr::{lower_expr, lower_lvalue, patch_jump, patch_jump_if_false, type_of};
use super::{CompileError, CompilerContext, FunctionInfo, LoopFrame};
use crate::ast::{Expr, Stmt};
use crate::bytecode::Instruction;
use crate::value::{TypeName, encode_u64};

pub(crate) fn lower_stmt(ctx: &mut CompilerContext, stmt: &Stmt) -> Result<(), CompileError> {
    match stmt {
        Stmt::Sequence(stmts) => {
            ctx.push_scope();
            for s in stmts {
                lower_stmt(ctx, s)?;
            }
            ctx.pop_scope_with_cleanup();
            Ok(())
        }
        Stmt::Let { name, value } => {
            let ty = lower_expr(ctx, value)?;
            ctx.declare_local(name, ty);
            Ok(())
        }
        Stmt::Assign { target, value } => {
            let value_ty = lower_expr(ctx, value)?;
            let target_ty = lower_lvalue(ctx, target)?;
            if value_ty != target_ty {
                return Err(CompileError::TypeMismatch { expected: target_ty, found: value_ty });
            }
            let size = ctx.types.size_of(&target_ty)?;
            ctx.program.push(Instruction::Save(size));
            Ok(())
        }
        Stmt::If { cond, then_branch, else_branch } => lower_if(ctx, cond, then_branch, else_branch.as_deref()),
        Stmt::While { cond, body } => lower_while(ctx, cond, body),
        Stmt::For { var, list, body } => lower_for(ctx, var, list, body),
        Stmt::Break => {
            let index = ctx.program.push(Instruction::Jump(0));
            let frame = ctx.loop_stack.last_mut().ok_or(CompileError::BreakOutsideLoop)?;
            frame.break_indices.push(index);
            Ok(())
        }
        Stmt::Continue => {
            let index = ctx.program.push(Instruction::Jump(0));
            let frame = ctx.loop_stack.last_mut().ok_or(CompileError::ContinueOutsideLoop)?;
            frame.continue_indices.push(index);
            Ok(())
        }
        Stmt::Struct { name, fields, methods } => {
            ctx.types.add(name, fields.clone())?;
            for method in methods {
                lower_stmt(ctx, method)?;
            }
            Ok(())
        }
        Stmt::FunctionDef { name, params, return_type, body } => {
            lower_function_def(ctx, name, params, return_type, body)
        }
        Stmt::Return(value) => {
            let ty = lower_expr(ctx, value)?;
            let size = ctx.types.size_of(&ty)?;
            ctx.program.push(Instruction::Return(size));
            Ok(())
        }
        Stmt::ExprStmt(expr) => {
            let ty = lower_expr(ctx, expr)?;
            let size = ctx.types.size_of(&ty)?;
            if size > 0 {
                ctx.program.push(Instruction::Pop(size));
            }
            Ok(())
        }
        Stmt::Delete(expr) => {
            lower_expr(ctx, expr)?;
            ctx.program.push(Instruction::Deallocate);
            Ok(())
        }
    }
}

fn lower_if(
    ctx: &mut CompilerContext,
    cond: &Expr,
    then_branch: &Stmt,
    else_branch: Option<&Stmt>,
) -> Result<(), CompileError> {
    lower_expr(ctx, cond)?;
    let jf_index = ctx.program.push(Instruction::JumpIfFalse(0));
    lower_stmt(ctx, then_branch)?;

    if let Some(else_stmt) = else_branch {
        let jmp_index = ctx.program.push(Instruction::Jump(0));
        let else_start = ctx.program.len();
        patch_jump_if_false(ctx, jf_index, else_start);
        lower_stmt(ctx, else_stmt)?;
        let end = ctx.program.len();
        patch_jump(ctx, jmp_index, end);
    } else {
        let end = ctx.program.len();
        patch_jump_if_false(ctx, jf_index, end);
    }
    Ok(())
}

fn lower_while(ctx: &mut CompilerContext, cond: &Expr, body: &Stmt) -> Result<(), CompileError> {
    let begin_pc = ctx.program.len();
    lower_expr(ctx, cond)?;
    let jf_index = ctx.program.push(Instruction::JumpIfFalse(0));

    ctx.loop_stack.push(LoopFrame { break_indices: Vec::new(), continue_indices: Vec::new() });
    lower_stmt(ctx, body)?;
    let frame = ctx.loop_stack.pop().expect("pushed just above");

    let back_index = ctx.program.push(Instruction::Jump(0));
    patch_jump(ctx, back_index, begin_pc);
    let end_pc = ctx.program.len();
    patch_jump_if_false(ctx, jf_index, end_pc);

    for index in frame.break_indices {
        patch_jump(ctx, index, end_pc);
    }
    for index in frame.continue_indices {
        patch_jump(ctx, index, begin_pc);
    }
    Ok(())
}

/// Desugars to indexed iteration over a hidden counter local, reusing
/// `Let`/`While`/`Assign`/`Subscript` lowering wholesale: the element
/// count is always known at compile time from the list's type, so there
/// is no dedicated loop op-code.
fn lower_for(ctx: &mut CompilerContext, var: &str, list: &Expr, body: &Stmt) -> Result<(), CompileError> {
    let list_ty = type_of(ctx, list)?;
    let TypeName::List { count, .. } = list_ty else {
        return Err(CompileError::NotAList(list_ty));
    };

    // Bind the list to a hidden local once, rather than splicing `list`
    // into the subscript base directly: the base of a `Subscript` must be
    // an lvalue, and re-lowering an arbitrary expression on every
    // iteration would both reject non-lvalue lists (e.g. a list literal)
    // and re-evaluate any side effect in `list` once per element.
    let list_name = ctx.fresh_name("for_list");
    let idx_name = ctx.fresh_name("for_idx");
    let desugared = Stmt::Sequence(vec![
        Stmt::Let { name: list_name.clone(), value: list.clone() },
        Stmt::Let { name: idx_name.clone(), value: Expr::literal(TypeName::u64(), encode_u64(0).to_vec()) },
        Stmt::While {
            cond: Expr::binary(
                "<",
                Expr::variable(idx_name.clone()),
                Expr::literal(TypeName::u64(), encode_u64(count).to_vec()),
            ),
            body: Box::new(Stmt::Sequence(vec![
                Stmt::Let {
                    name: var.to_string(),
                    value: Expr::Subscript {
                        base: Box::new(Expr::variable(list_name.clone())),
                        index: Box::new(Expr::variable(idx_name.clone())),
                    },
                },
                body.clone(),
                Stmt::Assign {
                    target: Expr::variable(idx_name.clone()),
                    value: Expr::binary(
                        "+",
                        Expr::variable(idx_name.clone()),
                        Expr::literal(TypeName::u64(), encode_u64(1).to_vec()),
                    ),
                },
            ])),
        },
    ]);
    lower_stmt(ctx, &desugared)
}

fn lower_function_def(
    ctx: &mut CompilerContext,
    name: &str,
    params: &[(String, TypeName)],
    return_type: &TypeName,
    body: &Stmt,
) -> Result<(), CompileError> {
    let header_index = ctx.program.push(Instruction::FunctionHeader(0));
    let entry_pc = ctx.program.len() as u64;

    ctx.functions.insert(
        name.to_string(),
        FunctionInfo { entry_pc, return_type: return_type.clone() },
    );

    let saved_scopes = core::mem::replace(&mut ctx.scopes, vec![super::Scope::new()]);
    let saved_frame_size = core::mem::replace(&mut ctx.frame_size, 16);
    let saved_loops = core::mem::take(&mut ctx.loop_stack);

    for (param_name, param_ty) in params {
        ctx.declare_local(param_name, param_ty.clone());
    }

    lower_function_body(ctx, body)?;

    if !ends_in_return(body) {
        if *return_type == TypeName::null() {
            ctx.program.push(Instruction::LoadBytes(crate::value::encode_null().to_vec()));
        }
        let size = ctx.types.size_of(return_type)?;
        ctx.program.push(Instruction::Return(size));
    }

    ctx.scopes = saved_scopes;
    ctx.frame_size = saved_frame_size;
    ctx.loop_stack = saved_loops;

    let end_pc = ctx.program.len() as u64;
    ctx.program.patch(header_index, Instruction::FunctionHeader(end_pc));
    Ok(())
}

/// Lower a function's outermost body block. A `Return` always discards
/// every byte above `bp` down to its own result bytes, so this scope
/// never needs the ordinary scope-exit `Pop` that `Stmt::Sequence` would
/// otherwise emit right before it (whether that `Return` is the body's own
/// last statement or the implicit one `lower_function_def` appends) —
/// `pop_scope_silent` tears the scope down without emitting it.
fn lower_function_body(ctx: &mut CompilerContext, body: &Stmt) -> Result<(), CompileError> {
    if let Stmt::Sequence(stmts) = body {
        ctx.push_scope();
        for s in stmts {
            lower_stmt(ctx, s)?;
        }
        ctx.pop_scope_silent();
        Ok(())
    } else {
        lower_stmt(ctx, body)
    }
}

fn ends_in_return(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::Sequence(stmts) => stmts.last().is_some_and(ends_in_return),
        _ => false,
    }
}
