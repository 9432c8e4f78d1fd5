// SPDX-License-Identifier: GPL-3.0-or-later

use super::{CompileError, CompilerContext};
use crate::ast::Expr;
use crate::bytecode::Instruction;
use crate::builtins;
use crate::value::{TypeName, encode_bool, encode_u64};

/// Lower `expr` as an rvalue: leaves its encoded value as the top bytes
/// of the stack. Returns the expression's type.
pub(crate) fn lower_expr(ctx: &mut CompilerContext, expr: &Expr) -> Result<TypeName, CompileError> {
    match expr {
        Expr::Literal { ty, bytes } => {
            ctx.program.push(Instruction::LoadBytes(bytes.clone()));
            Ok(ty.clone())
        }
        Expr::Variable(name) => {
            let local = ctx.resolve_local(name).ok_or_else(|| CompileError::UnknownIdentifier(name.clone()))?;
            let (offset, ty) = (local.offset, local.ty.clone());
            let size = ctx.types.size_of(&ty)?;
            ctx.program.push(Instruction::PushLocalAddr(offset));
            ctx.program.push(Instruction::Load(size));
            Ok(ty)
        }
        Expr::Field { .. } | Expr::Subscript { .. } => {
            let ty = lower_lvalue(ctx, expr)?;
            let size = ctx.types.size_of(&ty)?;
            ctx.program.push(Instruction::Load(size));
            Ok(ty)
        }
        Expr::Deref(inner) => {
            let pointee = lower_expr(ctx, inner)?;
            let inner_ty = pointee_type(&pointee)?;
            let size = ctx.types.size_of(&inner_ty)?;
            ctx.program.push(Instruction::Load(size));
            Ok(inner_ty)
        }
        Expr::AddressOf(inner) => {
            let pointee = lower_lvalue(ctx, inner)?;
            Ok(TypeName::pointer(pointee))
        }
        Expr::Unary { op, operand } => {
            let operand_ty = lower_expr(ctx, operand)?;
            let entry = builtins::registry()
                .resolve(op, core::slice::from_ref(&operand_ty))
                .ok_or_else(|| CompileError::UnresolvedOverload {
                    name: op.clone(),
                    arg_types: vec![operand_ty.clone()],
                })?;
            let args_size = ctx.types.size_of(&operand_ty)?;
            ctx.program.push(Instruction::BuiltinCall(crate::bytecode::BuiltinCall {
                name: op.clone(),
                routine: entry.routine,
                args_size,
            }));
            Ok(entry.return_type)
        }
        Expr::Binary { op, left, right } if op == "&&" || op == "||" => {
            lower_short_circuit(ctx, op, left, right)
        }
        Expr::Binary { op, left, right } => {
            let left_ty = lower_expr(ctx, left)?;
            let right_ty = lower_expr(ctx, right)?;
            let entry = builtins::registry()
                .resolve(op, &[left_ty.clone(), right_ty.clone()])
                .ok_or_else(|| CompileError::UnresolvedOverload {
                    name: op.clone(),
                    arg_types: vec![left_ty.clone(), right_ty.clone()],
                })?;
            let args_size = ctx.types.size_of(&left_ty)? + ctx.types.size_of(&right_ty)?;
            ctx.program.push(Instruction::BuiltinCall(crate::bytecode::BuiltinCall {
                name: op.clone(),
                routine: entry.routine,
                args_size,
            }));
            Ok(entry.return_type)
        }
        Expr::ListLiteral(elements) => {
            let Some(first) = elements.first() else {
                return Err(CompileError::EmptyListLiteral);
            };
            let elem_ty = lower_expr(ctx, first)?;
            for element in &elements[1..] {
                lower_expr(ctx, element)?;
            }
            Ok(TypeName::list(elem_ty, elements.len() as u64))
        }
        Expr::RepeatList { value, count } => {
            if *count == 0 {
                return Ok(TypeName::list(type_of(ctx, value)?, 0));
            }
            let elem_ty = lower_expr(ctx, value)?;
            for _ in 1..*count {
                lower_expr(ctx, value)?;
            }
            Ok(TypeName::list(elem_ty, *count))
        }
        Expr::New { element_type, count } => {
            lower_expr(ctx, count)?;
            let elem_size = ctx.types.size_of(element_type)?;
            ctx.program.push(Instruction::Allocate(elem_size));
            Ok(TypeName::pointer(element_type.clone()))
        }
        Expr::SizeOf(ty) => {
            let size = ctx.types.size_of(ty)?;
            ctx.program.push(Instruction::LoadBytes(encode_u64(size).to_vec()));
            Ok(TypeName::u64())
        }
        Expr::Call { name, args } if name == "list_size" => lower_list_size(ctx, args),
        Expr::Call { name, args } if name == "list_at" => lower_list_at(ctx, args),
        Expr::Call { name, args } => lower_call(ctx, name, args),
        Expr::MethodCall { receiver, name, args } => {
            let receiver_ty = type_of(ctx, receiver)?;
            let qualified = format!("{receiver_ty}::{name}");
            let mut all_args = Vec::with_capacity(args.len() + 1);
            all_args.push(Expr::AddressOf(Box::new((**receiver).clone())));
            all_args.extend(args.iter().cloned());
            lower_call(ctx, &qualified, &all_args)
        }
    }
}

/// `name(args...)`: a call to a user-defined function if one by that name
/// was already lowered, otherwise a built-in (`print`, `println`, `sqrt`,
/// ...) resolved by name and argument types, the same way an operator is.
fn lower_call(ctx: &mut CompilerContext, name: &str, args: &[Expr]) -> Result<TypeName, CompileError> {
    if let Some(info) = ctx.functions.get(name).cloned() {
        // Reserve the 16-byte frame header the callee's prologue writes
        // into; `FunctionCall` locates it by walking back from the top of
        // the stack.
        ctx.program.push(Instruction::LoadBytes(vec![0u8; 16]));

        let mut args_size = 0u64;
        for arg in args {
            let ty = lower_expr(ctx, arg)?;
            args_size += ctx.types.size_of(&ty)?;
        }
        ctx.program.push(Instruction::FunctionCall { target_pc: info.entry_pc, args_size });
        return Ok(info.return_type);
    }

    let mut arg_types = Vec::with_capacity(args.len());
    for arg in args {
        arg_types.push(lower_expr(ctx, arg)?);
    }
    let entry = builtins::registry().resolve(name, &arg_types).ok_or_else(|| {
        CompileError::UnresolvedOverload { name: name.to_string(), arg_types: arg_types.clone() }
    })?;
    let mut args_size = 0u64;
    for ty in &arg_types {
        args_size += ctx.types.size_of(ty)?;
    }
    ctx.program.push(Instruction::BuiltinCall(crate::bytecode::BuiltinCall {
        name: name.to_string(),
        routine: entry.routine,
        args_size,
    }));
    Ok(entry.return_type)
}

/// `list_size(list)`: a fixed-length list's element count is part of its
/// type, known at compile time, so this never touches the stack at
/// runtime — it's a constant fold, the same way `SizeOf` is.
fn lower_list_size(ctx: &mut CompilerContext, args: &[Expr]) -> Result<TypeName, CompileError> {
    let [list] = args else {
        return Err(CompileError::ArityMismatch { name: "list_size", expected: 1, found: args.len() });
    };
    let list_ty = type_of(ctx, list)?;
    let TypeName::List { count, .. } = list_ty else {
        return Err(CompileError::NotAList(list_ty));
    };
    ctx.program.push(Instruction::LoadBytes(encode_u64(count).to_vec()));
    Ok(TypeName::u64())
}

/// `list_at(list, index)`: indexed access into a list by value, identical
/// to `list[index]`. Recovered from `original_source`'s `for`-loop
/// lowering, kept as a callable form since nothing else in this spec
/// exposes it under that name.
fn lower_list_at(ctx: &mut CompilerContext, args: &[Expr]) -> Result<TypeName, CompileError> {
    let [list, index] = args else {
        return Err(CompileError::ArityMismatch { name: "list_at", expected: 2, found: args.len() });
    };
    let subscript = Expr::Subscript { base: Box::new(list.clone()), index: Box::new(index.clone()) };
    lower_expr(ctx, &subscript)
}

fn lower_short_circuit(
    ctx: &mut CompilerContext,
    op: &str,
    left: &Expr,
    right: &Expr,
) -> Result<TypeName, CompileError> {
    let left_ty = lower_expr(ctx, left)?;
    expect_bool(&left_ty)?;

    let jf_index = ctx.program.push(Instruction::JumpIfFalse(0));

    if op == "&&" {
        let right_ty = lower_expr(ctx, right)?;
        expect_bool(&right_ty)?;
        let end_jump = ctx.program.push(Instruction::Jump(0));
        let false_branch = ctx.program.len();
        patch_jump_if_false(ctx, jf_index, false_branch);
        ctx.program.push(Instruction::LoadBytes(encode_bool(false).to_vec()));
        let end = ctx.program.len();
        patch_jump(ctx, end_jump, end);
    } else {
        ctx.program.push(Instruction::LoadBytes(encode_bool(true).to_vec()));
        let end_jump = ctx.program.push(Instruction::Jump(0));
        let right_branch = ctx.program.len();
        patch_jump_if_false(ctx, jf_index, right_branch);
        let right_ty = lower_expr(ctx, right)?;
        expect_bool(&right_ty)?;
        let end = ctx.program.len();
        patch_jump(ctx, end_jump, end);
    }
    Ok(TypeName::bool())
}

fn expect_bool(ty: &TypeName) -> Result<(), CompileError> {
    if *ty == TypeName::bool() {
        Ok(())
    } else {
        Err(CompileError::TypeMismatch { expected: TypeName::bool(), found: ty.clone() })
    }
}

pub(crate) fn patch_jump(ctx: &mut CompilerContext, index: usize, target: usize) {
    let delta = target as i64 - index as i64;
    ctx.program.patch(index, Instruction::Jump(delta));
}

pub(crate) fn patch_jump_if_false(ctx: &mut CompilerContext, index: usize, target: usize) {
    let delta = target as i64 - index as i64;
    ctx.program.patch(index, Instruction::JumpIfFalse(delta));
}

/// Lower `expr` as an lvalue: leaves its *address* on the stack (region
/// bit set appropriately) without the trailing `Load`. Returns the type
/// of the value at that address.
pub(crate) fn lower_lvalue(ctx: &mut CompilerContext, expr: &Expr) -> Result<TypeName, CompileError> {
    match expr {
        Expr::Variable(name) => {
            let local =
                ctx.resolve_local(name).ok_or_else(|| CompileError::UnknownIdentifier(name.clone()))?;
            let (offset, ty) = (local.offset, local.ty.clone());
            ctx.program.push(Instruction::PushLocalAddr(offset));
            Ok(ty)
        }
        Expr::Field { base, field } => {
            let base_ty = lower_lvalue(ctx, base)?;
            let field_info = ctx.types.field(&base_ty, field)?.clone();
            ctx.program.push(Instruction::LoadBytes(encode_u64(field_info.offset).to_vec()));
            ctx.program.push(Instruction::ModifyPtr);
            Ok(field_info.ty)
        }
        Expr::Subscript { base, index } => {
            let base_ty = lower_lvalue(ctx, base)?;
            let elem_ty = match &base_ty {
                TypeName::List { inner, .. } => (**inner).clone(),
                other => return Err(CompileError::NotAList(other.clone())),
            };
            lower_expr(ctx, index)?;
            let elem_size = ctx.types.size_of(&elem_ty)?;
            ctx.program.push(Instruction::LoadBytes(encode_u64(elem_size).to_vec()));
            let mul = builtins::registry()
                .resolve("*", &[TypeName::u64(), TypeName::u64()])
                .expect("u64 multiplication is always registered");
            ctx.program.push(Instruction::BuiltinCall(crate::bytecode::BuiltinCall {
                name: "*".to_string(),
                routine: mul.routine,
                args_size: 16,
            }));
            ctx.program.push(Instruction::ModifyPtr);
            Ok(elem_ty)
        }
        Expr::Deref(inner) => {
            let pointee = lower_expr(ctx, inner)?;
            pointee_type(&pointee)
        }
        _ => Err(CompileError::NotAnLvalue),
    }
}

fn pointee_type(ty: &TypeName) -> Result<TypeName, CompileError> {
    match ty {
        TypeName::Pointer { inner } => Ok((**inner).clone()),
        other => Err(CompileError::TypeMismatch {
            expected: TypeName::pointer(other.clone()),
            found: other.clone(),
        }),
    }
}

/// Determine `expr`'s type without emitting any instructions. Used where
/// a type is needed before a sibling is lowered (e.g. a zero-length
/// `RepeatList`, or a method call's receiver type).
pub(crate) fn type_of(ctx: &CompilerContext, expr: &Expr) -> Result<TypeName, CompileError> {
    match expr {
        Expr::Literal { ty, .. } => Ok(ty.clone()),
        Expr::Variable(name) => {
            ctx.resolve_local(name).map(|local| local.ty.clone()).ok_or_else(|| CompileError::UnknownIdentifier(name.clone()))
        }
        Expr::Field { base, field } => {
            let base_ty = type_of(ctx, base)?;
            Ok(ctx.types.field(&base_ty, field)?.ty.clone())
        }
        Expr::Subscript { base, .. } => match type_of(ctx, base)? {
            TypeName::List { inner, .. } => Ok(*inner),
            other => Err(CompileError::NotAList(other)),
        },
        Expr::Deref(inner) => pointee_type(&type_of(ctx, inner)?),
        Expr::AddressOf(inner) => Ok(TypeName::pointer(type_of(ctx, inner)?)),
        Expr::Unary { op, operand } => {
            let operand_ty = type_of(ctx, operand)?;
            builtins::registry()
                .resolve(op, core::slice::from_ref(&operand_ty))
                .map(|entry| entry.return_type)
                .ok_or(CompileError::UnresolvedOverload { name: op.clone(), arg_types: vec![operand_ty] })
        }
        Expr::Binary { op, .. } if op == "&&" || op == "||" => Ok(TypeName::bool()),
        Expr::Binary { op, left, right } => {
            let left_ty = type_of(ctx, left)?;
            let right_ty = type_of(ctx, right)?;
            builtins::registry()
                .resolve(op, &[left_ty.clone(), right_ty.clone()])
                .map(|entry| entry.return_type)
                .ok_or(CompileError::UnresolvedOverload { name: op.clone(), arg_types: vec![left_ty, right_ty] })
        }
        Expr::ListLiteral(elements) => {
            let first = elements.first().ok_or(CompileError::EmptyListLiteral)?;
            Ok(TypeName::list(type_of(ctx, first)?, elements.len() as u64))
        }
        Expr::RepeatList { value, count } => Ok(TypeName::list(type_of(ctx, value)?, *count)),
        Expr::New { element_type, .. } => Ok(TypeName::pointer(element_type.clone())),
        Expr::SizeOf(_) => Ok(TypeName::u64()),
        Expr::Call { name, .. } if name == "list_size" => Ok(TypeName::u64()),
        Expr::Call { name, args } if name == "list_at" => match type_of(ctx, &args[0])? {
            TypeName::List { inner, .. } => Ok(*inner),
            other => Err(CompileError::NotAList(other)),
        },
        Expr::Call { name, args } => {
            if let Some(info) = ctx.functions.get(name) {
                return Ok(info.return_type.clone());
            }
            let arg_types =
                args.iter().map(|a| type_of(ctx, a)).collect::<Result<Vec<_>, _>>()?;
            builtins::registry()
                .resolve(name, &arg_types)
                .map(|entry| entry.return_type)
                .ok_or_else(|| CompileError::UnresolvedOverload { name: name.clone(), arg_types })
        }
        Expr::MethodCall { receiver, name, .. } => {
            let receiver_ty = type_of(ctx, receiver)?;
            let qualified = format!("{receiver_ty}::{name}");
            ctx.functions
                .get(&qualified)
                .map(|info| info.return_type.clone())
                .ok_or(CompileError::UnknownFunction(qualified))
        }
    }
}
