// SPDX-License-Identifier: GPL-3.0-or-later

use super::registry;
use crate::value::TypeName;

#[test]
fn exact_overload_is_found() {
    let entry = registry().resolve("+", &[TypeName::i64(), TypeName::i64()]).unwrap();
    assert_eq!(entry.return_type, TypeName::i64());
}

#[test]
fn mismatched_overload_is_not_found() {
    assert!(registry().resolve("+", &[TypeName::i64(), TypeName::i32()]).is_none());
}

#[test]
fn unknown_name_is_not_found() {
    assert!(registry().resolve("frobnicate", &[TypeName::i64()]).is_none());
}

#[test]
fn comparison_returns_bool() {
    let entry = registry().resolve("<", &[TypeName::f64(), TypeName::f64()]).unwrap();
    assert_eq!(entry.return_type, TypeName::bool());
}

#[test]
fn string_print_overload_resolves_for_any_length() {
    let three = TypeName::list(TypeName::char(), 3);
    let nine = TypeName::list(TypeName::char(), 9);
    assert!(registry().resolve("println", core::slice::from_ref(&three)).is_some());
    assert!(registry().resolve("print", core::slice::from_ref(&nine)).is_some());
}

#[test]
fn resolve_is_deterministic() {
    let a = registry().resolve("+", &[TypeName::i32(), TypeName::i32()]).unwrap();
    let b = registry().resolve("+", &[TypeName::i32(), TypeName::i32()]).unwrap();
    assert_eq!(a.routine as usize, b.routine as usize);
}

#[test]
fn arithmetic_routine_adds_in_place() {
    let entry = registry().resolve("+", &[TypeName::i32(), TypeName::i32()]).unwrap();
    let mut stack = Vec::new();
    stack.extend_from_slice(&crate::value::encode_i32(40));
    stack.extend_from_slice(&crate::value::encode_i32(2));
    (entry.routine)(&mut stack, 8).unwrap();
    assert_eq!(crate::value::decode_i32(&stack), 42);
}

#[test]
fn division_by_zero_faults() {
    let entry = registry().resolve("/", &[TypeName::i64(), TypeName::i64()]).unwrap();
    let mut stack = Vec::new();
    stack.extend_from_slice(&crate::value::encode_i64(10));
    stack.extend_from_slice(&crate::value::encode_i64(0));
    assert!((entry.routine)(&mut stack, 16).is_err());
}
