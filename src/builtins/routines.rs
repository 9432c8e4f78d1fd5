// SPDX-License-Identifier: GPL-3.0-or-later

//! Concrete native routines and their registration.

use std::collections::HashMap;

use super::{BuiltinEntry, BuiltinFaultResult, Key, register_entry as insert};
use crate::bytecode::BuiltinFault;
use crate::value::{
    TypeName, decode_bool, decode_char, decode_f64, decode_i32, decode_i64, decode_u64,
    encode_bool, encode_char, encode_f64, encode_i32, encode_i64, encode_null, encode_u64,
};

fn pop_n(stack: &mut Vec<u8>, n: usize) -> Vec<u8> {
    let start = stack.len() - n;
    stack.split_off(start)
}

fn fault(message: impl Into<String>) -> BuiltinFault {
    BuiltinFault(message.into())
}

macro_rules! numeric_type {
    ($modname:ident, $ty:ty, $size:expr, $encode:path, $decode:path, $div:expr, $rem:expr) => {
        mod $modname {
            use super::{BuiltinFaultResult, fault, pop_n};

            fn operands(stack: &mut Vec<u8>) -> ($ty, $ty) {
                let b = $decode(&pop_n(stack, $size));
                let a = $decode(&pop_n(stack, $size));
                (a, b)
            }

            pub fn add(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let (a, b) = operands(stack);
                stack.extend_from_slice(&$encode(a.wrapping_add(b)));
                Ok(())
            }

            pub fn sub(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let (a, b) = operands(stack);
                stack.extend_from_slice(&$encode(a.wrapping_sub(b)));
                Ok(())
            }

            pub fn mul(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let (a, b) = operands(stack);
                stack.extend_from_slice(&$encode(a.wrapping_mul(b)));
                Ok(())
            }

            pub fn div(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let (a, b) = operands(stack);
                let r: $ty = $div(a, b).ok_or_else(|| fault("division by zero"))?;
                stack.extend_from_slice(&$encode(r));
                Ok(())
            }

            pub fn rem(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let (a, b) = operands(stack);
                let r: $ty = $rem(a, b).ok_or_else(|| fault("division by zero"))?;
                stack.extend_from_slice(&$encode(r));
                Ok(())
            }

            pub fn lt(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let (a, b) = operands(stack);
                stack.push(u8::from(a < b));
                Ok(())
            }

            pub fn le(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let (a, b) = operands(stack);
                stack.push(u8::from(a <= b));
                Ok(())
            }

            pub fn gt(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let (a, b) = operands(stack);
                stack.push(u8::from(a > b));
                Ok(())
            }

            pub fn ge(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let (a, b) = operands(stack);
                stack.push(u8::from(a >= b));
                Ok(())
            }

            pub fn eq(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let (a, b) = operands(stack);
                stack.push(u8::from(a == b));
                Ok(())
            }

            pub fn ne(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let (a, b) = operands(stack);
                stack.push(u8::from(a != b));
                Ok(())
            }

            pub fn neg(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
                let a = $decode(&pop_n(stack, $size));
                stack.extend_from_slice(&$encode(a.wrapping_neg()));
                Ok(())
            }
        }
    };
}

numeric_type!(
    i32_ops,
    i32,
    4,
    encode_i32,
    decode_i32,
    |a: i32, b: i32| a.checked_div(b),
    |a: i32, b: i32| a.checked_rem(b)
);
numeric_type!(
    i64_ops,
    i64,
    8,
    encode_i64,
    decode_i64,
    |a: i64, b: i64| a.checked_div(b),
    |a: i64, b: i64| a.checked_rem(b)
);
numeric_type!(
    u64_ops,
    u64,
    8,
    encode_u64,
    decode_u64,
    |a: u64, b: u64| a.checked_div(b),
    |a: u64, b: u64| a.checked_rem(b)
);

mod f64_ops {
    use super::{BuiltinFaultResult, fault, pop_n};
    use crate::value::{decode_f64, encode_f64};

    fn operands(stack: &mut Vec<u8>) -> (f64, f64) {
        let b = decode_f64(&pop_n(stack, 8));
        let a = decode_f64(&pop_n(stack, 8));
        (a, b)
    }

    pub fn add(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.extend_from_slice(&encode_f64(a + b));
        Ok(())
    }
    pub fn sub(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.extend_from_slice(&encode_f64(a - b));
        Ok(())
    }
    pub fn mul(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.extend_from_slice(&encode_f64(a * b));
        Ok(())
    }
    pub fn div(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        if b == 0.0 {
            return Err(fault("division by zero"));
        }
        stack.extend_from_slice(&encode_f64(a / b));
        Ok(())
    }
    pub fn rem(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        if b == 0.0 {
            return Err(fault("division by zero"));
        }
        stack.extend_from_slice(&encode_f64(a % b));
        Ok(())
    }
    pub fn lt(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.push(u8::from(a < b));
        Ok(())
    }
    pub fn le(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.push(u8::from(a <= b));
        Ok(())
    }
    pub fn gt(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.push(u8::from(a > b));
        Ok(())
    }
    pub fn ge(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.push(u8::from(a >= b));
        Ok(())
    }
    pub fn eq(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.push(u8::from((a - b).abs() < f64::EPSILON));
        Ok(())
    }
    pub fn ne(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.push(u8::from((a - b).abs() >= f64::EPSILON));
        Ok(())
    }
    pub fn neg(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let a = decode_f64(&pop_n(stack, 8));
        stack.extend_from_slice(&encode_f64(-a));
        Ok(())
    }
    pub fn sqrt(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let a = decode_f64(&pop_n(stack, 8));
        if a < 0.0 {
            return Err(fault("sqrt of a negative number"));
        }
        stack.extend_from_slice(&encode_f64(a.sqrt()));
        Ok(())
    }
}

mod bool_ops {
    use super::{BuiltinFaultResult, pop_n};
    use crate::value::{decode_bool, encode_bool};

    fn operands(stack: &mut Vec<u8>) -> (bool, bool) {
        let b = decode_bool(&pop_n(stack, 1));
        let a = decode_bool(&pop_n(stack, 1));
        (a, b)
    }

    pub fn and(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.extend_from_slice(&encode_bool(a && b));
        Ok(())
    }
    pub fn or(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.extend_from_slice(&encode_bool(a || b));
        Ok(())
    }
    pub fn eq(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.push(u8::from(a == b));
        Ok(())
    }
    pub fn ne(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let (a, b) = operands(stack);
        stack.push(u8::from(a != b));
        Ok(())
    }
    pub fn not(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
        let a = decode_bool(&pop_n(stack, 1));
        stack.extend_from_slice(&encode_bool(!a));
        Ok(())
    }
}

pub(super) fn register_arithmetic(table: &mut HashMap<Key, BuiltinEntry>) {
    let i32t = TypeName::i32();
    let i64t = TypeName::i64();
    let u64t = TypeName::u64();
    let f64t = TypeName::f64();
    let booly = TypeName::bool();

    macro_rules! binops {
        ($ty:expr, $ops:path) => {
            insert(table, "+", vec![$ty.clone(), $ty.clone()], $ops::add, $ty.clone());
            insert(table, "-", vec![$ty.clone(), $ty.clone()], $ops::sub, $ty.clone());
            insert(table, "*", vec![$ty.clone(), $ty.clone()], $ops::mul, $ty.clone());
            insert(table, "/", vec![$ty.clone(), $ty.clone()], $ops::div, $ty.clone());
            insert(table, "%", vec![$ty.clone(), $ty.clone()], $ops::rem, $ty.clone());
            insert(table, "<", vec![$ty.clone(), $ty.clone()], $ops::lt, booly.clone());
            insert(table, "<=", vec![$ty.clone(), $ty.clone()], $ops::le, booly.clone());
            insert(table, ">", vec![$ty.clone(), $ty.clone()], $ops::gt, booly.clone());
            insert(table, ">=", vec![$ty.clone(), $ty.clone()], $ops::ge, booly.clone());
            insert(table, "==", vec![$ty.clone(), $ty.clone()], $ops::eq, booly.clone());
            insert(table, "!=", vec![$ty.clone(), $ty.clone()], $ops::ne, booly.clone());
            insert(table, "neg", vec![$ty.clone()], $ops::neg, $ty.clone());
        };
    }

    binops!(i32t, i32_ops);
    binops!(i64t, i64_ops);
    binops!(u64t, u64_ops);
    binops!(f64t, f64_ops);
}

pub(super) fn register_logical(table: &mut HashMap<Key, BuiltinEntry>) {
    let booly = TypeName::bool();
    insert(table, "&&", vec![booly.clone(), booly.clone()], bool_ops::and, booly.clone());
    insert(table, "||", vec![booly.clone(), booly.clone()], bool_ops::or, booly.clone());
    insert(table, "==", vec![booly.clone(), booly.clone()], bool_ops::eq, booly.clone());
    insert(table, "!=", vec![booly.clone(), booly.clone()], bool_ops::ne, booly.clone());
    insert(table, "not", vec![booly.clone()], bool_ops::not, booly);
}

pub(super) fn register_math(table: &mut HashMap<Key, BuiltinEntry>) {
    insert(table, "sqrt", vec![TypeName::f64()], f64_ops::sqrt, TypeName::f64());
}

macro_rules! print_routine {
    ($name:ident, $decode:path, $size:expr, $render:expr) => {
        pub fn $name(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
            let v = $decode(&pop_n(stack, $size));
            print!("{}", $render(v));
            stack.extend_from_slice(&encode_null());
            Ok(())
        }
    };
}
macro_rules! println_routine {
    ($name:ident, $decode:path, $size:expr, $render:expr) => {
        pub fn $name(stack: &mut Vec<u8>, _args_size: u64) -> BuiltinFaultResult {
            let v = $decode(&pop_n(stack, $size));
            println!("{}", $render(v));
            stack.extend_from_slice(&encode_null());
            Ok(())
        }
    };
}

print_routine!(print_i32, decode_i32, 4, |v: i32| v.to_string());
println_routine!(println_i32, decode_i32, 4, |v: i32| v.to_string());
print_routine!(print_i64, decode_i64, 8, |v: i64| v.to_string());
println_routine!(println_i64, decode_i64, 8, |v: i64| v.to_string());
print_routine!(print_u64, decode_u64, 8, |v: u64| v.to_string());
println_routine!(println_u64, decode_u64, 8, |v: u64| v.to_string());
print_routine!(print_f64, decode_f64, 8, |v: f64| v.to_string());
println_routine!(println_f64, decode_f64, 8, |v: f64| v.to_string());
print_routine!(print_bool, decode_bool, 1, |v: bool| v.to_string());
println_routine!(println_bool, decode_bool, 1, |v: bool| v.to_string());
print_routine!(print_char, decode_char, 1, |v: u8| (v as char).to_string());
println_routine!(println_char, decode_char, 1, |v: u8| (v as char).to_string());

pub(super) fn register_print(table: &mut HashMap<Key, BuiltinEntry>) {
    let nullt = TypeName::null();
    insert(table, "print", vec![TypeName::i32()], print_i32, nullt.clone());
    insert(table, "println", vec![TypeName::i32()], println_i32, nullt.clone());
    insert(table, "print", vec![TypeName::i64()], print_i64, nullt.clone());
    insert(table, "println", vec![TypeName::i64()], println_i64, nullt.clone());
    insert(table, "print", vec![TypeName::u64()], print_u64, nullt.clone());
    insert(table, "println", vec![TypeName::u64()], println_u64, nullt.clone());
    insert(table, "print", vec![TypeName::f64()], print_f64, nullt.clone());
    insert(table, "println", vec![TypeName::f64()], println_f64, nullt.clone());
    insert(table, "print", vec![TypeName::bool()], print_bool, nullt.clone());
    insert(table, "println", vec![TypeName::bool()], println_bool, nullt.clone());
    insert(table, "print", vec![TypeName::char()], print_char, nullt.clone());
    insert(table, "println", vec![TypeName::char()], println_char, nullt);
}

/// The dynamic `print(List{char,n})` overload: the caller tells us `n` via
/// `args_size` since no static table entry exists for every `n`.
pub fn print_string(stack: &mut Vec<u8>, args_size: u64) -> BuiltinFaultResult {
    print_string_impl(stack, args_size, false)
}

/// The dynamic `println(List{char,n})` overload.
pub fn println_string(stack: &mut Vec<u8>, args_size: u64) -> BuiltinFaultResult {
    print_string_impl(stack, args_size, true)
}

fn print_string_impl(stack: &mut Vec<u8>, args_size: u64, newline: bool) -> BuiltinFaultResult {
    let n = usize::try_from(args_size).map_err(|_| fault("string length overflow"))?;
    let bytes = pop_n(stack, n);
    for byte in &bytes {
        print!("{}", *byte as char);
    }
    if newline {
        println!();
    }
    stack.extend_from_slice(&encode_null());
    Ok(())
}
