// SPDX-License-Identifier: GPL-3.0-or-later

//! Type model and byte-level value encoding.
//!
//! A [`TypeName`] names a type; a [`TypeStore`] maps record type names to
//! their field lists and answers size/offset/field-order queries. Values
//! themselves are never represented as a distinct Rust type here — every
//! runtime value is just a byte sequence of length `size_of(type)` (see
//! [`encode`]), which is exactly how both the stack and the heap store
//! them.

mod encode;
mod type_name;
mod type_store;

#[cfg(test)]
mod type_store_test;

pub use encode::{
    decode_bool, decode_char, decode_f64, decode_i32, decode_i64, decode_u64, encode_bool,
    encode_char, encode_f64, encode_i32, encode_i64, encode_null, encode_u64,
};
pub use type_name::TypeName;
pub use type_store::{Field, TypeError, TypeStore};
