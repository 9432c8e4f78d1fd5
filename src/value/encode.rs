// SPDX-License-Identifier: GPL-3.0-or-later

//! Byte encoding for fundamental values.
//!
//! Every value the VM manipulates — on the stack or the heap — is a byte
//! sequence: numerics are encoded little-endian at their fundamental
//! width, `bool` is a single `0x00`/`0x01` byte, and `null` is a single
//! `0x00` byte. Records and lists have no dedicated encoding function:
//! they're just their fields or elements written contiguously in order,
//! which callers build by concatenating the encodings of their parts.

/// Encode an `i32` as 4 little-endian bytes.
#[must_use]
pub fn encode_i32(n: i32) -> [u8; 4] {
    n.to_le_bytes()
}

/// Decode 4 little-endian bytes as an `i32`.
#[must_use]
pub fn decode_i32(bytes: &[u8]) -> i32 {
    i32::from_le_bytes(bytes[0..4].try_into().expect("4-byte slice"))
}

/// Encode an `i64` as 8 little-endian bytes.
#[must_use]
pub fn encode_i64(n: i64) -> [u8; 8] {
    n.to_le_bytes()
}

/// Decode 8 little-endian bytes as an `i64`.
#[must_use]
pub fn decode_i64(bytes: &[u8]) -> i64 {
    i64::from_le_bytes(bytes[0..8].try_into().expect("8-byte slice"))
}

/// Encode a `u64` as 8 little-endian bytes.
#[must_use]
pub fn encode_u64(n: u64) -> [u8; 8] {
    n.to_le_bytes()
}

/// Decode 8 little-endian bytes as a `u64`.
#[must_use]
pub fn decode_u64(bytes: &[u8]) -> u64 {
    u64::from_le_bytes(bytes[0..8].try_into().expect("8-byte slice"))
}

/// Encode an `f64` as 8 little-endian bytes.
#[must_use]
pub fn encode_f64(n: f64) -> [u8; 8] {
    n.to_le_bytes()
}

/// Decode 8 little-endian bytes as an `f64`.
#[must_use]
pub fn decode_f64(bytes: &[u8]) -> f64 {
    f64::from_le_bytes(bytes[0..8].try_into().expect("8-byte slice"))
}

/// Encode a `bool` as a single byte, `0x01` for `true` and `0x00` for
/// `false`.
#[must_use]
pub fn encode_bool(b: bool) -> [u8; 1] {
    [u8::from(b)]
}

/// Decode a single byte as a `bool`: any nonzero byte is `true`.
#[must_use]
pub fn decode_bool(bytes: &[u8]) -> bool {
    bytes[0] != 0
}

/// Encode a `char` as its single ASCII byte.
#[must_use]
pub fn encode_char(c: u8) -> [u8; 1] {
    [c]
}

/// Decode a single byte as a `char`.
#[must_use]
pub fn decode_char(bytes: &[u8]) -> u8 {
    bytes[0]
}

/// The encoding of the `null` literal: a single zero byte.
#[must_use]
pub fn encode_null() -> [u8; 1] {
    [0]
}
