// SPDX-License-Identifier: GPL-3.0-or-later

//! A free-list heap allocator.
//!
//! The allocator only tracks *which byte ranges are in use*; the actual
//! heap storage is a growable byte buffer owned by the VM, which resizes
//! it to cover whatever offset the allocator hands back.

mod free_list;

#[cfg(test)]
mod allocator_test;

pub use free_list::{Allocator, DoubleFree};
