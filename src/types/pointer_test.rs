// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Pointer, Region};

#[test]
fn stack_pointer_has_region_bit_clear() {
    let p = Pointer::stack(0x1234);
    assert_eq!(p.region(), Region::Stack);
    assert!(p.is_stack());
    assert!(!p.is_heap());
    assert_eq!(p.offset(), 0x1234);
}

#[test]
fn heap_pointer_has_region_bit_set() {
    let p = Pointer::heap(0x1234);
    assert_eq!(p.region(), Region::Heap);
    assert!(p.is_heap());
    assert!(!p.is_stack());
    assert_eq!(p.offset(), 0x1234);
}

#[test]
fn add_offset_preserves_region() {
    let stack = Pointer::stack(100).add_offset(8);
    assert!(stack.is_stack());
    assert_eq!(stack.offset(), 108);

    let heap = Pointer::heap(100).add_offset(8);
    assert!(heap.is_heap());
    assert_eq!(heap.offset(), 108);
}

#[test]
fn from_raw_round_trips_through_raw() {
    let p = Pointer::heap(42);
    assert_eq!(Pointer::from_raw(p.raw()), p);
}

#[test]
fn heap_and_stack_pointers_at_same_offset_differ() {
    assert_ne!(Pointer::stack(7).raw(), Pointer::heap(7).raw());
}

proptest::proptest! {
    #[test]
    fn add_offset_never_changes_region_bit(offset in 0u64..(1u64 << 63), delta in 0u64..4096) {
        let stack = Pointer::stack(offset).add_offset(delta);
        proptest::prop_assert!(stack.is_stack());
        let heap = Pointer::heap(offset).add_offset(delta);
        proptest::prop_assert!(heap.is_heap());
    }
}
