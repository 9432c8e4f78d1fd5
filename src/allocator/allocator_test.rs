// SPDX-License-Identifier: GPL-3.0-or-later

use super::Allocator;

#[test]
fn first_allocation_starts_at_zero() {
    let mut alloc = Allocator::new();
    assert_eq!(alloc.allocate(16), 0);
    assert_eq!(alloc.bytes_in_use(), 16);
}

#[test]
fn sequential_allocations_do_not_overlap() {
    let mut alloc = Allocator::new();
    let a = alloc.allocate(8);
    let b = alloc.allocate(24);
    assert_eq!(a, 0);
    assert_eq!(b, 8);
}

#[test]
fn deallocate_then_allocate_reuses_the_freed_block() {
    let mut alloc = Allocator::new();
    let a = alloc.allocate(16);
    alloc.allocate(16);
    alloc.deallocate(a, 16).unwrap();
    assert_eq!(alloc.bytes_in_use(), 16);

    let reused = alloc.allocate(16);
    assert_eq!(reused, a);
}

#[test]
fn adjacent_frees_coalesce_into_one_block() {
    let mut alloc = Allocator::new();
    let a = alloc.allocate(8);
    let b = alloc.allocate(8);
    alloc.deallocate(a, 8).unwrap();
    alloc.deallocate(b, 8).unwrap();

    // The coalesced 16-byte block satisfies a request neither half could.
    let merged = alloc.allocate(16);
    assert_eq!(merged, a);
}

#[test]
fn splitting_a_free_block_leaves_the_remainder_free() {
    let mut alloc = Allocator::new();
    let a = alloc.allocate(32);
    alloc.deallocate(a, 32).unwrap();

    let first_half = alloc.allocate(16);
    let second_half = alloc.allocate(16);
    assert_eq!(first_half, a);
    assert_eq!(second_half, a + 16);
}

#[test]
fn balanced_allocate_deallocate_leaves_nothing_in_use() {
    let mut alloc = Allocator::new();
    let offsets: Vec<u64> = (0..8).map(|i| alloc.allocate(i + 1)).collect();
    for (i, offset) in offsets.into_iter().enumerate() {
        alloc.deallocate(offset, i as u64 + 1).unwrap();
    }
    assert_eq!(alloc.bytes_in_use(), 0);
}

proptest::proptest! {
    #[test]
    fn every_matched_allocate_deallocate_pair_zeroes_bytes_in_use(sizes in proptest::collection::vec(1u64..64, 1..20)) {
        let mut alloc = Allocator::new();
        let offsets: Vec<u64> = sizes.iter().map(|&s| alloc.allocate(s)).collect();
        for (offset, size) in offsets.into_iter().zip(sizes.iter()) {
            alloc.deallocate(offset, *size).unwrap();
        }
        proptest::prop_assert_eq!(alloc.bytes_in_use(), 0);
    }
}
