use super::*;

// ============================================================================
// Basic allocation tests
// ============================================================================

#[test]
fn test_sequential_alloc() {
    let mut alloc = SlotAllocator::new();
    assert_eq!(alloc.alloc(), 0);
    assert_eq!(alloc.alloc(), 1);
    assert_eq!(alloc.alloc(), 2);
}

#[test]
fn test_new_is_empty() {
    let alloc = SlotAllocator::default();
    assert!(alloc.is_empty());
    assert_eq!(alloc.len(), 0);
    assert_eq!(alloc.high_water_mark(), 0);
}

// ============================================================================
// Tombstone recycling
// ============================================================================

#[test]
fn test_free_and_recycle() {
    let mut alloc = SlotAllocator::new();
    let a = alloc.alloc();
    let b = alloc.alloc();
    alloc.free(a);
    assert!(alloc.is_free(a));
    assert_eq!(alloc.alloc(), a);
    assert_eq!(b, 1);
    assert!(!alloc.is_free(a));
}

#[test]
fn test_recycle_is_lowest_first() {
    let mut alloc = SlotAllocator::new();
    for _ in 0..4 {
        alloc.alloc();
    }
    alloc.free(3);
    alloc.free(1);
    alloc.free(2);

    assert_eq!(alloc.alloc(), 1);
    assert_eq!(alloc.alloc(), 2);
    assert_eq!(alloc.alloc(), 3);
    assert_eq!(alloc.alloc(), 4);
}

#[test]
fn test_append_ignores_tombstones() {
    let mut alloc = SlotAllocator::new();
    alloc.alloc();
    alloc.alloc();
    alloc.free(0);

    assert_eq!(alloc.append(), 2);
    assert!(alloc.is_free(0));
    assert_eq!(alloc.take_tombstone(), Some(0));
    assert_eq!(alloc.take_tombstone(), None);
}

// ============================================================================
// len() and high_water_mark()
// ============================================================================

#[test]
fn test_len_tracks_live_slots() {
    let mut alloc = SlotAllocator::new();
    alloc.alloc();
    alloc.alloc();
    assert_eq!(alloc.len(), 2);

    alloc.free(0);
    assert_eq!(alloc.len(), 1);
    assert_eq!(alloc.high_water_mark(), 2);

    alloc.alloc();
    assert_eq!(alloc.len(), 2);
    assert_eq!(alloc.high_water_mark(), 2);
}

#[test]
fn test_reset() {
    let mut alloc = SlotAllocator::new();
    alloc.alloc();
    alloc.alloc();
    alloc.free(1);
    alloc.reset();

    assert!(alloc.is_empty());
    assert_eq!(alloc.alloc(), 0);
}
