use std::collections::BTreeSet;

/// Allocates and recycles `usize` slot indices.
///
/// Freed indices are kept as tombstones and handed out again lowest-first,
/// so a registry that recycles never grows while it has holes below its
/// high water mark.
///
/// # Example
///
/// ```ignore
/// let mut alloc = SlotAllocator::new();
/// let a = alloc.alloc();  // 0
/// let b = alloc.alloc();  // 1
/// alloc.free(a);          // 0 is now a tombstone
/// let c = alloc.alloc();  // 0 (recycled)
/// ```
pub struct SlotAllocator {
    tombstones: BTreeSet<usize>,
    next_id: usize,
}

impl SlotAllocator {
    /// Create a new empty allocator
    pub fn new() -> Self {
        Self {
            tombstones: BTreeSet::new(),
            next_id: 0,
        }
    }

    /// Allocate the lowest tombstoned index, or a fresh one
    pub fn alloc(&mut self) -> usize {
        self.take_tombstone().unwrap_or_else(|| self.append())
    }

    /// Allocate a fresh index past the high water mark, ignoring tombstones
    pub fn append(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Pop the lowest tombstoned index, if any
    pub fn take_tombstone(&mut self) -> Option<usize> {
        self.tombstones.pop_first()
    }

    /// Mark an index as a tombstone
    pub fn free(&mut self, id: usize) {
        debug_assert!(id < self.next_id, "freeing an unallocated slot: {}", id);
        self.tombstones.insert(id);
    }

    /// Whether `id` is currently a tombstone
    pub fn is_free(&self, id: usize) -> bool {
        self.tombstones.contains(&id)
    }

    /// Highest index ever allocated + 1
    pub fn high_water_mark(&self) -> usize {
        self.next_id
    }

    /// Number of live (non-tombstoned) slots
    pub fn len(&self) -> usize {
        self.next_id - self.tombstones.len()
    }

    /// Whether no slots are currently live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every slot
    pub fn reset(&mut self) {
        self.tombstones.clear();
        self.next_id = 0;
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
