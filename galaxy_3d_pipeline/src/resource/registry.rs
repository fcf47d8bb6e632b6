/// Dense slot registry with tombstone recycling
///
/// Entries live in a `Vec<Option<T>>`; `None` marks a released slot. Slot
/// indices are handed out by a `SlotAllocator`, so `insert` reuses the
/// lowest tombstone while `push` always appends.

use crate::utils::SlotAllocator;

pub struct Registry<T> {
    slots: Vec<Option<T>>,
    allocator: SlotAllocator,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            allocator: SlotAllocator::new(),
        }
    }

    /// Store `value` in a fresh slot past the end
    pub fn push(&mut self, value: T) -> usize {
        let index = self.allocator.append();
        self.place(index, value);
        index
    }

    /// Store `value` in the lowest released slot, appending if there is none
    pub fn insert(&mut self, value: T) -> usize {
        let index = self.allocator.alloc();
        self.place(index, value);
        index
    }

    fn place(&mut self, index: usize, value: T) {
        if index == self.slots.len() {
            self.slots.push(Some(value));
        } else {
            self.slots[index] = Some(value);
        }
    }

    /// Take the entry out of its slot and tombstone the slot
    pub fn release(&mut self, index: usize) -> Option<T> {
        let value = self.slots.get_mut(index)?.take()?;
        self.allocator.free(index);
        Some(value)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.as_mut()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Live entries with their indices, in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (index, value)))
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.allocator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocator.is_empty()
    }

    /// Number of slots, live or released
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Remove every entry, returning the live ones in index order
    pub fn drain(&mut self) -> Vec<T> {
        self.allocator.reset();
        self.slots.drain(..).flatten().collect()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
