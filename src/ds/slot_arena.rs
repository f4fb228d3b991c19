//! Generational slot arena backing the bucket lists.
//!
//! Nodes live in a `Vec` and are addressed by [`SlotId`] handles instead of
//! references. Freed slots are recycled through a free list; every reuse bumps
//! the slot's generation so a handle kept past `remove` no longer resolves.
//!
//! ```
//! use lfukit::ds::SlotArena;
//!
//! let mut arena = SlotArena::new();
//! let a = arena.insert("a");
//! assert_eq!(arena.remove(a), Some("a"));
//!
//! let b = arena.insert("b");
//! assert_eq!(a.index(), b.index()); // slot recycled
//! assert_eq!(arena.get(a), None);   // stale handle
//! assert_eq!(arena.get(b), Some(&"b"));
//! ```

/// Stable handle to an arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: u32,
    generation: u32,
}

impl SlotId {
    /// Position of the slot in the backing storage.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Generation the handle was issued for.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Vector-backed arena with free-list reuse and generation checks.
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` and returns its handle, reusing a freed slot if any.
    pub fn insert(&mut self, value: T) -> SlotId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.value.is_none(), "free list points at a live slot");
            slot.value = Some(value);
            return SlotId {
                index,
                generation: slot.generation,
            };
        }

        let index = u32::try_from(self.slots.len()).expect("slot arena exceeded u32::MAX slots");
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        SlotId {
            index,
            generation: 0,
        }
    }

    /// Takes the value out of `id`'s slot. Stale or vacant handles yield `None`.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(value)
    }

    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every value. Generations restart, so handles issued before the
    /// clear must be discarded by the caller.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    SlotId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    pub fn approx_bytes(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Slot<T>>()
            + self.free.capacity() * std::mem::size_of::<u32>()
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
