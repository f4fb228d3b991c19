//! Hash-map backed entry store.
//!
//! Maps each live key to its [`Entry`]: the value, the access frequency and the
//! [`SlotId`] of the key's node in the frequency index. The store enforces no
//! capacity of its own; the cache decides when to evict.
//!
//! ```
//! use lfukit::ds::SlotArena;
//! use lfukit::store::{Entry, EntryStore};
//!
//! let mut arena = SlotArena::new();
//! let slot = arena.insert(());
//!
//! let mut store: EntryStore<&str, u32> = EntryStore::with_capacity(4);
//! store.insert("a", Entry::new(10, slot));
//! assert_eq!(store.lookup(&"a").map(|e| e.frequency()), Some(1));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::SlotId;

/// Per-key record kept by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<V> {
    pub(crate) value: V,
    pub(crate) freq: u64,
    pub(crate) slot: SlotId,
}

impl<V> Entry<V> {
    /// New entries start at frequency 1.
    pub fn new(value: V, slot: SlotId) -> Self {
        Self {
            value,
            freq: 1,
            slot,
        }
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub fn frequency(&self) -> u64 {
        self.freq
    }

    /// Position of the key's node inside its frequency bucket.
    #[inline]
    pub fn slot(&self) -> SlotId {
        self.slot
    }
}

/// Single-threaded key -> [`Entry`] map.
#[derive(Debug)]
pub struct EntryStore<K, V> {
    map: FxHashMap<K, Entry<V>>,
}

impl<K, V> EntryStore<K, V>
where
    K: Eq + Hash,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    #[inline]
    pub fn lookup(&self, key: &K) -> Option<&Entry<V>> {
        self.map.get(key)
    }

    #[inline]
    pub fn lookup_mut(&mut self, key: &K) -> Option<&mut Entry<V>> {
        self.map.get_mut(key)
    }

    /// Inserts or replaces the entry for `key`, returning the previous one.
    #[inline]
    pub fn insert(&mut self, key: K, entry: Entry<V>) -> Option<Entry<V>> {
        self.map.insert(key, entry)
    }

    #[inline]
    pub fn remove(&mut self, key: &K) -> Option<Entry<V>> {
        self.map.remove(key)
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Entry<V>)> {
        self.map.iter()
    }

    pub fn approx_bytes(&self) -> usize {
        self.map.capacity() * std::mem::size_of::<(K, Entry<V>)>()
    }
}

impl<K, V> Default for EntryStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::SlotArena;

    fn slot() -> SlotId {
        SlotArena::new().insert(())
    }

    #[test]
    fn entry_store_basic_ops() {
        let mut store = EntryStore::with_capacity(2);
        assert!(store.is_empty());
        assert_eq!(store.insert("k1", Entry::new("v1", slot())), None);
        assert!(store.contains(&"k1"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup(&"k1").map(Entry::value), Some(&"v1"));

        let removed = store.remove(&"k1").unwrap();
        assert_eq!(removed.value, "v1");
        assert!(!store.contains(&"k1"));
        assert!(store.lookup(&"k1").is_none());
    }

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut store = EntryStore::default();
        store.insert(1u8, Entry::new('a', slot()));
        let previous = store.insert(1u8, Entry::new('b', slot()));
        assert_eq!(previous.map(|e| e.value), Some('a'));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn lookup_mut_edits_in_place() {
        let mut store = EntryStore::default();
        store.insert("k", Entry::new(1, slot()));
        {
            let entry = store.lookup_mut(&"k").unwrap();
            entry.value = 2;
            entry.freq += 1;
        }
        let entry = store.lookup(&"k").unwrap();
        assert_eq!(*entry.value(), 2);
        assert_eq!(entry.frequency(), 2);
    }

    #[test]
    fn store_does_not_enforce_capacity() {
        let mut store = EntryStore::with_capacity(1);
        for i in 0..8 {
            store.insert(i, Entry::new(i, slot()));
        }
        assert_eq!(store.len(), 8);
        store.clear();
        assert!(store.is_empty());
    }
}
