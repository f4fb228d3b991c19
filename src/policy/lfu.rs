//! # LFU (Least Frequently Used) Cache
//!
//! Fixed-capacity cache that evicts the entry with the smallest access count,
//! breaking ties by evicting the one touched least recently. `get`, `put` and
//! eviction are all O(1).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                          LfuCache<K, V>                                  │
//!   │                                                                          │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │  EntryStore<K, V>:  K -> Entry { value, freq, slot }               │ │
//!   │   └──────────────────────────────┬─────────────────────────────────────┘ │
//!   │                                  │ slot                                  │
//!   │                                  ▼                                       │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │  FrequencyBuckets<K>                                               │ │
//!   │   │                                                                    │ │
//!   │   │  min_freq ──► freq=1: [OLD] ◄─► k3 ◄─► k4 ◄─► [NEW]                 │ │
//!   │   │                  │                                                 │ │
//!   │   │                  ▼                                                 │ │
//!   │   │               freq=2: [OLD] ◄─► k1 ◄─► [NEW]                        │ │
//!   │   │                  │                                                 │ │
//!   │   │                  ▼                                                 │ │
//!   │   │               freq=5: [OLD] ◄─► k2 ◄─► [NEW]                        │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   │                                                                          │
//!   │   capacity: usize  (0 disables the cache)                                │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Touch (every hit)
//!
//! ```text
//!   get(k1) / put(k1, v)
//!        │
//!        ▼
//!   detach k1 from bucket f      (bucket f released if it empties)
//!   f' = f + 1
//!   ensure bucket f'             (linked right after f, O(1))
//!   append k1 at newest end of f'
//! ```
//!
//! ## Eviction (new key, cache full)
//!
//! ```text
//!   minimum bucket ──► pop oldest ──► remove key from EntryStore
//!        then insert the new key at freq=1, newest end
//! ```
//!
//! ## Operations
//!
//! | Method           | Complexity | Access? | Description                       |
//! |------------------|------------|---------|-----------------------------------|
//! | `get(&k)`        | O(1)       | yes     | Value on hit, `None` on miss      |
//! | `put(k, v)`      | O(1)       | yes     | Insert or update, may evict       |
//! | `peek(&k)`       | O(1)       | no      | Value without touching            |
//! | `contains(&k)`   | O(1)       | no      | Membership                        |
//! | `frequency(&k)`  | O(1)       | no      | Current access count              |
//! | `peek_lfu()`     | O(1)       | no      | Next eviction victim              |
//! | `pop_lfu()`      | O(1)       | -       | Evict the victim now              |
//! | `clear()`        | O(n)       | -       | Drop everything                   |
//!
//! ## Zero Capacity
//!
//! A cache built with capacity 0 is disabled: `get` always misses and `put`
//! is ignored, whether or not the key was seen before.
//!
//! ## Integer Sentinel
//!
//! `get` reports presence through `Option`. Callers that want the classic
//! `-1` miss value can use [`LfuCache::get_or_miss`] on `i32` values; they must
//! not store [`MISS`] itself.
//!
//! ## Thread Safety
//!
//! Not thread-safe. `get` mutates frequency state, so sharing a cache needs a
//! single lock around every call (`Mutex<LfuCache<..>>`), not a read lock.
//!
//! ## Example
//!
//! ```
//! use lfukit::policy::lfu::LfuCache;
//!
//! let mut cache = LfuCache::new(2);
//! cache.put(1, 1);
//! cache.put(2, 2);
//! assert_eq!(cache.get(&1), Some(&1)); // freq(1)=2, freq(2)=1
//!
//! cache.put(3, 3);                     // evicts 2
//! assert_eq!(cache.get(&2), None);
//! assert_eq!(cache.get(&3), Some(&3)); // freq(3)=2
//!
//! cache.put(4, 4);                     // 1 and 3 tie at 2; 1 touched earlier
//! assert_eq!(cache.get(&1), None);
//! assert_eq!(cache.get(&3), Some(&3));
//! assert_eq!(cache.get(&4), Some(&4));
//! ```

use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::builder::LfuCacheBuilder;
use crate::ds::FrequencyBuckets;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LfuMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LfuMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, LfuMetricsReadRecorder, LfuMetricsRecorder, MetricsSnapshotProvider,
};
use crate::store::{Entry, EntryStore};
use crate::traits::{CoreCache, LfuCacheTrait};

/// Miss value returned by [`LfuCache::get_or_miss`].
pub const MISS: i32 = -1;

/// Largest accepted capacity.
///
/// Every live entry and every bucket's two sentinels occupy one arena slot
/// addressed by a `u32`, and there are never more buckets than entries.
pub const MAX_CAPACITY: usize = (u32::MAX / 3) as usize;

/// Fixed-capacity LFU cache with least-recently-touched tie-breaking.
///
/// See the module documentation for the structure and complexity.
#[derive(Debug)]
pub struct LfuCache<K, V> {
    store: EntryStore<K, V>,
    buckets: FrequencyBuckets<K>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LfuMetrics,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries. `0` disables it.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_CAPACITY`]; use
    /// [`try_with_capacity`](Self::try_with_capacity) for untrusted input.
    pub fn new(capacity: usize) -> Self {
        LfuCacheBuilder::new(capacity).build()
    }

    /// Fallible constructor for capacities coming from signed or wider
    /// integers. Negative and oversized values are rejected.
    ///
    /// ```
    /// use lfukit::policy::lfu::LfuCache;
    ///
    /// assert!(LfuCache::<u64, u64>::try_with_capacity(16i32).is_ok());
    /// assert!(LfuCache::<u64, u64>::try_with_capacity(-1i32).is_err());
    /// ```
    pub fn try_with_capacity<C>(capacity: C) -> Result<Self, ConfigError>
    where
        C: TryInto<usize> + Copy + fmt::Display,
    {
        let converted: usize = capacity.try_into().map_err(|_| {
            ConfigError::new(format!(
                "capacity must be a non-negative integer, got {capacity}"
            ))
        })?;
        LfuCacheBuilder::new(converted).try_build()
    }

    pub(crate) fn from_parts(capacity: usize, bucket_hint: usize) -> Self {
        debug!(capacity, bucket_hint, "created LFU cache");
        Self {
            store: EntryStore::with_capacity(capacity),
            buckets: FrequencyBuckets::with_capacity(capacity, bucket_hint.min(capacity)),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LfuMetrics::default(),
        }
    }

    /// Returns the value for `key` and counts the access.
    ///
    /// Misses (including every call on a zero-capacity cache) return `None`
    /// and change nothing.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let Some(entry) = self.store.lookup_mut(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };
        Self::touch(&mut self.buckets, entry);

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        Some(&entry.value)
    }

    /// Inserts or updates `key`; counts as an access.
    ///
    /// Updating keeps the entry's history and bumps its frequency by one. A
    /// new key enters at frequency 1, evicting the least frequently used entry
    /// first if the cache is full. Ignored entirely when capacity is 0.
    pub fn put(&mut self, key: K, value: V) {
        self.upsert(key, value);
    }

    /// Value for `key` without counting an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.store.lookup(key).map(Entry::value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.store.contains(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Access count of `key`. Starts at 1 on insertion.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_frequency_call();

        let freq = self.store.lookup(key).map(Entry::frequency);

        #[cfg(feature = "metrics")]
        if freq.is_some() {
            (&self.metrics).record_frequency_found();
        }

        freq
    }

    /// The entry the next eviction would remove, without touching it.
    pub fn peek_lfu(&self) -> Option<(&K, &V)> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_lfu_call();

        let freq = self.buckets.min_frequency()?;
        let (_, key) = self.buckets.peek_oldest(freq)?;
        let entry = self.store.lookup(key)?;

        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_lfu_found();

        Some((key, &entry.value))
    }

    /// Evicts and returns the least frequently used entry.
    pub fn pop_lfu(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lfu_call();

        if self.store.is_empty() {
            return None;
        }
        let evicted = self.evict_min();

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lfu_found();

        Some(evicted)
    }

    /// Registered frequencies, ascending.
    pub fn frequencies(&self) -> Vec<u64> {
        self.buckets.frequencies()
    }

    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        debug!(dropped = self.store.len(), "cleared LFU cache");
        self.store.clear();
        self.buckets.clear();
    }

    /// Rough heap footprint of the bookkeeping, values excluded.
    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.store.approx_bytes() + self.buckets.approx_bytes()
    }

    /// Verifies that the entry store and the frequency index agree.
    ///
    /// ```
    /// use lfukit::policy::lfu::LfuCache;
    ///
    /// let mut cache = LfuCache::new(3);
    /// for i in 0..10 {
    ///     cache.put(i % 4, i);
    ///     cache.get(&(i % 3));
    ///     cache.check_invariants().unwrap();
    /// }
    /// ```
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.buckets.check_invariants()?;

        if self.store.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.store.len(),
                self.capacity
            )));
        }
        if self.store.len() != self.buckets.len() {
            return Err(InvariantError::new(format!(
                "entry store holds {} keys but buckets hold {}",
                self.store.len(),
                self.buckets.len()
            )));
        }

        for freq in self.buckets.frequencies() {
            for (slot, key) in self.buckets.iter_bucket(freq) {
                let entry = self.store.lookup(key).ok_or_else(|| {
                    InvariantError::new(format!("bucket {freq} holds a key missing from the store"))
                })?;
                if entry.freq != freq {
                    return Err(InvariantError::new(format!(
                        "entry with frequency {} sits in bucket {freq}",
                        entry.freq
                    )));
                }
                if entry.slot != slot {
                    return Err(InvariantError::new(format!(
                        "entry slot {:?} does not match its node {slot:?}",
                        entry.slot
                    )));
                }
            }
        }
        Ok(())
    }

    fn upsert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.capacity == 0 {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            return None;
        }

        if let Some(entry) = self.store.lookup_mut(&key) {
            let previous = std::mem::replace(&mut entry.value, value);
            Self::touch(&mut self.buckets, entry);

            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            return Some(previous);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.store.len() >= self.capacity {
            #[cfg(feature = "metrics")]
            self.metrics.record_evict_call();

            self.evict_min();

            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();
        }

        self.buckets.ensure_bucket(1);
        let slot = self.buckets.append_newest(1, key.clone());
        self.store.insert(key, Entry::new(value, slot));
        None
    }

    /// Moves `entry` one frequency up, to the newest end of its new bucket.
    ///
    /// The target bucket is registered before the entry leaves its current
    /// one so it can be linked next to it without a search.
    fn touch(buckets: &mut FrequencyBuckets<K>, entry: &mut Entry<V>) {
        let current = entry.freq;
        match current.checked_add(1) {
            Some(next) => {
                buckets.ensure_bucket(next);
                buckets.detach(current, entry.slot);
                buckets.attach_newest(next, entry.slot);
                entry.freq = next;
            },
            None => buckets.requeue_newest(current, entry.slot),
        }
    }

    /// Removes the oldest entry of the minimum bucket.
    ///
    /// # Panics
    ///
    /// Panics on an empty cache.
    fn evict_min(&mut self) -> (K, V) {
        let freq = self.buckets.minimum_bucket().frequency();
        let key = self.buckets.pop_oldest(freq);
        let entry = self
            .store
            .remove(&key)
            .expect("evicted key missing from entry store");
        trace!(freq, remaining = self.store.len(), "evicted LFU entry");
        (key, entry.value)
    }
}

impl<K> LfuCache<K, i32>
where
    K: Eq + Hash + Clone,
{
    /// `get` that reports a miss as [`MISS`] (`-1`) instead of `None`.
    ///
    /// ```
    /// use lfukit::policy::lfu::{LfuCache, MISS};
    ///
    /// let mut cache = LfuCache::new(1);
    /// cache.put("a", 7);
    /// assert_eq!(cache.get_or_miss(&"a"), 7);
    /// assert_eq!(cache.get_or_miss(&"b"), MISS);
    /// ```
    pub fn get_or_miss(&mut self, key: &K) -> i32 {
        self.get(key).copied().unwrap_or(MISS)
    }
}

impl<K, V> CoreCache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.upsert(key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LfuCache::get(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        LfuCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LfuCache::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        LfuCache::clear(self)
    }
}

impl<K, V> LfuCacheTrait<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lfu(&mut self) -> Option<(K, V)> {
        LfuCache::pop_lfu(self)
    }

    fn peek_lfu(&self) -> Option<(&K, &V)> {
        LfuCache::peek_lfu(self)
    }

    fn frequency(&self, key: &K) -> Option<u64> {
        LfuCache::frequency(self, key)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        LfuMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            insert_rejected: self.metrics.insert_rejected,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            clear_calls: self.metrics.clear_calls,
            pop_lfu_calls: self.metrics.pop_lfu_calls,
            pop_lfu_found: self.metrics.pop_lfu_found,
            peek_lfu_calls: self.metrics.peek_lfu_calls.get(),
            peek_lfu_found: self.metrics.peek_lfu_found.get(),
            frequency_calls: self.metrics.frequency_calls.get(),
            frequency_found: self.metrics.frequency_found.get(),
            cache_len: self.store.len(),
            capacity: self.capacity,
            bucket_count: self.buckets.bucket_count(),
            min_frequency: self.buckets.min_frequency().unwrap_or(0),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LfuMetricsSnapshot> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LfuMetricsSnapshot {
        self.metrics_snapshot()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Straightforward O(n) model: (key, value, freq, last_touch).
    #[derive(Default)]
    struct Model {
        capacity: usize,
        clock: u64,
        entries: Vec<(u8, u32, u64, u64)>,
    }

    impl Model {
        fn get(&mut self, key: u8) -> Option<u32> {
            self.clock += 1;
            let clock = self.clock;
            let entry = self.entries.iter_mut().find(|e| e.0 == key)?;
            entry.2 += 1;
            entry.3 = clock;
            Some(entry.1)
        }

        fn put(&mut self, key: u8, value: u32) {
            if self.capacity == 0 {
                return;
            }
            self.clock += 1;
            let clock = self.clock;
            if let Some(entry) = self.entries.iter_mut().find(|e| e.0 == key) {
                entry.1 = value;
                entry.2 += 1;
                entry.3 = clock;
                return;
            }
            if self.entries.len() >= self.capacity {
                let victim = self
                    .entries
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, e)| (e.2, e.3))
                    .map(|(i, _)| i)
                    .unwrap();
                self.entries.swap_remove(victim);
            }
            self.entries.push((key, value, 1, clock));
        }
    }

    proptest! {
        /// Property: the cache agrees with a naive LFU model on every step.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_naive_model(
            capacity in 0usize..6,
            ops in prop::collection::vec((any::<bool>(), 0u8..10, any::<u32>()), 0..200)
        ) {
            let mut cache = LfuCache::new(capacity);
            let mut model = Model { capacity, ..Default::default() };

            for (is_get, key, value) in ops {
                if is_get {
                    prop_assert_eq!(cache.get(&key).copied(), model.get(key));
                } else {
                    cache.put(key, value);
                    model.put(key, value);
                }

                prop_assert!(cache.check_invariants().is_ok());
                prop_assert_eq!(cache.len(), model.entries.len());
                for (k, v, freq, _) in &model.entries {
                    prop_assert_eq!(cache.peek(k), Some(v));
                    prop_assert_eq!(cache.frequency(k), Some(*freq));
                }
            }
        }

        /// Property: a disabled cache stays empty under any interleaving.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_zero_capacity_stays_empty(
            ops in prop::collection::vec((any::<bool>(), any::<u16>()), 0..100)
        ) {
            let mut cache: LfuCache<u16, i32> = LfuCache::new(0);
            for (is_get, key) in ops {
                if is_get {
                    prop_assert_eq!(cache.get_or_miss(&key), MISS);
                } else {
                    cache.put(key, i32::from(key));
                }
                prop_assert!(cache.is_empty());
            }
        }

        /// Property: put followed by get returns the value just stored.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_put_get_round_trip(
            capacity in 1usize..8,
            pairs in prop::collection::vec((any::<u16>(), any::<u64>()), 1..64)
        ) {
            let mut cache = LfuCache::new(capacity);
            for (key, value) in pairs {
                cache.put(key, value);
                prop_assert_eq!(cache.get(&key), Some(&value));
            }
        }
    }
}
