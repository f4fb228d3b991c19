//! # Cache Traits
//!
//! Generic interfaces over the cache, so callers can be written against the
//! operations they need rather than the concrete [`LfuCache`](crate::policy::lfu::LfuCache).
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │            CoreCache<K, V>              │
//!   │                                         │
//!   │  insert(&mut, K, V) → Option<V>         │
//!   │  get(&mut, &K) → Option<&V>             │
//!   │  contains(&, &K) → bool                 │
//!   │  len(&) → usize                         │
//!   │  is_empty(&) → bool                     │
//!   │  capacity(&) → usize                    │
//!   │  clear(&mut)                            │
//!   └──────────────────┬──────────────────────┘
//!                      │
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │          LfuCacheTrait<K, V>            │
//!   │                                         │
//!   │  pop_lfu() → Option<(K, V)>             │
//!   │  peek_lfu() → Option<(&K, &V)>          │
//!   │  frequency(&K) → Option<u64>            │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! There is no `remove(&K)`: entries leave the cache only through
//! eviction, `pop_lfu` or `clear`.
//!
//! `get` counts as an access. Implementations that track frequency must bump
//! it on every hit; `contains`, `len` and `frequency` never do.

/// Operations every cache supports.
///
/// ```
/// use lfukit::policy::lfu::LfuCache;
/// use lfukit::traits::CoreCache;
///
/// fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, &str)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.to_string());
///     }
/// }
///
/// let mut cache = LfuCache::new(8);
/// warm(&mut cache, &[(1, "one"), (2, "two")]);
/// assert_eq!(CoreCache::len(&cache), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts or updates `key`, returning the value it replaced.
    ///
    /// Updating an existing key counts as an access. Inserting a new key into
    /// a full cache evicts first.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Returns the value for `key` and records the access.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Membership check; not an access.
    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of live entries.
    fn capacity(&self) -> usize;

    /// Drops every entry. Capacity is unchanged.
    fn clear(&mut self);
}

/// Frequency-aware inspection and explicit eviction.
///
/// ```
/// use lfukit::policy::lfu::LfuCache;
/// use lfukit::traits::{CoreCache, LfuCacheTrait};
///
/// let mut cache = LfuCache::new(4);
/// cache.insert(1, "one");
/// cache.insert(2, "two");
/// cache.get(&2);
///
/// assert_eq!(cache.frequency(&2), Some(2));
/// assert_eq!(cache.peek_lfu(), Some((&1, &"one")));
/// assert_eq!(cache.pop_lfu(), Some((1, "one")));
/// ```
pub trait LfuCacheTrait<K, V>: CoreCache<K, V> {
    /// Removes and returns the entry that would be evicted next: lowest
    /// frequency, least recently touched among ties.
    fn pop_lfu(&mut self) -> Option<(K, V)>;

    /// The next eviction victim, without touching it.
    fn peek_lfu(&self) -> Option<(&K, &V)>;

    /// Current access count of `key`; not an access.
    fn frequency(&self, key: &K) -> Option<u64>;
}
