//! Frequency index: one recency-ordered bucket per live access frequency.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       FrequencyBuckets<K> Layout                        │
//! │                                                                         │
//! │   buckets: FxHashMap<u64, Bucket>        nodes: SlotArena<Node<K>>      │
//! │                                                                         │
//! │   min_freq = 1                                                          │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   freq=1: [OLD] ◄──► [b] ◄──► [c] ◄──► [NEW]                            │
//! │             │                    │                                      │
//! │             │   evict first      └── touched most recently              │
//! │             │ next                                                      │
//! │             ▼                                                           │
//! │   freq=3: [OLD] ◄──► [a] ◄──► [NEW]                                     │
//! │                                                                         │
//! │   [OLD]/[NEW] are payload-free sentinel slots owned by each bucket.     │
//! │   Registered buckets are chained by frequency (prev/next), so the       │
//! │   minimum and the next larger frequency are both O(1).                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A bucket is registered only while it holds at least one entry. Detaching the
//! last entry releases the bucket and its sentinels immediately.
//!
//! ## Operations
//!
//! | Operation          | Time  | Notes                                        |
//! |--------------------|-------|----------------------------------------------|
//! | `bucket_for`       | O(1)  | Lookup by frequency                          |
//! | `ensure_bucket`    | O(1)* | O(b) only when neither `f - 1` nor min fit   |
//! | `minimum_bucket`   | O(1)  | Panics when empty                            |
//! | `append_newest`    | O(1)  | Allocates a node at the newest end           |
//! | `attach_newest`    | O(1)  | Re-links a detached node                     |
//! | `detach`           | O(1)  | Releases the bucket if it empties            |
//! | `pop_oldest`       | O(1)  | Detaches and frees the oldest node           |
//!
//! ## Example
//!
//! ```
//! use lfukit::ds::FrequencyBuckets;
//!
//! let mut index: FrequencyBuckets<&str> = FrequencyBuckets::new();
//! index.ensure_bucket(1);
//! let a = index.append_newest(1, "a");
//! index.append_newest(1, "b");
//!
//! // Promote "a" to frequency 2.
//! index.ensure_bucket(2);
//! index.detach(1, a);
//! index.attach_newest(2, a);
//!
//! assert_eq!(index.min_frequency(), Some(1));
//! assert_eq!(index.pop_oldest(1), "b");
//! assert_eq!(index.min_frequency(), Some(2));
//! ```

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

/// Default bucket pre-allocation. Live frequencies cluster at small values.
pub const DEFAULT_BUCKET_PREALLOC: usize = 32;

/// List node. Sentinels carry no key.
#[derive(Debug)]
struct Node<K> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    key: Option<K>,
}

impl<K> Node<K> {
    fn sentinel() -> Self {
        Self {
            prev: None,
            next: None,
            key: None,
        }
    }
}

/// Entries sharing one frequency, oldest end to newest end.
#[derive(Debug, Clone)]
pub struct Bucket {
    freq: u64,
    oldest: SlotId,
    newest: SlotId,
    len: usize,
    prev: Option<u64>,
    next: Option<u64>,
}

impl Bucket {
    #[inline]
    pub fn frequency(&self) -> u64 {
        self.freq
    }

    /// Live entries, sentinels excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Next smaller registered frequency.
    #[inline]
    pub fn prev_frequency(&self) -> Option<u64> {
        self.prev
    }

    /// Next larger registered frequency.
    #[inline]
    pub fn next_frequency(&self) -> Option<u64> {
        self.next
    }
}

/// Ordered frequency -> bucket index over an arena of list nodes.
///
/// Keys are opaque here; the index never hashes them. Callers keep the
/// [`SlotId`] returned by [`append_newest`](Self::append_newest) to find an
/// entry's position again.
#[derive(Debug)]
pub struct FrequencyBuckets<K> {
    nodes: SlotArena<Node<K>>,
    buckets: FxHashMap<u64, Bucket>,
    min_freq: u64,
    len: usize,
}

impl<K> FrequencyBuckets<K> {
    pub fn new() -> Self {
        Self::with_capacity(0, DEFAULT_BUCKET_PREALLOC)
    }

    /// Reserves room for `capacity` entries and `bucket_hint` distinct frequencies.
    pub fn with_capacity(capacity: usize, bucket_hint: usize) -> Self {
        Self {
            nodes: SlotArena::with_capacity(capacity + 2 * bucket_hint),
            buckets: FxHashMap::with_capacity_and_hasher(bucket_hint, Default::default()),
            min_freq: 0,
            len: 0,
        }
    }

    /// Live entries across all buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of registered buckets.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn bucket_for(&self, freq: u64) -> Option<&Bucket> {
        self.buckets.get(&freq)
    }

    /// Smallest registered frequency, or `None` when nothing is tracked.
    #[inline]
    pub fn min_frequency(&self) -> Option<u64> {
        (self.min_freq != 0).then_some(self.min_freq)
    }

    /// Bucket holding the eviction candidate.
    ///
    /// # Panics
    ///
    /// Panics if no bucket is registered.
    #[inline]
    pub fn minimum_bucket(&self) -> &Bucket {
        self.buckets
            .get(&self.min_freq)
            .expect("minimum_bucket called on an empty frequency index")
    }

    /// Returns the bucket for `freq`, registering an empty one if absent.
    ///
    /// A freshly registered bucket is empty until something is appended to it;
    /// callers must append before the next [`release_if_empty`](Self::release_if_empty)
    /// sweep or the bucket is dropped again.
    pub fn ensure_bucket(&mut self, freq: u64) -> &Bucket {
        assert!(freq > 0, "frequencies start at 1");
        if !self.buckets.contains_key(&freq) {
            let (prev, next) = self.neighbours_of(freq);
            self.insert_bucket(freq, prev, next);
        }
        &self.buckets[&freq]
    }

    /// Unregisters `freq` if it holds no entries. Returns whether it was released.
    pub fn release_if_empty(&mut self, freq: u64) -> bool {
        let Some(bucket) = self.buckets.get(&freq) else {
            return false;
        };
        if bucket.len > 0 {
            return false;
        }
        let bucket = self
            .buckets
            .remove(&freq)
            .expect("bucket vanished during release");

        if let Some(prev) = bucket.prev
            && let Some(prev_bucket) = self.buckets.get_mut(&prev)
        {
            prev_bucket.next = bucket.next;
        }
        if let Some(next) = bucket.next
            && let Some(next_bucket) = self.buckets.get_mut(&next)
        {
            next_bucket.prev = bucket.prev;
        }
        if self.min_freq == freq {
            self.min_freq = bucket.next.unwrap_or(0);
        }

        self.nodes.remove(bucket.oldest);
        self.nodes.remove(bucket.newest);
        trace!(freq, "released empty frequency bucket");
        true
    }

    /// Allocates a node for `key` at the newest end of `freq`'s bucket.
    ///
    /// # Panics
    ///
    /// Panics if `freq` is not registered.
    pub fn append_newest(&mut self, freq: u64, key: K) -> SlotId {
        let id = self.nodes.insert(Node {
            prev: None,
            next: None,
            key: Some(key),
        });
        self.link_newest(freq, id);
        id
    }

    /// Re-links a previously [`detach`](Self::detach)ed node at the newest end
    /// of `freq`'s bucket.
    ///
    /// # Panics
    ///
    /// Panics if `freq` is not registered or `id` is not a detached entry node.
    pub fn attach_newest(&mut self, freq: u64, id: SlotId) {
        debug_assert!(
            self.nodes
                .get(id)
                .is_some_and(|node| node.key.is_some() && node.prev.is_none()),
            "attach_newest expects a detached entry node"
        );
        self.link_newest(freq, id);
    }

    /// Unlinks `id` from `freq`'s bucket, keeping its slot alive, and releases
    /// the bucket if this was its last entry.
    ///
    /// # Panics
    ///
    /// Panics if `freq` is not registered or `id` is not linked.
    pub fn detach(&mut self, freq: u64, id: SlotId) {
        self.unlink(id);
        let bucket = self
            .buckets
            .get_mut(&freq)
            .expect("detach from an unregistered bucket");
        assert!(bucket.len > 0, "detach from an empty bucket");
        bucket.len -= 1;
        self.len -= 1;
        self.release_if_empty(freq);
    }

    /// Moves `id` to the newest end of its own bucket without changing its
    /// frequency. Used once a frequency counter saturates.
    pub fn requeue_newest(&mut self, freq: u64, id: SlotId) {
        self.unlink(id);
        let bucket = self
            .buckets
            .get_mut(&freq)
            .expect("requeue in an unregistered bucket");
        bucket.len -= 1;
        self.len -= 1;
        self.link_newest(freq, id);
    }

    /// Detaches and frees the oldest entry of `freq`'s bucket, returning its key.
    ///
    /// # Panics
    ///
    /// Panics if `freq` is not registered.
    pub fn pop_oldest(&mut self, freq: u64) -> K {
        let id = self
            .oldest_id(freq)
            .expect("pop_oldest on a missing or empty bucket");
        self.detach(freq, id);
        self.nodes
            .remove(id)
            .and_then(|node| node.key)
            .expect("popped node carried no key")
    }

    /// Detaches and frees an arbitrary entry node, returning its key.
    pub fn remove(&mut self, freq: u64, id: SlotId) -> K {
        self.detach(freq, id);
        self.nodes
            .remove(id)
            .and_then(|node| node.key)
            .expect("removed node carried no key")
    }

    /// Oldest entry of `freq`'s bucket without touching it.
    pub fn peek_oldest(&self, freq: u64) -> Option<(SlotId, &K)> {
        let id = self.oldest_id(freq)?;
        let key = self.nodes.get(id)?.key.as_ref()?;
        Some((id, key))
    }

    pub fn key(&self, id: SlotId) -> Option<&K> {
        self.nodes.get(id).and_then(|node| node.key.as_ref())
    }

    /// Entries of one bucket from oldest to newest.
    pub fn iter_bucket(&self, freq: u64) -> BucketIter<'_, K> {
        let (current, end) = match self.buckets.get(&freq) {
            Some(bucket) => (
                self.nodes.get(bucket.oldest).and_then(|node| node.next),
                Some(bucket.newest),
            ),
            None => (None, None),
        };
        BucketIter {
            nodes: &self.nodes,
            current,
            end,
        }
    }

    /// Registered frequencies in ascending order.
    pub fn frequencies(&self) -> Vec<u64> {
        let mut out = Vec::with_capacity(self.buckets.len());
        let mut current = self.min_frequency();
        while let Some(freq) = current {
            out.push(freq);
            current = self.buckets.get(&freq).and_then(|bucket| bucket.next);
        }
        out
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.buckets.clear();
        self.min_freq = 0;
        self.len = 0;
    }

    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.nodes.approx_bytes()
            + self.buckets.capacity() * std::mem::size_of::<(u64, Bucket)>()
    }

    /// Walks every bucket and checks the structural invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.buckets.is_empty() {
            if self.min_freq != 0 || self.len != 0 {
                return Err(InvariantError::new(format!(
                    "no buckets but min_freq={} len={}",
                    self.min_freq, self.len
                )));
            }
            return Ok(());
        }

        let min = self
            .buckets
            .get(&self.min_freq)
            .ok_or_else(|| InvariantError::new(format!("min_freq {} not registered", self.min_freq)))?;
        if min.prev.is_some() {
            return Err(InvariantError::new(format!(
                "min bucket {} has a smaller neighbour {:?}",
                self.min_freq, min.prev
            )));
        }

        let mut total = 0usize;
        let mut visited = 0usize;
        let mut last_freq: Option<u64> = None;
        let mut current = Some(self.min_freq);
        while let Some(freq) = current {
            let bucket = self
                .buckets
                .get(&freq)
                .ok_or_else(|| InvariantError::new(format!("chain points at unregistered bucket {freq}")))?;
            if bucket.freq != freq {
                return Err(InvariantError::new(format!(
                    "bucket registered under {freq} claims frequency {}",
                    bucket.freq
                )));
            }
            if bucket.prev != last_freq {
                return Err(InvariantError::new(format!(
                    "bucket {freq} prev link {:?} != {:?}",
                    bucket.prev, last_freq
                )));
            }
            if let Some(last) = last_freq
                && last >= freq
            {
                return Err(InvariantError::new(format!(
                    "bucket chain not ascending: {last} before {freq}"
                )));
            }
            if bucket.len == 0 {
                return Err(InvariantError::new(format!("bucket {freq} is registered but empty")));
            }

            let counted = self.walk_bucket(bucket)?;
            if counted != bucket.len {
                return Err(InvariantError::new(format!(
                    "bucket {freq} len {} but {counted} linked entries",
                    bucket.len
                )));
            }

            total += counted;
            visited += 1;
            last_freq = Some(freq);
            current = bucket.next;
        }

        if visited != self.buckets.len() {
            return Err(InvariantError::new(format!(
                "chain reaches {visited} of {} registered buckets",
                self.buckets.len()
            )));
        }
        if total != self.len {
            return Err(InvariantError::new(format!(
                "buckets hold {total} entries but len is {}",
                self.len
            )));
        }
        if self.nodes.len() != self.len + 2 * self.buckets.len() {
            return Err(InvariantError::new(format!(
                "arena holds {} nodes, expected {} entries + {} sentinels",
                self.nodes.len(),
                self.len,
                2 * self.buckets.len()
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("frequency index invariant violated: {err}");
        }
    }

    fn walk_bucket(&self, bucket: &Bucket) -> Result<usize, InvariantError> {
        let freq = bucket.freq;
        let head = self
            .nodes
            .get(bucket.oldest)
            .ok_or_else(|| InvariantError::new(format!("bucket {freq} oldest sentinel missing")))?;
        if head.key.is_some() || head.prev.is_some() {
            return Err(InvariantError::new(format!("bucket {freq} oldest sentinel malformed")));
        }

        let mut count = 0usize;
        let mut prev = bucket.oldest;
        let mut current = head.next;
        while let Some(id) = current {
            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| InvariantError::new(format!("bucket {freq}: stale link {id:?}")))?;
            if node.prev != Some(prev) {
                return Err(InvariantError::new(format!(
                    "bucket {freq}: node {id:?} prev link inconsistent"
                )));
            }
            if id == bucket.newest {
                if node.key.is_some() || node.next.is_some() {
                    return Err(InvariantError::new(format!(
                        "bucket {freq} newest sentinel malformed"
                    )));
                }
                return Ok(count);
            }
            if node.key.is_none() {
                return Err(InvariantError::new(format!(
                    "bucket {freq}: foreign sentinel {id:?} inside list"
                )));
            }
            count += 1;
            if count > self.len {
                return Err(InvariantError::new(format!("bucket {freq}: cycle detected")));
            }
            prev = id;
            current = node.next;
        }
        Err(InvariantError::new(format!(
            "bucket {freq}: list ends before newest sentinel"
        )))
    }

    fn oldest_id(&self, freq: u64) -> Option<SlotId> {
        let bucket = self.buckets.get(&freq)?;
        if bucket.len == 0 {
            return None;
        }
        self.nodes.get(bucket.oldest).and_then(|node| node.next)
    }

    /// Registered neighbours a new bucket for `freq` would sit between.
    fn neighbours_of(&self, freq: u64) -> (Option<u64>, Option<u64>) {
        if self.min_freq == 0 {
            return (None, None);
        }
        if freq < self.min_freq {
            return (None, Some(self.min_freq));
        }
        if let Some(below) = freq.checked_sub(1).and_then(|f| self.buckets.get(&f)) {
            return (Some(below.freq), below.next);
        }

        let mut prev = None;
        let mut next = None;
        for &f in self.buckets.keys() {
            if f < freq && prev.is_none_or(|p| f > p) {
                prev = Some(f);
            }
            if f > freq && next.is_none_or(|n| f < n) {
                next = Some(f);
            }
        }
        (prev, next)
    }

    fn insert_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        let oldest = self.nodes.insert(Node::sentinel());
        let newest = self.nodes.insert(Node::sentinel());
        if let Some(node) = self.nodes.get_mut(oldest) {
            node.next = Some(newest);
        }
        if let Some(node) = self.nodes.get_mut(newest) {
            node.prev = Some(oldest);
        }

        self.buckets.insert(
            freq,
            Bucket {
                freq,
                oldest,
                newest,
                len: 0,
                prev,
                next,
            },
        );

        if let Some(prev) = prev
            && let Some(prev_bucket) = self.buckets.get_mut(&prev)
        {
            prev_bucket.next = Some(freq);
        }
        if let Some(next) = next
            && let Some(next_bucket) = self.buckets.get_mut(&next)
        {
            next_bucket.prev = Some(freq);
        }
        if prev.is_none() {
            self.min_freq = freq;
        }
        trace!(freq, ?prev, ?next, "registered frequency bucket");
    }

    fn link_newest(&mut self, freq: u64, id: SlotId) {
        let bucket = self
            .buckets
            .get_mut(&freq)
            .expect("append to an unregistered bucket");
        let newest = bucket.newest;
        let last = self
            .nodes
            .get(newest)
            .and_then(|node| node.prev)
            .expect("newest sentinel lost its back link");

        let node = self.nodes.get_mut(id).expect("linking a stale slot");
        node.prev = Some(last);
        node.next = Some(newest);
        if let Some(last_node) = self.nodes.get_mut(last) {
            last_node.next = Some(id);
        }
        if let Some(sentinel) = self.nodes.get_mut(newest) {
            sentinel.prev = Some(id);
        }

        bucket.len += 1;
        self.len += 1;
    }

    fn unlink(&mut self, id: SlotId) {
        let node = self.nodes.get_mut(id).expect("unlinking a stale slot");
        assert!(node.key.is_some(), "sentinels are never unlinked");
        let prev = node.prev.take().expect("entry node is not linked");
        let next = node.next.take().expect("entry node is not linked");
        if let Some(prev_node) = self.nodes.get_mut(prev) {
            prev_node.next = Some(next);
        }
        if let Some(next_node) = self.nodes.get_mut(next) {
            next_node.prev = Some(prev);
        }
    }
}

impl<K> Default for FrequencyBuckets<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Oldest-to-newest iterator over one bucket.
#[derive(Debug)]
pub struct BucketIter<'a, K> {
    nodes: &'a SlotArena<Node<K>>,
    current: Option<SlotId>,
    end: Option<SlotId>,
}

impl<'a, K> Iterator for BucketIter<'a, K> {
    type Item = (SlotId, &'a K);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        if Some(id) == self.end {
            self.current = None;
            return None;
        }
        let node = self.nodes.get(id)?;
        self.current = node.next;
        node.key.as_ref().map(|key| (id, key))
    }
}
