//! Builder for [`LfuCache`].
//!
//! Collects the construction parameters in one place and validates them
//! before anything is allocated.
//!
//! ## Example
//!
//! ```rust
//! use lfukit::builder::LfuCacheBuilder;
//!
//! let mut cache = LfuCacheBuilder::new(100)
//!     .bucket_hint(8)
//!     .build::<u64, String>();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::hash::Hash;

use crate::ds::DEFAULT_BUCKET_PREALLOC;
use crate::error::ConfigError;
use crate::policy::lfu::{LfuCache, MAX_CAPACITY};

/// Construction parameters for an [`LfuCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LfuCacheBuilder {
    capacity: usize,
    bucket_hint: usize,
}

impl LfuCacheBuilder {
    /// Starts a builder for a cache of `capacity` entries. `0` builds a
    /// disabled cache.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            bucket_hint: DEFAULT_BUCKET_PREALLOC,
        }
    }

    /// Number of distinct frequencies to reserve room for up front.
    ///
    /// Only affects preallocation; it is clamped to the capacity.
    pub fn bucket_hint(mut self, hint: usize) -> Self {
        self.bucket_hint = hint;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::new(format!(
                "capacity {} exceeds the maximum of {MAX_CAPACITY}",
                self.capacity
            )));
        }
        Ok(())
    }

    /// Builds the cache, reporting invalid parameters as an error.
    pub fn try_build<K, V>(self) -> Result<LfuCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        self.validate()?;
        Ok(LfuCache::from_parts(self.capacity, self.bucket_hint))
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics if the capacity exceeds [`MAX_CAPACITY`].
    pub fn build<K, V>(self) -> LfuCache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("invalid LFU cache configuration: {err}"),
        }
    }
}
