//! lfukit: a fixed-capacity LFU cache with O(1) lookup, insertion and
//! eviction.
//!
//! Entries are evicted by lowest access count, ties broken by least recent
//! touch. See `DESIGN.md` for the internal architecture.
//!
//! ```
//! use lfukit::LfuCache;
//!
//! let mut cache = LfuCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");
//! cache.put("c", 3);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod store;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;

pub use policy::lfu::{LfuCache, MISS};
