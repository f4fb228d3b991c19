//! Entry storage for the cache.
//!
//! - [`EntryStore`]: key -> [`Entry`] map, the leaf component of the cache.

pub mod hashmap;

pub use hashmap::{Entry, EntryStore};
