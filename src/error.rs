//! Error types for lfukit.
//!
//! Cache operations themselves never fail: a miss is `None`, a `put` on a
//! disabled cache is ignored. Errors only appear at the edges:
//!
//! - [`ConfigError`]: rejected construction parameters, e.g. a negative
//!   capacity passed to [`LfuCache::try_with_capacity`](crate::policy::lfu::LfuCache::try_with_capacity).
//! - [`InvariantError`]: reported by `check_invariants` when the internal
//!   structure is inconsistent. Seeing one means a bug in this crate.
//!
//! ```
//! use lfukit::error::ConfigError;
//! use lfukit::policy::lfu::LfuCache;
//!
//! let cache: Result<LfuCache<u32, u32>, ConfigError> = LfuCache::try_with_capacity(-1i64);
//! assert!(cache.unwrap_err().to_string().contains("capacity"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Describes the first internal invariant found broken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Returned by fallible constructors when a parameter is out of range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
