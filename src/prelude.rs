pub use crate::builder::LfuCacheBuilder;
pub use crate::ds::{Bucket, FrequencyBuckets, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LfuMetricsSnapshot;
pub use crate::policy::lfu::{LfuCache, MAX_CAPACITY, MISS};
pub use crate::store::{Entry, EntryStore};
pub use crate::traits::{CoreCache, LfuCacheTrait};
