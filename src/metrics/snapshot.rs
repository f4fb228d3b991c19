#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LfuMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub insert_rejected: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub clear_calls: u64,

    pub pop_lfu_calls: u64,
    pub pop_lfu_found: u64,
    pub peek_lfu_calls: u64,
    pub peek_lfu_found: u64,
    pub frequency_calls: u64,
    pub frequency_found: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
    pub bucket_count: usize,
    pub min_frequency: u64,
}

impl LfuMetricsSnapshot {
    /// Hits over total `get` calls, `0.0` before the first call.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_ratio_handles_zero_calls() {
        assert_eq!(LfuMetricsSnapshot::default().hit_ratio(), 0.0);
        let snapshot = LfuMetricsSnapshot {
            get_calls: 4,
            get_hits: 3,
            ..Default::default()
        };
        assert!((snapshot.hit_ratio() - 0.75).abs() < f64::EPSILON);
    }
}
