//! Metrics trait hierarchy.
//!
//! Recorders only write counters, providers only read them, exporters only
//! publish snapshots. [`LfuMetricsRecorder`] extends [`CoreMetricsRecorder`]
//! with the frequency-specific signals.

/// Counters shared by any cache.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    /// A `put` ignored because the cache is disabled.
    fn record_insert_rejected(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// LFU-specific counters for `&mut self` paths.
pub trait LfuMetricsRecorder: CoreMetricsRecorder {
    fn record_pop_lfu_call(&mut self);
    fn record_pop_lfu_found(&mut self);
}

/// LFU counters bumped from `&self` methods.
pub trait LfuMetricsReadRecorder {
    fn record_peek_lfu_call(&self);
    fn record_peek_lfu_found(&self);
    fn record_frequency_call(&self);
    fn record_frequency_found(&self);
}

/// Point-in-time copy of a cache's counters and gauges.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Publishes snapshots to a monitoring backend.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
