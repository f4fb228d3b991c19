use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::LfuMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Writes snapshots in the Prometheus text exposition format.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Hands back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(writer, "# TYPE {name} {kind}");
        let _ = writeln!(writer, "{name} {value}");
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send + Sync> MetricsExporter<LfuMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &LfuMetricsSnapshot) {
        let counters = [
            ("get_calls_total", snapshot.get_calls),
            ("get_hits_total", snapshot.get_hits),
            ("get_misses_total", snapshot.get_misses),
            ("insert_calls_total", snapshot.insert_calls),
            ("insert_updates_total", snapshot.insert_updates),
            ("insert_new_total", snapshot.insert_new),
            ("insert_rejected_total", snapshot.insert_rejected),
            ("evict_calls_total", snapshot.evict_calls),
            ("evicted_entries_total", snapshot.evicted_entries),
            ("clear_calls_total", snapshot.clear_calls),
            ("pop_lfu_calls_total", snapshot.pop_lfu_calls),
            ("pop_lfu_found_total", snapshot.pop_lfu_found),
            ("peek_lfu_calls_total", snapshot.peek_lfu_calls),
            ("peek_lfu_found_total", snapshot.peek_lfu_found),
            ("frequency_calls_total", snapshot.frequency_calls),
            ("frequency_found_total", snapshot.frequency_found),
        ];
        for (suffix, value) in counters {
            self.write_metric("counter", suffix, value);
        }

        self.write_metric("gauge", "cache_len", snapshot.cache_len as u64);
        self.write_metric("gauge", "capacity", snapshot.capacity as u64);
        self.write_metric("gauge", "bucket_count", snapshot.bucket_count as u64);
        self.write_metric("gauge", "min_frequency", snapshot.min_frequency);
    }
}
