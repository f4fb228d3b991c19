//! Optional counters for cache activity (feature `metrics`).
//!
//! Recording, snapshotting and export are split into separate traits:
//!
//! ```text
//!   LfuCache ──record──► LfuMetrics ──snapshot──► LfuMetricsSnapshot ──export──► writer
//!            (LfuMetricsRecorder)   (MetricsSnapshotProvider)      (MetricsExporter)
//! ```

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::LfuMetrics;
pub use snapshot::LfuMetricsSnapshot;
pub use traits::{
    CoreMetricsRecorder, LfuMetricsReadRecorder, LfuMetricsRecorder, MetricsExporter,
    MetricsSnapshotProvider,
};
