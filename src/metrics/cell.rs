use std::cell::Cell;

/// Counter that can be bumped through `&self`.
///
/// Read-only cache methods (`peek_lfu`, `frequency`) still count calls, so
/// their counters need interior mutability. The cache is single-threaded, so a
/// plain `Cell` suffices.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }

    #[inline]
    pub fn reset(&self) {
        self.0.set(0);
    }
}
