use std::fmt;

/// Counters kept by a buffer pool for diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferStats {
    // fetch_page の呼び出し回数
    pub accesses: u64,
    // page store からの読み出し回数
    pub disk_reads: u64,
    // page store への書き出し回数
    pub disk_writes: u64,
}

impl BufferStats {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Fraction of fetches served without a page-store read.
    pub fn hit_ratio(&self) -> Option<f64> {
        if self.accesses == 0 {
            return None;
        }
        let hits = self.accesses.saturating_sub(self.disk_reads);
        Some(hits as f64 / self.accesses as f64)
    }
}

impl fmt::Display for BufferStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accesses: {}, disk reads: {}, disk writes: {}",
            self.accesses, self.disk_reads, self.disk_writes
        )
    }
}
