use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Stats {
    pub lines: u64,
    pub bytes: u64,
    t0: Instant,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            lines: 0,
            bytes: 0,
            t0: Instant::now(),
        }
    }
    pub fn add_bytes(&mut self, n: usize) {
        self.bytes += n as u64;
    }
    pub fn inc_lines(&mut self) {
        self.lines += 1;
    }

    /// One-line summary for the end-of-run log.
    pub fn summary(&self) -> String {
        let dur = self.t0.elapsed().as_secs_f64().max(1e-3);
        format!(
            "lines={} bytes={} over {:.1}s => {:.1} B/s",
            self.lines,
            self.bytes,
            dur,
            self.bytes as f64 / dur
        )
    }
}
