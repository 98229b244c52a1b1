use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info};

use crate::message::{LINE_COUNT, test_line};
use crate::stats::Stats;
use crate::stop::StopToken;

/// Send the numbered test lines. Stops early only if `stop` fires between lines.
pub fn run<W: Write + ?Sized>(dev: &mut W, stop: &StopToken) -> Result<Stats> {
    let mut stats = Stats::new();

    for i in 0..LINE_COUNT {
        if stop.is_stopped() {
            info!("[tx] stopped after {} lines", stats.lines);
            return Ok(stats);
        }
        let line = test_line(i);
        dev.write_all(line.as_bytes())
            .with_context(|| format!("write test line {}", i))?;
        debug!("[tx] {}", line.trim_end());
        stats.add_bytes(line.len());
        stats.inc_lines();
    }

    info!("[tx] done: {}", stats.summary());
    Ok(stats)
}
