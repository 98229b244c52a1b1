use anyhow::{Context, Result};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use tracing::{debug, info};

use crate::message::byte_repr;
use crate::port::ModemStatus;
use crate::stats::Stats;
use crate::stop::StopToken;

/// Pause after a zero-length read so a quiet plain file does not spin.
const IDLE_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxEnd {
    /// The stop token fired.
    Stopped,
    /// The byte limit was reached.
    Limit,
}

/// Echo loop: read one byte, print it to `out`, write it back, flush.
///
/// Runs until `stop` fires or `limit` bytes have been echoed. Timeouts and
/// interrupted reads are idle ticks; any other I/O error ends the run. On a
/// read timeout the modem lines are sampled and logged when they change.
pub fn run<D, O>(dev: &mut D, out: &mut O, stop: &StopToken, limit: Option<u64>) -> Result<RxEnd>
where
    D: Read + Write + ModemStatus + ?Sized,
    O: Write + ?Sized,
{
    let mut stats = Stats::new();
    let mut buf = [0u8; 1];
    let mut lines = dev.modem_lines();

    info!("[rx] echoing until interrupted");

    let end = loop {
        if stop.is_stopped() {
            break RxEnd::Stopped;
        }
        if let Some(max) = limit
            && stats.bytes >= max
        {
            break RxEnd::Limit;
        }

        match dev.read(&mut buf) {
            Ok(0) => {
                std::thread::sleep(IDLE_POLL);
                continue;
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::TimedOut => {
                let now = dev.modem_lines();
                if now != lines {
                    if let Some(l) = now {
                        info!("[rx] modem lines: {}", l);
                    }
                    lines = now;
                }
                continue;
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                continue;
            }
            Err(e) => return Err(e).context("device read"),
        }

        let b = buf[0];
        writeln!(out, "{}", byte_repr(b)).context("print received byte")?;
        dev.write_all(&buf).context("device echo write")?;
        dev.flush().context("device flush")?;
        debug!("[rx] echoed 0x{:02x}", b);
        stats.add_bytes(1);
        if b == b'\n' {
            stats.inc_lines();
        }
    };

    info!("[rx] {:?}: {}", end, stats.summary());
    Ok(end)
}
