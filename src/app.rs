use anyhow::{Context, Result};
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

use crate::cli::{Cli, Mode, usage};
use crate::message::LINE_COUNT;
use crate::port::open_device;
use crate::rx::{self, RxEnd};
use crate::stop::StopToken;
use crate::tx;

/// Exit status for a usage error (`exit(-1)` on most platforms).
const USAGE_EXIT: u8 = 255;
/// 128 + SIGINT.
const INTERRUPTED_EXIT: u8 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Arguments were missing; usage was printed and nothing was opened.
    Usage,
    Completed,
    Interrupted,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Usage => ExitCode::from(USAGE_EXIT),
            Outcome::Completed => ExitCode::SUCCESS,
            Outcome::Interrupted => ExitCode::from(INTERRUPTED_EXIT),
        }
    }
}

/// Validate arguments, open the device once and run the selected loop.
///
/// `out` receives the usage line and the per-byte receive diagnostics. The
/// device is dropped (and so released) before this returns, on every path.
pub fn run<O: Write>(cli: &Cli, prog: &str, stop: &StopToken, out: &mut O) -> Result<Outcome> {
    let Some(path) = cli.device.as_deref() else {
        writeln!(out, "{}", usage(prog)).context("print usage")?;
        return Ok(Outcome::Usage);
    };
    let mode = Mode::from_token(cli.mode.as_deref());

    let mut dev = open_device(
        path,
        cli.backend,
        mode,
        Duration::from_millis(cli.timeout_ms),
    )?;
    info!("{:?} on {} ({:?})", mode, dev.path(), dev.backend());

    let stopped = match mode {
        Mode::Transmit => {
            let stats = tx::run(&mut dev, stop)?;
            stats.lines < u64::from(LINE_COUNT)
        }
        Mode::Receive => rx::run(&mut dev, out, stop, cli.max_bytes)? == RxEnd::Stopped,
    };

    Ok(if stopped {
        Outcome::Interrupted
    } else {
        Outcome::Completed
    })
}
