use clap::{Parser, ValueEnum};
use tracing::warn;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "term-test",
    about = "Exercise a serial or character device: send test lines (tx) or echo bytes (rx)"
)]
pub struct Cli {
    /// Device path (serial port, pty or plain file)
    pub device: Option<String>,
    /// "rx" to echo received bytes; anything else transmits test lines
    pub mode: Option<String>,
    /// How the device is opened
    #[arg(long, value_enum, default_value_t = Backend::Auto)]
    pub backend: Backend,
    /// Serial read timeout in milliseconds (bounds how long Ctrl-C can go unnoticed)
    #[arg(long, default_value_t = 100)]
    pub timeout_ms: u64,
    /// Stop receiving after echoing this many bytes
    #[arg(long)]
    pub max_bytes: Option<u64>,
    /// Debug logging on stderr
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Serial port if the path is a terminal, plain file otherwise
    Auto,
    /// Always open through the serial port driver
    Serial,
    /// Always open as a plain file
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Transmit,
    Receive,
}

impl Mode {
    /// Decode the mode token. Only `rx` selects receive.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("rx") => Mode::Receive,
            None | Some("tx") => Mode::Transmit,
            Some(other) => {
                warn!("unrecognized mode {:?}, running tx", other);
                Mode::Transmit
            }
        }
    }
}

/// The one-line usage message.
pub fn usage(prog: &str) -> String {
    format!("{} <device> [<mode>]", prog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rx_selects_receive() {
        let cases: &[(Option<&str>, Mode)] = &[
            (Some("rx"), Mode::Receive),
            (Some("tx"), Mode::Transmit),
            (Some(""), Mode::Transmit),
            (Some("xyz"), Mode::Transmit),
            (Some("RX"), Mode::Transmit),
            (Some("rx "), Mode::Transmit),
            (None, Mode::Transmit),
        ];
        for (token, want) in cases {
            assert_eq!(Mode::from_token(*token), *want, "token {:?}", token);
        }
    }

    #[test]
    fn positionals_are_optional() {
        let cli = Cli::try_parse_from(["term-test"]).unwrap();
        assert!(cli.device.is_none());
        assert!(cli.mode.is_none());

        let cli = Cli::try_parse_from(["term-test", "/dev/ttyUSB0", "rx", "--max-bytes", "4"])
            .unwrap();
        assert_eq!(cli.device.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(cli.mode.as_deref(), Some("rx"));
        assert_eq!(cli.max_bytes, Some(4));
        assert_eq!(cli.backend, Backend::Auto);
        assert_eq!(cli.timeout_ms, 100);
    }

    #[test]
    fn usage_line() {
        assert_eq!(usage("term_test"), "term_test <device> [<mode>]");
    }
}
