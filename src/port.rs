use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::fmt::{Display, Formatter};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cli::{Backend, Mode};

/// Baud rate used when a path is opened as a serial port (8N1, no flow control).
const DEFAULT_BAUD: u32 = 9600;

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("open {path} as serial port")]
    Serial {
        path: String,
        #[source]
        source: serialport::Error,
    },
    #[error("open {path}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Anything a device loop can read from and write to.
pub trait DeviceIo: Read + Write + Send {}

impl<T: Read + Write + Send> DeviceIo for T {}

/// Modem status lines of a serial port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModemLines {
    /// clear to send
    pub cts: bool,
    /// carrier detect
    pub cd: bool,
    /// ring indicator
    pub ri: bool,
    /// data set ready
    pub dsr: bool,
}

impl ModemLines {
    /// Unreadable lines count as deasserted.
    fn sample(port: &mut dyn SerialPort) -> Self {
        Self {
            cts: port.read_clear_to_send().unwrap_or(false),
            cd: port.read_carrier_detect().unwrap_or(false),
            ri: port.read_ring_indicator().unwrap_or(false),
            dsr: port.read_data_set_ready().unwrap_or(false),
        }
    }
}

impl Display for ModemLines {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CTS: {} CD: {} RI: {} DSR: {}",
            self.cts, self.cd, self.ri, self.dsr
        )
    }
}

/// Devices that may expose modem status lines.
pub trait ModemStatus {
    /// `None` when the device has no modem lines (plain files, pipes, mocks).
    fn modem_lines(&mut self) -> Option<ModemLines> {
        None
    }
}

enum Handle {
    Serial(Box<dyn SerialPort>),
    Stream(Box<dyn DeviceIo>),
}

/// Exclusively owned device handle, released when dropped.
pub struct Device {
    path: String,
    handle: Handle,
}

impl Device {
    /// Wrap a non-serial handle (plain file, pipe, test double).
    pub fn from_io(path: impl Into<String>, io: Box<dyn DeviceIo>) -> Self {
        Self {
            path: path.into(),
            handle: Handle::Stream(io),
        }
    }

    fn from_serial(path: impl Into<String>, port: Box<dyn SerialPort>) -> Self {
        Self {
            path: path.into(),
            handle: Handle::Serial(port),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolved backend; never `Auto`.
    pub fn backend(&self) -> Backend {
        match self.handle {
            Handle::Serial(_) => Backend::Serial,
            Handle::Stream(_) => Backend::File,
        }
    }
}

impl ModemStatus for Device {
    fn modem_lines(&mut self) -> Option<ModemLines> {
        match &mut self.handle {
            Handle::Serial(port) => Some(ModemLines::sample(port.as_mut())),
            Handle::Stream(_) => None,
        }
    }
}

impl Read for Device {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.handle {
            Handle::Serial(port) => port.read(buf),
            Handle::Stream(io) => io.read(buf),
        }
    }
}

impl Write for Device {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.handle {
            Handle::Serial(port) => port.write(buf),
            Handle::Stream(io) => io.write(buf),
        }
    }
    fn flush(&mut self) -> io::Result<()> {
        match &mut self.handle {
            Handle::Serial(port) => port.flush(),
            Handle::Stream(io) => io.flush(),
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("flush {} on release: {}", self.path, e);
        }
        debug!("released {} ({:?})", self.path, self.backend());
    }
}

/// Open `path` exactly once.
///
/// `Auto` tries the serial driver on character devices and keeps that handle;
/// only a character device that is not a terminal (serial open fails with
/// `ENOTTY`, reported as `Unknown`) falls back to a plain file. Only `File`
/// creates a missing transmit target.
pub fn open_device(
    path: &str,
    backend: Backend,
    mode: Mode,
    timeout: Duration,
) -> Result<Device, OpenError> {
    let mut device = match backend {
        Backend::Serial => open_serial(path, timeout)?,
        Backend::File => Device::from_io(path, Box::new(open_file(path, mode, true)?)),
        Backend::Auto if is_char_device(path) => match open_serial(path, timeout) {
            Ok(dev) => dev,
            Err(OpenError::Serial { source, .. })
                if matches!(source.kind(), serialport::ErrorKind::Unknown) =>
            {
                debug!("{} is not a serial port ({}), opening as file", path, source);
                Device::from_io(path, Box::new(open_file(path, mode, false)?))
            }
            Err(e) => return Err(e),
        },
        Backend::Auto => Device::from_io(path, Box::new(open_file(path, mode, false)?)),
    };
    debug!("opened {} ({:?}) for {:?}", path, device.backend(), mode);
    if let Some(lines) = device.modem_lines() {
        debug!("{} modem lines: {}", path, lines);
    }
    Ok(device)
}

#[cfg(unix)]
fn is_char_device(path: &str) -> bool {
    use std::os::unix::fs::FileTypeExt;
    std::fs::metadata(path)
        .map(|m| m.file_type().is_char_device())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_char_device(_: &str) -> bool {
    false
}

fn open_serial(path: &str, timeout: Duration) -> Result<Device, OpenError> {
    let port = serialport::new(path, DEFAULT_BAUD)
        .timeout(timeout)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .open()
        .map_err(|source| OpenError::Serial {
            path: path.to_string(),
            source,
        })?;
    Ok(Device::from_serial(path, port))
}

/// Transmit only writes; receive needs both directions. `create` makes a
/// missing transmit target a new regular file.
fn open_file(path: &str, mode: Mode, create: bool) -> Result<File, OpenError> {
    let mut options = OpenOptions::new();
    match mode {
        Mode::Transmit => options.write(true).create(create).truncate(true),
        Mode::Receive => options.read(true).write(true),
    };
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOCTTY);
    }
    options.open(path).map_err(|source| OpenError::File {
        path: path.to_string(),
        source,
    })
}
