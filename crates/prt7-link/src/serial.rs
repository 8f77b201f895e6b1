use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{LinkError, Result};
use crate::stream::LinkStream;

/// Baud rate used when none is requested (the emitter firmware default).
pub const DEFAULT_BAUD: u32 = 9600;

/// Poll interval for serial reads. Short enough to notice Ctrl-C promptly.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Baud rates with a termios speed constant on every supported Unix.
pub const SUPPORTED_BAUD_RATES: [u32; 9] = [
    1200, 2400, 4800, 9600, 19200, 38400, 57600, 115_200, 230_400,
];

/// Line settings for a serial link. Always raw 8N1, no flow control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Line speed in bits per second.
    pub baud: u32,
    /// Per-read wait. `None` blocks until a byte arrives.
    pub read_timeout: Option<Duration>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud: DEFAULT_BAUD,
            read_timeout: Some(DEFAULT_POLL_TIMEOUT),
        }
    }
}

/// Serial tty link.
pub struct SerialLink;

impl SerialLink {
    /// Open a tty device and put it in raw mode at the configured speed.
    ///
    /// Input already queued in the driver is discarded so decoding starts
    /// on a fresh line.
    pub fn open(path: impl AsRef<Path>, config: &SerialConfig) -> Result<LinkStream> {
        let path = path.as_ref().to_path_buf();
        let speed = baud_constant(config.baud).ok_or(LinkError::UnsupportedBaud(config.baud))?;

        // O_NONBLOCK keeps open() from waiting on carrier detect; it is
        // cleared again once the line is configured.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(&path)
            .map_err(|source| LinkError::Open {
                path: path.clone(),
                source,
            })?;

        let mut port = SerialPort {
            file,
            path,
            polling: false,
        };
        port.configure(speed, config.read_timeout)
            .map_err(|source| LinkError::Configure {
                path: port.path.clone(),
                source,
            })?;

        info!(path = ?port.path, baud = config.baud, "serial link open");
        Ok(LinkStream::from_serial(port))
    }
}

pub(crate) struct SerialPort {
    file: File,
    path: PathBuf,
    /// Reads return after VTIME; a zero-byte read means the poll expired.
    polling: bool,
}

impl SerialPort {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        let fd = self.file.as_raw_fd();
        let mut tty = get_termios(fd).map_err(|source| LinkError::Configure {
            path: self.path.clone(),
            source,
        })?;
        self.polling = apply_read_timeout(&mut tty, timeout);
        set_termios(fd, &tty).map_err(|source| LinkError::Configure {
            path: self.path.clone(),
            source,
        })
    }

    fn configure(&mut self, speed: libc::speed_t, timeout: Option<Duration>) -> io::Result<()> {
        let fd = self.file.as_raw_fd();
        let mut tty = get_termios(fd)?;

        // SAFETY: `tty` is an initialized termios obtained from tcgetattr.
        unsafe {
            libc::cfmakeraw(&mut tty);
            if libc::cfsetispeed(&mut tty, speed) != 0 || libc::cfsetospeed(&mut tty, speed) != 0
            {
                return Err(io::Error::last_os_error());
            }
        }
        tty.c_cflag |= libc::CLOCAL | libc::CREAD;
        tty.c_cflag &= !(libc::CSTOPB | libc::PARENB);
        self.polling = apply_read_timeout(&mut tty, timeout);
        set_termios(fd, &tty)?;

        // SAFETY: `fd` is an open descriptor owned by `self.file`.
        unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFL);
            if flags < 0 || libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) < 0 {
                return Err(io::Error::last_os_error());
            }
            libc::tcflush(fd, libc::TCIFLUSH);
        }
        debug!(path = ?self.path, polling = self.polling, "serial line configured");
        Ok(())
    }
}

impl Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.file.read(buf)?;
        if n == 0 && self.polling && !buf.is_empty() {
            return Err(io::Error::from(ErrorKind::TimedOut));
        }
        Ok(n)
    }
}

impl Write for SerialPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn baud_constant(baud: u32) -> Option<libc::speed_t> {
    let speed = match baud {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        _ => return None,
    };
    Some(speed)
}

/// VMIN/VTIME for the requested timeout. Returns whether reads poll.
fn apply_read_timeout(tty: &mut libc::termios, timeout: Option<Duration>) -> bool {
    match timeout {
        Some(timeout) => {
            let deciseconds = (timeout.as_millis() / 100).clamp(1, 255) as libc::cc_t;
            tty.c_cc[libc::VMIN] = 0;
            tty.c_cc[libc::VTIME] = deciseconds;
            true
        }
        None => {
            tty.c_cc[libc::VMIN] = 1;
            tty.c_cc[libc::VTIME] = 0;
            false
        }
    }
}

fn get_termios(fd: RawFd) -> io::Result<libc::termios> {
    let mut tty = std::mem::MaybeUninit::<libc::termios>::uninit();
    // SAFETY: tcgetattr fully initializes `tty` when it returns 0.
    let rc = unsafe { libc::tcgetattr(fd, tty.as_mut_ptr()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: checked rc above.
    Ok(unsafe { tty.assume_init() })
}

fn set_termios(fd: RawFd, tty: &libc::termios) -> io::Result<()> {
    // SAFETY: `tty` points to a valid termios and `fd` is open.
    let rc = unsafe { libc::tcsetattr(fd, libc::TCSANOW, tty) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
