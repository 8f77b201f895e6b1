use std::io::{Read, Write};
use std::time::Duration;

use crate::error::Result;

/// An open line-source link. Implements Read + Write.
///
/// Serial ttys and Unix domain socket connections look the same to the
/// line reader above this layer. A read that outlives the configured read
/// timeout fails with `ErrorKind::TimedOut` (sockets may report
/// `WouldBlock` instead, depending on the platform).
pub struct LinkStream {
    inner: LinkInner,
}

enum LinkInner {
    #[cfg(unix)]
    Serial(crate::serial::SerialPort),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkInner::Serial(port) => port.read(buf),
            #[cfg(unix)]
            LinkInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkInner::Serial(port) => port.write(buf),
            #[cfg(unix)]
            LinkInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkInner::Serial(port) => port.flush(),
            #[cfg(unix)]
            LinkInner::Unix(stream) => stream.flush(),
        }
    }
}

impl LinkStream {
    #[cfg(unix)]
    pub(crate) fn from_serial(port: crate::serial::SerialPort) -> Self {
        Self {
            inner: LinkInner::Serial(port),
        }
    }

    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: LinkInner::Unix(stream),
        }
    }

    /// Set how long a single read may wait for data.
    ///
    /// `None` blocks until at least one byte arrives. Serial ttys round the
    /// timeout to tenths of a second (between 0.1 s and 25.5 s).
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkInner::Serial(port) => port.set_read_timeout(timeout),
            #[cfg(unix)]
            LinkInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Link kind for diagnostics.
    pub fn kind(&self) -> &'static str {
        match &self.inner {
            #[cfg(unix)]
            LinkInner::Serial(_) => "serial",
            #[cfg(unix)]
            LinkInner::Unix(_) => "unix-domain-socket",
        }
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            #[cfg(unix)]
            LinkInner::Serial(port) => f
                .debug_struct("LinkStream")
                .field("kind", &"serial")
                .field("path", &port.path())
                .finish(),
            #[cfg(unix)]
            LinkInner::Unix(_) => f
                .debug_struct("LinkStream")
                .field("kind", &"unix-domain-socket")
                .finish(),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::ErrorKind;
    use std::os::unix::net::UnixStream;

    #[test]
    fn unix_stream_reads_and_writes() {
        let (left, right) = UnixStream::pair().unwrap();
        let mut writer = LinkStream::from_unix(left);
        let mut reader = LinkStream::from_unix(right);

        writer.write_all(b"L,A\n").unwrap();
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf).unwrap();

        assert_eq!(&buf, b"L,A\n");
        assert_eq!(reader.kind(), "unix-domain-socket");
    }

    #[test]
    fn unix_read_timeout_surfaces_as_error() {
        let (_left, right) = UnixStream::pair().unwrap();
        let mut reader = LinkStream::from_unix(right);
        reader
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();

        let mut buf = [0u8; 8];
        let err = reader.read(&mut buf).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::WouldBlock | ErrorKind::TimedOut
        ));
    }
}
