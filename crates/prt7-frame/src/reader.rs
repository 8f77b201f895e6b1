use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::debug;

use crate::error::LineError;
use crate::parser::FrameConfig;

const INITIAL_BUFFER_CAPACITY: usize = 256;
const READ_CHUNK_SIZE: usize = 256;

/// Reads newline-delimited text lines from any `Read` source.
///
/// Handles partial reads internally: callers always get whole lines, with
/// the `\n` / `\r\n` terminator stripped and invalid UTF-8 replaced. A final
/// line without terminator is delivered before end of stream is reported.
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    /// Dropping the rest of an oversized line until its newline.
    discarding: bool,
    eof: bool,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new line reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            discarding: false,
            eof: false,
        }
    }

    /// Read the next line (blocking).
    ///
    /// Returns `Err(LineError::ConnectionClosed)` at end of stream and
    /// `Err(LineError::Timeout)` when the source's read timeout expires;
    /// buffered data is kept across timeouts. An oversized line yields
    /// `Err(LineError::LineTooLong)` once and the reader resyncs on the next
    /// newline.
    pub fn read_line(&mut self) -> Result<String, LineError> {
        let max = self.config.max_line_len;
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let raw = self.buf.split_to(pos + 1);
                if std::mem::take(&mut self.discarding) {
                    continue;
                }
                let line = strip_cr(&raw[..pos]);
                if line.len() > max {
                    debug!(len = line.len(), max, "discarding oversized line");
                    return Err(LineError::LineTooLong { max });
                }
                return Ok(String::from_utf8_lossy(line).into_owned());
            }

            if self.discarding {
                self.buf.clear();
            } else if self.buf.len() > max + 1 {
                debug!(max, "line overflowed without newline; resyncing");
                self.buf.clear();
                self.discarding = true;
                return Err(LineError::LineTooLong { max });
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Err(LineError::ConnectionClosed);
                }
                let rest = self.buf.split();
                return Ok(String::from_utf8_lossy(strip_cr(&rest)).into_owned());
            }

            self.fill()?;
        }
    }

    fn fill(&mut self) -> Result<(), LineError> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Err(LineError::Timeout)
                }
                Err(err) => return Err(LineError::Io(err)),
            }
        }
    }

    /// Current reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Yields lines until end of stream. Errors other than end of stream
/// (timeouts, oversized lines) are yielded as items.
impl<T: Read> Iterator for LineReader<T> {
    type Item = Result<String, LineError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_line() {
            Err(LineError::ConnectionClosed) => None,
            other => Some(other),
        }
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_lines_in_order() {
        let mut reader = LineReader::new(Cursor::new(b"L,H\r\nM,2\nL,A\n".to_vec()));

        assert_eq!(reader.read_line().unwrap(), "L,H");
        assert_eq!(reader.read_line().unwrap(), "M,2");
        assert_eq!(reader.read_line().unwrap(), "L,A");
        assert!(matches!(
            reader.read_line(),
            Err(LineError::ConnectionClosed)
        ));
    }

    #[test]
    fn delivers_unterminated_last_line() {
        let mut reader = LineReader::new(Cursor::new(b"L,O\nL,D".to_vec()));

        assert_eq!(reader.read_line().unwrap(), "L,O");
        assert_eq!(reader.read_line().unwrap(), "L,D");
        assert!(matches!(
            reader.read_line(),
            Err(LineError::ConnectionClosed)
        ));
    }

    #[test]
    fn empty_lines_are_lines() {
        let reader = LineReader::new(Cursor::new(b"\n\nL,A\n".to_vec()));
        let lines: Vec<String> = reader.map(Result::unwrap).collect();
        assert_eq!(lines, vec!["", "", "L,A"]);
    }

    #[test]
    fn partial_reads_are_reassembled() {
        let source = ByteByByteReader {
            bytes: b"TX: M,-2\n".to_vec(),
            pos: 0,
        };
        let mut reader = LineReader::new(source);
        assert_eq!(reader.read_line().unwrap(), "TX: M,-2");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut reader = LineReader::new(Cursor::new(vec![0xFF, b'L', b',', b'A', b'\n']));
        assert_eq!(reader.read_line().unwrap(), "\u{FFFD}L,A");
    }

    #[test]
    fn oversized_line_is_reported_then_skipped() {
        let mut wire = vec![b'x'; 64];
        wire.extend_from_slice(b"\nL,B\n");
        let config = FrameConfig {
            max_line_len: 16,
            ..FrameConfig::default()
        };
        let mut reader = LineReader::with_config(Cursor::new(wire), config);

        assert!(matches!(
            reader.read_line(),
            Err(LineError::LineTooLong { max: 16 })
        ));
        assert_eq!(reader.read_line().unwrap(), "L,B");
    }

    #[test]
    fn oversized_line_spanning_reads_resyncs() {
        let mut wire = vec![b'n'; 1000];
        wire.extend_from_slice(b"\nM,4\n");
        let mut reader = LineReader::new(Cursor::new(wire));

        assert!(matches!(
            reader.read_line(),
            Err(LineError::LineTooLong { .. })
        ));
        assert_eq!(reader.read_line().unwrap(), "M,4");
        assert!(matches!(
            reader.read_line(),
            Err(LineError::ConnectionClosed)
        ));
    }

    #[test]
    fn timeout_keeps_buffered_data() {
        let source = TimeoutBetween {
            parts: vec![b"L,".to_vec(), b"Q\n".to_vec()],
            timed_out: false,
        };
        let mut reader = LineReader::new(source);

        assert!(matches!(reader.read_line(), Err(LineError::Timeout)));
        assert_eq!(reader.read_line().unwrap(), "L,Q");
    }

    #[test]
    fn interrupted_read_retries() {
        let source = InterruptedOnce {
            interrupted: false,
            inner: Cursor::new(b"L,Z\n".to_vec()),
        };
        let mut reader = LineReader::new(source);
        assert_eq!(reader.read_line().unwrap(), "L,Z");
    }

    #[test]
    fn io_errors_propagate() {
        let mut reader = LineReader::new(BrokenSource);
        let err = reader.read_line().unwrap_err();
        assert!(matches!(err, LineError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    #[cfg(unix)]
    fn reads_over_a_socket_link() {
        use std::io::Write;

        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let emitter = std::thread::spawn(move || {
            let mut left = left;
            left.write_all(b"L,H\nL,I\n").unwrap();
        });

        let mut reader = LineReader::new(right);
        assert_eq!(reader.read_line().unwrap(), "L,H");
        assert_eq!(reader.read_line().unwrap(), "L,I");
        emitter.join().unwrap();
        assert!(matches!(
            reader.read_line(),
            Err(LineError::ConnectionClosed)
        ));
    }

    #[test]
    fn garbled_bytes_before_a_frame_still_parse() {
        let mut raw = vec![0xFF; 40];
        raw.extend_from_slice(b"L,A\n");
        let mut reader = LineReader::new(Cursor::new(raw));
        assert_eq!(reader.config().max_line_len, crate::DEFAULT_MAX_LINE_LEN);

        let line = reader.read_line().unwrap();
        assert!(line.len() > reader.config().max_line_len);
        assert_eq!(crate::parse(&line), Ok(crate::Frame::Load('A')));
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct TimeoutBetween {
        parts: Vec<Vec<u8>>,
        timed_out: bool,
    }

    impl Read for TimeoutBetween {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.parts.is_empty() {
                return Ok(0);
            }
            if self.parts.len() == 1 && !self.timed_out {
                self.timed_out = true;
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            }
            let part = self.parts.remove(0);
            buf[..part.len()].copy_from_slice(&part);
            Ok(part.len())
        }
    }

    struct InterruptedOnce {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedOnce {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    struct BrokenSource;

    impl Read for BrokenSource {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }
    }
}
