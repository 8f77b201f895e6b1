use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};

use crate::error::LineError;
use crate::frame::Frame;

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Writes newline-terminated lines to any `Write` sink.
///
/// Used for link commands (the serial wake-up line) and by emitters that
/// replay frames into a decoder.
pub struct LineWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> LineWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Write `line` followed by `\n` and flush.
    pub fn write_line(&mut self, line: &str) -> Result<(), LineError> {
        self.buf.clear();
        self.buf.reserve(line.len() + 1);
        self.buf.put_slice(line.as_bytes());
        self.buf.put_u8(b'\n');

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(LineError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(LineError::Io(err)),
            }
        }

        self.inner.flush().map_err(LineError::Io)
    }

    /// Write a frame in wire form.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), LineError> {
        self.write_line(&frame.to_string())
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::reader::LineReader;

    #[test]
    fn writes_terminated_lines() {
        let mut writer = LineWriter::new(Vec::new());
        writer.write_line("AUTO").unwrap();
        writer.write_frame(&Frame::Load(' ')).unwrap();
        writer.write_frame(&Frame::Map(-2)).unwrap();

        assert_eq!(writer.into_inner(), b"AUTO\nL,\nM,-2\n");
    }

    #[test]
    fn closed_sink_is_reported() {
        let mut writer = LineWriter::new(ZeroWriter);
        assert!(matches!(
            writer.write_line("L,A"),
            Err(LineError::ConnectionClosed)
        ));
    }

    #[test]
    #[cfg(unix)]
    fn frames_cross_a_socket_link() {
        let dir = std::env::temp_dir().join(format!("prt7-frame-uds-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let sock_path = dir.join("frames.sock");
        let socket = prt7_link::LineSocket::bind(&sock_path).unwrap();

        let path_clone = sock_path.clone();
        let emitter = std::thread::spawn(move || {
            let link = prt7_link::LineSocket::connect(&path_clone).unwrap();
            let mut writer = LineWriter::new(link);
            for frame in [Frame::Load('H'), Frame::Map(3), Frame::Load(' ')] {
                writer.write_frame(&frame).unwrap();
            }
        });

        let mut reader = LineReader::new(socket.accept().unwrap());
        let frames: Vec<Frame> = (0..3)
            .map(|_| parse(&reader.read_line().unwrap()).unwrap())
            .collect();
        assert_eq!(
            frames,
            vec![Frame::Load('H'), Frame::Map(3), Frame::Load(' ')]
        );

        emitter.join().unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
