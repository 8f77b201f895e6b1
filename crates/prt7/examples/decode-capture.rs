//! Decode a capture file with the library API and print the hidden message.
//!
//!   cargo run -p prt7 --example decode-capture -- capture.log

use std::fs::File;

use prt7::decode::{DecodeError, Decoder, NullSink};
use prt7::frame::{LineError, LineReader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: decode-capture <FILE>")?;

    let mut reader = LineReader::new(File::open(&path)?);
    let mut decoder = Decoder::new();
    decoder.initialize()?;

    let mut skipped = 0usize;
    loop {
        let line = match reader.read_line() {
            Ok(line) => line,
            Err(LineError::ConnectionClosed) => break,
            Err(LineError::LineTooLong { .. }) => {
                skipped += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        match decoder.feed_line(&line) {
            Ok(event) => println!("{line:>12}  {event}"),
            Err(DecodeError::Parse(_)) => skipped += 1,
            Err(err) => return Err(err.into()),
        }
    }

    let report = decoder.shutdown(&mut NullSink)?;
    println!("message: {}", report.rendered);
    println!("frames: {}, skipped lines: {skipped}", report.frames_applied);
    Ok(())
}
