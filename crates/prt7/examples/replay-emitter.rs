//! Replay the demo frame sequence into a listening decoder.
//!
//! Start a decoder first:
//!   prt7 listen /tmp/prt7.sock
//! then run:
//!   cargo run -p prt7 --example replay-emitter -- /tmp/prt7.sock

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::thread;
    use std::time::Duration;

    use prt7::decode::DEMO_FRAMES;
    use prt7::frame::LineWriter;
    use prt7::link::LineSocket;

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/tmp/prt7.sock".to_string());

    let link = LineSocket::connect(&path)?;
    let mut writer = LineWriter::new(link);

    // Emitters print a banner before the stream starts.
    writer.write_line("PRT-7 emitter ready")?;
    for line in DEMO_FRAMES {
        writer.write_line(line)?;
        println!("sent {line}");
        thread::sleep(Duration::from_millis(200));
    }

    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("replay-emitter needs Unix domain sockets");
}
