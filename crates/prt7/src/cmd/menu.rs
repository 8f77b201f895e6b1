use std::io::{Read, Write};
use std::path::PathBuf;

use prt7_decode::DecoderConfig;
use prt7_frame::{LineError, LineReader};

use super::DEFAULT_BAUD;
use crate::cmd::{manual, serial, simulate, MenuArgs};
use crate::driver::{PumpOptions, RejectPolicy};
use crate::exit::{line_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Simulate,
    Manual,
    Serial,
    Exit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Simulate),
            "2" => Some(Self::Manual),
            "3" => Some(Self::Serial),
            "4" => Some(Self::Exit),
            _ => None,
        }
    }
}

pub fn run(_args: MenuArgs, format: OutputFormat, config: &DecoderConfig) -> CliResult<i32> {
    let mut input = LineReader::new(std::io::stdin().lock());

    loop {
        print_menu();
        let Some(answer) = prompt(&mut input, "Option: ")? else {
            break;
        };
        let choice = match Choice::parse(&answer) {
            Some(Choice::Exit) => {
                println!("Closing the decoder...");
                break;
            }
            Some(choice) => choice,
            None => {
                println!("Invalid option. Choose 1, 2, 3 or 4.");
                continue;
            }
        };

        // Each operation gets a fresh decoder; failures go back to the menu.
        let result = match choice {
            Choice::Simulate => simulate::decode_demo(format, config, None).map(drop),
            Choice::Manual => {
                manual::print_protocol_help();
                manual::decode_interactive(&mut input, format, config).map(drop)
            }
            Choice::Serial => run_serial(&mut input, format, config),
            Choice::Exit => Ok(()),
        };
        if let Err(err) = result {
            eprintln!("error: {err}");
        }

        let again = prompt(&mut input, "Run another operation? (y/n): ")?;
        if !again.is_some_and(|answer| answer.trim().eq_ignore_ascii_case("y")) {
            break;
        }
    }

    println!("Program finished.");
    Ok(SUCCESS)
}

fn print_menu() {
    println!();
    println!("PRT-7 decoder");
    println!("  1. Simulate demo emitter");
    println!("  2. Manual frame entry");
    println!("  3. Read from serial port");
    println!("  4. Exit");
}

fn run_serial<R: Read>(
    input: &mut LineReader<R>,
    format: OutputFormat,
    config: &DecoderConfig,
) -> CliResult<()> {
    let Some(port) = prompt(input, "Serial port (e.g. /dev/ttyACM0): ")? else {
        return Ok(());
    };
    let baud = prompt(input, &format!("Baud rate [{DEFAULT_BAUD}]: "))?
        .as_deref()
        .and_then(parse_baud)
        .unwrap_or(DEFAULT_BAUD);

    serial::decode_port(
        &PathBuf::from(port.trim()),
        baud,
        true,
        PumpOptions::new(RejectPolicy::Drop),
        format,
        config,
    )
    .map(drop)
}

/// A positive baud rate, or `None` to fall back to the default.
fn parse_baud(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok().filter(|baud| *baud > 0)
}

/// Print `text` and read one answer. `None` at end of input.
fn prompt<R: Read>(input: &mut LineReader<R>, text: &str) -> CliResult<Option<String>> {
    print!("{text}");
    let _ = std::io::stdout().flush();
    match input.read_line() {
        Ok(line) => Ok(Some(line)),
        Err(LineError::ConnectionClosed) => Ok(None),
        Err(LineError::LineTooLong { .. }) => Ok(Some(String::new())),
        Err(err) => Err(line_error("stdin read failed", err)),
    }
}
