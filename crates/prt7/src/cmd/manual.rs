use std::io::{IsTerminal, Read, Write};

use prt7_decode::{DecoderConfig, ShutdownReport};
use prt7_frame::{LineError, LineReader};
use tracing::debug;

use crate::cmd::ManualArgs;
use crate::driver::{decode_line, finish, start_decoder, RejectPolicy};
use crate::exit::{line_error, CliResult, SUCCESS};
use crate::output::{OutputFormat, TraceSink};

/// Lines starting with this end a manual session.
pub const QUIT_COMMAND: &str = "quit";

pub fn run(args: ManualArgs, format: OutputFormat, config: &DecoderConfig) -> CliResult<i32> {
    if !args.no_help && format == OutputFormat::Pretty {
        print_protocol_help();
    }
    let mut input = LineReader::with_config(std::io::stdin().lock(), config.frame.clone());
    decode_interactive(&mut input, format, config)?;
    Ok(SUCCESS)
}

pub fn print_protocol_help() {
    println!("Manual frame entry");
    println!("  L,<c>   LOAD: decode symbol <c> and append it (e.g. L,A or \"L, \")");
    println!("  M,<n>   MAP: rotate the rotor by <n> positions (e.g. M,2 or M,-3)");
    println!("Type '{QUIT_COMMAND}' or send end of input to finish.");
}

/// Run one session over lines typed on `input`.
///
/// Ends on a line starting with `quit` or at end of input. Lines that are
/// not frames are reported and the session carries on.
pub fn decode_interactive<R: Read>(
    input: &mut LineReader<R>,
    format: OutputFormat,
    config: &DecoderConfig,
) -> CliResult<ShutdownReport> {
    let prompt = format == OutputFormat::Pretty && std::io::stdin().is_terminal();
    let mut decoder = start_decoder(config)?;
    let mut sink = TraceSink::stdout(format);

    loop {
        if prompt {
            print!("frame> ");
            let _ = std::io::stdout().flush();
        }
        match input.read_line() {
            Ok(line) if line.starts_with(QUIT_COMMAND) => {
                debug!("quit requested");
                break;
            }
            Ok(line) => {
                decode_line(&mut decoder, &mut sink, &line, RejectPolicy::Report)?;
            }
            Err(err @ LineError::LineTooLong { .. }) => sink.rejected("...", &err),
            Err(LineError::ConnectionClosed) => break,
            Err(err) => {
                finish(&mut decoder, &mut sink)?;
                return Err(line_error("stdin read failed", err));
            }
        }
    }

    finish(&mut decoder, &mut sink)
}
