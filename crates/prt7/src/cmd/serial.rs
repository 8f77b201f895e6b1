use std::path::Path;

use prt7_decode::{DecoderConfig, ShutdownReport};

use crate::cmd::{parse_duration, SerialArgs};
use crate::driver::{PumpOptions, RejectPolicy};
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

/// Sent after opening the port; interactive emitters start streaming on it.
pub const WAKE_COMMAND: &str = "AUTO";

pub fn run(args: SerialArgs, format: OutputFormat, config: &DecoderConfig) -> CliResult<i32> {
    let idle_timeout = args
        .idle_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()?;
    let options = PumpOptions {
        frame_limit: args.frames,
        idle_timeout,
        ..PumpOptions::new(RejectPolicy::Drop)
    };
    decode_port(&args.port, args.baud, !args.no_wake, options, format, config)?;
    Ok(SUCCESS)
}

/// Decode one session from a serial port until Ctrl-C, end of stream, or
/// an `options` limit.
#[cfg(unix)]
pub fn decode_port(
    port: &Path,
    baud: u32,
    wake: bool,
    options: PumpOptions,
    format: OutputFormat,
    config: &DecoderConfig,
) -> CliResult<ShutdownReport> {
    use prt7_frame::{LineReader, LineWriter};
    use prt7_link::{SerialConfig, SerialLink};
    use tracing::{info, warn};

    use crate::driver::{finish, pump, start_decoder, Interruptible};
    use crate::exit::{line_error, link_error};
    use crate::output::TraceSink;

    let defaults = SerialConfig::default();
    let serial = SerialConfig {
        baud,
        read_timeout: config.frame.read_timeout.or(defaults.read_timeout),
    };
    let mut link =
        SerialLink::open(port, &serial).map_err(|err| link_error("serial open failed", err))?;

    if wake {
        if let Err(err) = LineWriter::new(&mut link).write_line(WAKE_COMMAND) {
            warn!(%err, "wake command not sent");
        }
    }

    let interrupt = Interruptible::arm()?;
    let mut reader = LineReader::with_config(link, config.frame.clone());
    let mut decoder = start_decoder(config)?;
    let mut sink = TraceSink::stdout(format);
    info!(port = %port.display(), baud, "reading frames; Ctrl-C to stop");

    let pumped = pump(
        &mut reader,
        &mut decoder,
        &mut sink,
        options,
        interrupt.running(),
    );
    let report = finish(&mut decoder, &mut sink)?;
    let outcome = pumped.map_err(|err| line_error("serial read failed", err))?;
    info!(
        applied = outcome.applied,
        dropped = outcome.rejected,
        end = ?outcome.end,
        "serial session ended"
    );
    Ok(report)
}

#[cfg(not(unix))]
pub fn decode_port(
    _port: &Path,
    _baud: u32,
    _wake: bool,
    _options: PumpOptions,
    _format: OutputFormat,
    _config: &DecoderConfig,
) -> CliResult<ShutdownReport> {
    Err(crate::exit::link_error(
        "serial open failed",
        prt7_link::LinkError::Unsupported("serial"),
    ))
}
