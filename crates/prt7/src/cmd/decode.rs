use std::fs::File;
use std::io::Read;
use std::sync::atomic::AtomicBool;

use prt7_decode::DecoderConfig;
use prt7_frame::LineReader;
use tracing::{info, warn};

use crate::cmd::DecodeArgs;
use crate::driver::{finish, pump, start_decoder, PumpOptions, RejectPolicy};
use crate::exit::{io_error, line_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{OutputFormat, TraceSink};

pub fn run(args: DecodeArgs, format: OutputFormat, config: &DecoderConfig) -> CliResult<i32> {
    let source: Box<dyn Read> = match &args.input {
        Some(path) if path.as_os_str() != "-" => Box::new(
            File::open(path)
                .map_err(|err| io_error(&format!("cannot open {}", path.display()), err))?,
        ),
        _ => Box::new(std::io::stdin().lock()),
    };

    let policy = if args.strict {
        RejectPolicy::Report
    } else {
        RejectPolicy::Drop
    };

    let mut reader = LineReader::with_config(source, config.frame.clone());
    let mut decoder = start_decoder(config)?;
    let mut sink = TraceSink::stdout(format);
    let running = AtomicBool::new(true);

    let pumped = pump(
        &mut reader,
        &mut decoder,
        &mut sink,
        PumpOptions::new(policy),
        &running,
    );
    finish(&mut decoder, &mut sink)?;
    let outcome = pumped.map_err(|err| line_error("capture read failed", err))?;

    info!(
        applied = outcome.applied,
        rejected = outcome.rejected,
        "capture decoded"
    );
    if args.strict && outcome.rejected > 0 {
        warn!(rejected = outcome.rejected, "capture contains lines that are not frames");
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}
