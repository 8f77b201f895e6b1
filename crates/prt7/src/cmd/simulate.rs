use std::thread;
use std::time::Duration;

use prt7_decode::{DecoderConfig, ShutdownReport, DEMO_FRAMES};
use tracing::info;

use crate::cmd::{parse_duration, SimulateArgs};
use crate::driver::{decode_line, finish, start_decoder, RejectPolicy};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{OutputFormat, TraceSink};

pub fn run(args: SimulateArgs, format: OutputFormat, config: &DecoderConfig) -> CliResult<i32> {
    let delay = args.delay.as_deref().map(parse_duration).transpose()?;
    decode_demo(format, config, delay)?;
    Ok(SUCCESS)
}

/// Replay the demo emitter through a fresh session.
pub fn decode_demo(
    format: OutputFormat,
    config: &DecoderConfig,
    delay: Option<Duration>,
) -> CliResult<ShutdownReport> {
    info!(frames = DEMO_FRAMES.len(), "replaying demo emitter");
    let mut decoder = start_decoder(config)?;
    let mut sink = TraceSink::stdout(format);

    for line in DEMO_FRAMES {
        decode_line(&mut decoder, &mut sink, line, RejectPolicy::Report)?;
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
    }

    finish(&mut decoder, &mut sink)
}
