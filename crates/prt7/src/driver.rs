use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use prt7_decode::{DecodeError, Decoder, DecoderConfig, ShutdownReport};
use prt7_frame::{LineError, LineReader, ParseError};
use tracing::{debug, info};

use crate::exit::{decode_error, CliError, CliResult, INTERNAL, INTERRUPTED};
use crate::output::TraceSink;

/// What happens to lines that carry no frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectPolicy {
    /// Show them to the user (interactive and strict sources).
    Report,
    /// Drop them with a debug log (noisy links).
    Drop,
}

#[derive(Clone, Copy, Debug)]
pub struct PumpOptions {
    pub policy: RejectPolicy,
    /// Stop after this many frames were applied.
    pub frame_limit: Option<usize>,
    /// Stop after this long without any line arriving.
    pub idle_timeout: Option<Duration>,
}

impl PumpOptions {
    pub fn new(policy: RejectPolicy) -> Self {
        Self {
            policy,
            frame_limit: None,
            idle_timeout: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PumpEnd {
    /// The source reached end of stream.
    Closed,
    /// The running flag was cleared (Ctrl-C).
    Interrupted,
    FrameLimit,
    Idle,
    /// The decoder refused a line (no active session).
    Refused,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PumpOutcome {
    pub applied: usize,
    pub rejected: usize,
    pub end: PumpEnd,
}

/// A decoder with a fresh active session.
pub fn start_decoder(config: &DecoderConfig) -> CliResult<Decoder> {
    let mut decoder = Decoder::with_config(config.clone());
    decoder
        .initialize()
        .map_err(|err| decode_error("decoder initialization failed", err))?;
    Ok(decoder)
}

pub fn finish<W: Write>(
    decoder: &mut Decoder,
    sink: &mut TraceSink<W>,
) -> CliResult<ShutdownReport> {
    decoder
        .shutdown(sink)
        .map_err(|err| decode_error("decoder shutdown failed", err))
}

/// Feed one line. Returns whether a frame was applied.
///
/// Blank lines are never reported.
pub fn decode_line<W: Write>(
    decoder: &mut Decoder,
    sink: &mut TraceSink<W>,
    line: &str,
    policy: RejectPolicy,
) -> CliResult<bool> {
    match decoder.process_line(line, sink) {
        Ok(_) => Ok(true),
        Err(DecodeError::Parse(ParseError::Empty)) => Ok(false),
        Err(DecodeError::Parse(err)) => {
            match policy {
                RejectPolicy::Report => sink.rejected(line, &err),
                RejectPolicy::Drop => debug!(line, %err, "dropped non-frame line"),
            }
            Ok(false)
        }
        Err(err) => Err(decode_error("decode failed", err)),
    }
}

/// Decode lines from `reader` until the source closes, `running` is
/// cleared, or one of the `options` limits is hit.
///
/// Read timeouts only count toward the idle limit. Oversized lines count as
/// rejected.
pub fn pump<R: Read, W: Write>(
    reader: &mut LineReader<R>,
    decoder: &mut Decoder,
    sink: &mut TraceSink<W>,
    options: PumpOptions,
    running: &AtomicBool,
) -> Result<PumpOutcome, LineError> {
    let mut outcome = PumpOutcome {
        applied: 0,
        rejected: 0,
        end: PumpEnd::Interrupted,
    };
    let mut last_line = Instant::now();

    while running.load(Ordering::SeqCst) {
        match reader.read_line() {
            Ok(line) => {
                last_line = Instant::now();
                match decode_line(decoder, sink, &line, options.policy) {
                    Ok(true) => outcome.applied += 1,
                    Ok(false) if !line.trim().is_empty() => outcome.rejected += 1,
                    Ok(false) => {}
                    Err(err) => {
                        debug!(%err, "decoder refused line");
                        outcome.end = PumpEnd::Refused;
                        break;
                    }
                }
                if options
                    .frame_limit
                    .is_some_and(|limit| outcome.applied >= limit)
                {
                    outcome.end = PumpEnd::FrameLimit;
                    break;
                }
            }
            Err(LineError::Timeout) => {
                if options
                    .idle_timeout
                    .is_some_and(|idle| last_line.elapsed() >= idle)
                {
                    info!("no data within idle timeout");
                    outcome.end = PumpEnd::Idle;
                    break;
                }
            }
            Err(err @ LineError::LineTooLong { .. }) => {
                outcome.rejected += 1;
                match options.policy {
                    RejectPolicy::Report => sink.rejected("...", &err),
                    RejectPolicy::Drop => debug!(%err, "dropped oversized line"),
                }
            }
            Err(LineError::ConnectionClosed) => {
                outcome.end = PumpEnd::Closed;
                break;
            }
            Err(err) => return Err(err),
        }
    }

    debug!(?outcome, "line source finished");
    Ok(outcome)
}

static RUNNING: AtomicBool = AtomicBool::new(true);
static ARMED: AtomicBool = AtomicBool::new(false);
static HANDLER: OnceLock<()> = OnceLock::new();

/// Routes Ctrl-C to the current session while held.
///
/// Armed, Ctrl-C clears [`running`](Self::running) so the session can shut
/// down and print its report. Outside of any armed section Ctrl-C exits the
/// process with [`INTERRUPTED`].
pub struct Interruptible {
    _armed: (),
}

impl Interruptible {
    pub fn arm() -> CliResult<Self> {
        if HANDLER.get().is_none() {
            ctrlc::set_handler(|| {
                if ARMED.load(Ordering::SeqCst) {
                    RUNNING.store(false, Ordering::SeqCst);
                } else {
                    std::process::exit(INTERRUPTED);
                }
            })
            .map_err(|err| {
                CliError::new(INTERNAL, format!("signal handler setup failed: {err}"))
            })?;
            let _ = HANDLER.set(());
        }
        RUNNING.store(true, Ordering::SeqCst);
        ARMED.store(true, Ordering::SeqCst);
        Ok(Self { _armed: () })
    }

    pub fn running(&self) -> &'static AtomicBool {
        &RUNNING
    }
}

impl Drop for Interruptible {
    fn drop(&mut self) {
        ARMED.store(false, Ordering::SeqCst);
    }
}
