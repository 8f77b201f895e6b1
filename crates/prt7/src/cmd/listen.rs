use prt7_decode::DecoderConfig;

use crate::cmd::ListenArgs;
use crate::exit::CliResult;
use crate::output::OutputFormat;

/// Serve frame sources one connection at a time, each in its own session.
#[cfg(unix)]
pub fn run(args: ListenArgs, format: OutputFormat, config: &DecoderConfig) -> CliResult<i32> {
    use std::sync::atomic::Ordering;
    use std::thread;
    use std::time::Duration;

    use prt7_frame::LineReader;
    use prt7_link::serial::DEFAULT_POLL_TIMEOUT;
    use prt7_link::LineSocket;
    use tracing::{info, warn};

    use crate::driver::{finish, pump, start_decoder, Interruptible, PumpOptions, RejectPolicy};
    use crate::exit::{link_error, SUCCESS};
    use crate::output::TraceSink;

    const ACCEPT_POLL: Duration = Duration::from_millis(50);

    let interrupt = Interruptible::arm()?;
    let socket = LineSocket::bind(&args.path).map_err(|err| link_error("bind failed", err))?;
    let running = interrupt.running();
    let mut served = 0usize;

    while running.load(Ordering::SeqCst) {
        let accepted = socket
            .try_accept()
            .map_err(|err| link_error("accept failed", err))?;
        let Some(mut link) = accepted else {
            thread::sleep(ACCEPT_POLL);
            continue;
        };
        served += 1;
        info!(connection = served, kind = link.kind(), "frame source connected");

        // Poll so Ctrl-C is noticed while a source is idle.
        let poll = config.frame.read_timeout.unwrap_or(DEFAULT_POLL_TIMEOUT);
        if let Err(err) = link.set_read_timeout(Some(poll)) {
            warn!(%err, "read timeout not applied");
        }

        let mut reader = LineReader::with_config(link, config.frame.clone());
        let mut decoder = start_decoder(config)?;
        let mut sink = TraceSink::stdout(format);
        let pumped = pump(
            &mut reader,
            &mut decoder,
            &mut sink,
            PumpOptions::new(RejectPolicy::Drop),
            running,
        );
        finish(&mut decoder, &mut sink)?;

        match pumped {
            Ok(outcome) => info!(
                connection = served,
                applied = outcome.applied,
                dropped = outcome.rejected,
                "frame source finished"
            ),
            Err(err) => warn!(connection = served, %err, "frame source failed"),
        }

        if args.connections.is_some_and(|limit| served >= limit) {
            break;
        }
    }

    Ok(SUCCESS)
}

#[cfg(not(unix))]
pub fn run(_args: ListenArgs, _format: OutputFormat, _config: &DecoderConfig) -> CliResult<i32> {
    Err(crate::exit::link_error(
        "bind failed",
        prt7_link::LinkError::Unsupported("unix socket"),
    ))
}
