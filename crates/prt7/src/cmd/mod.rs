use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use prt7_decode::DecoderConfig;
#[cfg(unix)]
use prt7_link::DEFAULT_BAUD;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

#[cfg(not(unix))]
const DEFAULT_BAUD: u32 = 9600;

pub mod decode;
pub mod listen;
pub mod manual;
pub mod menu;
pub mod serial;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode the built-in demo frame sequence.
    Simulate(SimulateArgs),
    /// Type frames by hand on stdin.
    Manual(ManualArgs),
    /// Decode frames arriving on a serial port.
    Serial(SerialArgs),
    /// Accept frame sources on a Unix socket, one session per connection.
    Listen(ListenArgs),
    /// Decode a capture file (or stdin) in one session.
    Decode(DecodeArgs),
    /// Interactive menu over the other modes.
    Menu(MenuArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: &DecoderConfig) -> CliResult<i32> {
    match command {
        Command::Simulate(args) => simulate::run(args, format, config),
        Command::Manual(args) => manual::run(args, format, config),
        Command::Serial(args) => serial::run(args, format, config),
        Command::Listen(args) => listen::run(args, format, config),
        Command::Decode(args) => decode::run(args, format, config),
        Command::Menu(args) => menu::run(args, format, config),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Default)]
pub struct SimulateArgs {
    /// Pause between frames (e.g. 500ms, 1s).
    #[arg(long)]
    pub delay: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ManualArgs {
    /// Skip the protocol help banner.
    #[arg(long)]
    pub no_help: bool,
}

#[derive(Args, Debug)]
pub struct SerialArgs {
    /// Serial device path (e.g. /dev/ttyACM0).
    #[arg(env = "PRT7_SERIAL_PORT")]
    pub port: PathBuf,
    /// Line speed in baud.
    #[arg(long, env = "PRT7_BAUD", default_value_t = DEFAULT_BAUD)]
    pub baud: u32,
    /// Stop after N frames were applied.
    #[arg(long)]
    pub frames: Option<usize>,
    /// Stop after this long without data (e.g. 30s, 500ms).
    #[arg(long)]
    pub idle_timeout: Option<String>,
    /// Do not send the AUTO wake-up command after opening the port.
    #[arg(long)]
    pub no_wake: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Exit after serving N connections.
    #[arg(long)]
    pub connections: Option<usize>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to decode. Reads stdin when absent or `-`.
    pub input: Option<PathBuf>,
    /// Report lines that are not frames and fail if there were any.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug, Default)]
pub struct MenuArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `500ms`, `5s`, `2m`, or bare seconds. Zero is rejected.
pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input:?}")))?;

    let duration = match unit {
        "ms" => Duration::from_millis(value),
        "" | "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.saturating_mul(60)),
        other => {
            return Err(CliError::new(
                USAGE,
                format!("unsupported duration unit {other:?} (use ms, s or m)"),
            ))
        }
    };
    if duration.is_zero() {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }
    Ok(duration)
}
