mod cmd;
mod driver;
mod exit;
mod logging;
mod output;

use clap::Parser;
use prt7_decode::DecoderConfig;
use prt7_frame::{FrameConfig, DEFAULT_MAX_LINE_LEN};

use crate::cmd::Command;
use crate::exit::CliResult;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "prt7", version, about = "PRT-7 frame stream decoder")]
struct Cli {
    /// Output format. Defaults to pretty on a terminal, json otherwise.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        env = "PRT7_LOG_FORMAT",
        default_value = "text",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        env = "PRT7_LOG_LEVEL",
        default_value = "warn",
        global = true
    )]
    log_level: LogLevel,

    /// Longest accepted frame line.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_LINE_LEN, global = true)]
    max_line_len: usize,

    /// Poll interval for serial and socket reads (e.g. 100ms, 1s).
    #[arg(long, value_name = "DURATION", env = "PRT7_READ_TIMEOUT", global = true)]
    read_timeout: Option<String>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn decoder_config(&self) -> CliResult<DecoderConfig> {
        let read_timeout = self
            .read_timeout
            .as_deref()
            .map(cmd::parse_duration)
            .transpose()?;
        Ok(DecoderConfig {
            frame: FrameConfig {
                max_line_len: self.max_line_len,
                read_timeout,
            },
            ..DecoderConfig::default()
        })
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cli
        .decoder_config()
        .and_then(|config| cmd::run(cli.command, format, &config));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
