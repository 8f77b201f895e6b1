use std::fmt::Display;
use std::io::{IsTerminal, Stdout, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use prt7_decode::{DecodeEvent, DecodeSink, PayloadSequence, ShutdownReport};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    record: &'static str,
    line: &'a str,
    frame: String,
    event: &'a DecodeEvent,
    payload: String,
}

#[derive(Serialize)]
struct RejectedRecord<'a> {
    record: &'static str,
    line: &'a str,
    error: String,
}

#[derive(Serialize)]
struct MessageRecord<'a> {
    record: &'static str,
    #[serde(flatten)]
    report: &'a ShutdownReport,
}

/// Shows decoder traces on a writer in one of the output formats.
///
/// Table output is buffered and printed in tables of at most
/// [`TABLE_BATCH_ROWS`] rows, the last one when the session closes.
pub struct TraceSink<W: Write> {
    out: W,
    format: OutputFormat,
    rows: Vec<[String; 4]>,
    /// Rows numbered so far in this session.
    numbered: usize,
}

/// Rows held before a table is printed mid-session.
pub const TABLE_BATCH_ROWS: usize = 50;

impl TraceSink<Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(std::io::stdout(), format)
    }
}

impl<W: Write> TraceSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            rows: Vec::new(),
            numbered: 0,
        }
    }

    /// Report a line that did not carry a frame.
    pub fn rejected(&mut self, line: &str, reason: &dyn Display) {
        match self.format {
            OutputFormat::Json => {
                let record = RejectedRecord {
                    record: "rejected",
                    line,
                    error: reason.to_string(),
                };
                self.emit_json(&record);
            }
            OutputFormat::Table => {
                self.push_row(line, format!("rejected: {reason}"), String::new());
            }
            OutputFormat::Pretty => {
                let _ = writeln!(
                    self.out,
                    "Frame received: [{line}] -> error: invalid frame ({reason})"
                );
            }
            OutputFormat::Raw => {}
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit_json<T: Serialize>(&mut self, record: &T) {
        let text = serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string());
        let _ = writeln!(self.out, "{text}");
    }

    fn push_row(&mut self, line: &str, event: String, message: String) {
        self.numbered += 1;
        self.rows
            .push([self.numbered.to_string(), line.to_string(), event, message]);
        if self.rows.len() >= TABLE_BATCH_ROWS {
            self.print_rows();
        }
    }

    fn print_rows(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["#", "LINE", "EVENT", "MESSAGE"]);
        for row in self.rows.drain(..) {
            table.add_row(Vec::from(row));
        }
        let _ = writeln!(self.out, "{table}");
        let _ = self.out.flush();
    }

    fn flush_table(&mut self, report: &ShutdownReport) {
        self.print_rows();
        self.numbered = 0;
        let _ = writeln!(
            self.out,
            "Hidden message: {} ({} frames)",
            report.rendered, report.frames_applied
        );
    }
}

impl<W: Write> DecodeSink for TraceSink<W> {
    fn frame_decoded(&mut self, line: &str, event: &DecodeEvent, payload: &PayloadSequence) {
        match self.format {
            OutputFormat::Json => {
                let record = FrameRecord {
                    record: "frame",
                    line,
                    frame: event.frame().to_string(),
                    event,
                    payload: payload.message(),
                };
                self.emit_json(&record);
            }
            OutputFormat::Table => {
                self.push_row(line, event.to_string(), payload.render());
            }
            OutputFormat::Pretty => {
                let detail = match event {
                    DecodeEvent::Loaded { .. } => {
                        format!("{event}. Message: {}", payload.snapshot())
                    }
                    DecodeEvent::Rotated { head, .. } => format!("{event}, head at '{head}'"),
                };
                let _ = writeln!(self.out, "Frame received: [{line}] -> {detail}");
            }
            OutputFormat::Raw => {}
        }
    }

    fn session_closed(&mut self, report: &ShutdownReport) {
        match self.format {
            OutputFormat::Json => {
                let record = MessageRecord {
                    record: "message",
                    report,
                };
                self.emit_json(&record);
            }
            OutputFormat::Table => self.flush_table(report),
            OutputFormat::Pretty => {
                let _ = writeln!(self.out, "---");
                let _ = writeln!(self.out, "Data stream finished.");
                let _ = writeln!(self.out, "HIDDEN MESSAGE:");
                let _ = writeln!(self.out, "{}", report.rendered);
                let _ = writeln!(self.out, "---");
            }
            OutputFormat::Raw => {
                let _ = writeln!(self.out, "{}", report.message);
            }
        }
        let _ = self.out.flush();
    }
}
