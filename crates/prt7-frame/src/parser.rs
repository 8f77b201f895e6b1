use std::time::Duration;

use tracing::trace;

use crate::error::{ParseError, Result};
use crate::frame::{Frame, FrameKind};

/// Default line bound in bytes (the reference emitter's working buffer).
pub const DEFAULT_MAX_LINE_LEN: usize = 100;

/// Transport header some emitters prepend, matched case-insensitively.
pub const TX_PREFIX: &str = "TX:";

/// Configuration shared by the parser and line sources.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Longest accepted line, excluding the line terminator.
    ///
    /// Line sources count raw bytes; the parser counts characters of the
    /// decoded line, which is never more than the raw byte count.
    pub max_line_len: usize,
    /// Read timeout applied to link-backed line sources.
    pub read_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            read_timeout: None,
        }
    }
}

/// A frame marker located in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub kind: FrameKind,
    /// Byte offset of the marker letter.
    pub position: usize,
    /// Byte offset of the payload, past the comma and any blanks.
    pub payload_start: usize,
}

/// Parse one line with the default configuration.
pub fn parse(line: &str) -> Result<Frame> {
    parse_with_config(line, &FrameConfig::default())
}

/// Recognize the first frame embedded in `line`.
///
/// ```text
/// <WS>* [ '[' ] [ TX: [' '] ] ... ('L'|'l'|'M'|'m') <WS>* ',' <WS>* <PAYLOAD> ... [ ']' ] <WS>*
/// ```
///
/// Text after the payload is ignored.
pub fn parse_with_config(line: &str, config: &FrameConfig) -> Result<Frame> {
    // NUL terminates the line, as on the C side of the link.
    let line = line.split('\0').next().unwrap_or_default();
    if line.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let len = line.chars().count();
    if len > config.max_line_len {
        return Err(ParseError::TooLong {
            len,
            max: config.max_line_len,
        });
    }

    let text = strip_tx_prefix(trim_decoration(line));
    let marker = find_marker(text).ok_or(ParseError::NoMatch)?;
    let frame = extract_payload(marker.kind, &text[marker.payload_start..]);
    trace!(%frame, position = marker.position, "frame recognized");
    Ok(frame)
}

/// Strip surrounding whitespace, a leading `[` and a trailing `]`.
pub fn trim_decoration(line: &str) -> &str {
    line.trim_start_matches([' ', '\t', '\r', '\n', '['])
        .trim_end_matches([' ', '\t', '\r', '\n', ']'])
}

/// Drop a `TX:` transport header and at most one space after it.
pub fn strip_tx_prefix(text: &str) -> &str {
    match text.get(..TX_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(TX_PREFIX) => {
            let rest = &text[TX_PREFIX.len()..];
            rest.strip_prefix(' ').unwrap_or(rest)
        }
        _ => text,
    }
}

/// Find the first `L`/`M` that starts a token and is followed by a comma.
///
/// A marker preceded by a Latin letter is part of a word ("Load", "mode")
/// and is skipped. Only spaces and tabs may sit between marker and comma.
pub fn find_marker(text: &str) -> Option<Marker> {
    let bytes = text.as_bytes();
    (0..bytes.len()).find_map(|i| marker_at(bytes, i))
}

fn marker_at(bytes: &[u8], i: usize) -> Option<Marker> {
    let kind = FrameKind::from_marker(char::from(bytes[i]))?;
    if i > 0 && bytes[i - 1].is_ascii_alphabetic() {
        return None;
    }
    let comma = skip_blanks(bytes, i + 1);
    if bytes.get(comma) != Some(&b',') {
        return None;
    }
    Some(Marker {
        kind,
        position: i,
        payload_start: skip_blanks(bytes, comma + 1),
    })
}

fn skip_blanks(bytes: &[u8], mut pos: usize) -> usize {
    while matches!(bytes.get(pos), Some(b' ' | b'\t')) {
        pos += 1;
    }
    pos
}

/// Build the frame from the text that follows the marker's comma.
///
/// LOAD takes exactly one character; nothing at all means a space. MAP takes
/// a signed decimal prefix (see [`parse_amount`]).
pub fn extract_payload(kind: FrameKind, payload: &str) -> Frame {
    match kind {
        FrameKind::Load => Frame::Load(payload.chars().next().unwrap_or(' ')),
        FrameKind::Map => Frame::Map(parse_amount(payload)),
    }
}

/// Parse an optional sign followed by as many decimal digits as present.
///
/// Stops at the first non-digit. No digits yields 0. Values beyond the
/// `i64` range saturate.
pub fn parse_amount(text: &str) -> i64 {
    let bytes = text.as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |acc, b| {
            let digit = i64::from(b - b'0');
            let shifted = acc.saturating_mul(10);
            if negative {
                shifted.saturating_sub(digit)
            } else {
                shifted.saturating_add(digit)
            }
        })
}
