//! PRT-7 frame recognition.
//!
//! A PRT-7 emitter prints one frame per line:
//! - `L,<symbol>` loads one ciphertext symbol (`L,` alone loads a space)
//! - `M,<signed integer>` rotates the cipher
//!
//! Lines arrive from noisy sources (debug prints, transport headers, bracket
//! decoration), so the parser is a recognizer that finds the frame embedded
//! in a line rather than a strict grammar.

pub mod error;
pub mod frame;
pub mod parser;
pub mod reader;
pub mod writer;

pub use error::{LineError, ParseError, Result};
pub use frame::{Frame, FrameKind};
pub use parser::{
    extract_payload, find_marker, parse, parse_amount, parse_with_config, strip_tx_prefix,
    trim_decoration, FrameConfig, Marker, DEFAULT_MAX_LINE_LEN, TX_PREFIX,
};
pub use reader::LineReader;
pub use writer::LineWriter;
