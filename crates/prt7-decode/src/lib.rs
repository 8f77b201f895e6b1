//! PRT-7 decoding engine.
//!
//! Frames from [`prt7_frame`] drive a [`Rotor`] (a Caesar cipher with a
//! mutable shift) and a [`PayloadSequence`] (the hidden message, append
//! only). A [`Decoder`] owns one [`Session`] at a time and refuses frames
//! while inactive.
//!
//! ```
//! use prt7_decode::{Decoder, NullSink};
//!
//! let mut decoder = Decoder::new();
//! decoder.initialize().unwrap();
//! for line in ["L,H", "M,1", "L,H"] {
//!     decoder.feed_line(line).unwrap();
//! }
//! let report = decoder.shutdown(&mut NullSink).unwrap();
//! assert_eq!(report.message, "HI");
//! ```

pub mod decoder;
pub mod engine;
pub mod error;
pub mod payload;
pub mod rotor;
pub mod sink;

pub use decoder::{
    Decoder, DecoderConfig, Session, SessionState, ShutdownReport, DEFAULT_PAYLOAD_CAPACITY,
    DEMO_FRAMES,
};
pub use engine::{apply, DecodeEvent};
pub use error::{DecodeError, Result};
pub use payload::{PayloadSequence, EMPTY_SENTINEL};
pub use rotor::{Rotor, RING_LEN};
pub use sink::{DecodeSink, NullSink};
