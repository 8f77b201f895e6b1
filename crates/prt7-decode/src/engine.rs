use std::fmt;

use prt7_frame::Frame;
use serde::Serialize;
use tracing::debug;

use crate::payload::PayloadSequence;
use crate::rotor::Rotor;

/// What applying one frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeEvent {
    /// A LOAD symbol was decoded and appended.
    Loaded { symbol: char, decoded: char },
    /// The rotor moved by `amount`; `head` is the symbol now under the head.
    Rotated { amount: i64, head: char },
}

impl DecodeEvent {
    /// The frame that produced this event.
    pub fn frame(&self) -> Frame {
        match *self {
            DecodeEvent::Loaded { symbol, .. } => Frame::Load(symbol),
            DecodeEvent::Rotated { amount, .. } => Frame::Map(amount),
        }
    }
}

impl fmt::Display for DecodeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeEvent::Loaded { symbol, decoded } => {
                write!(f, "fragment '{symbol}' decoded as '{decoded}'")
            }
            DecodeEvent::Rotated { amount, .. } => write!(f, "rotor rotated {amount:+}"),
        }
    }
}

/// Apply one frame: LOAD decodes and appends, MAP rotates.
pub fn apply(frame: Frame, rotor: &mut Rotor, payload: &mut PayloadSequence) -> DecodeEvent {
    let event = match frame {
        Frame::Load(symbol) => {
            let decoded = rotor.map(symbol);
            payload.append(decoded);
            DecodeEvent::Loaded { symbol, decoded }
        }
        Frame::Map(amount) => {
            rotor.rotate(amount);
            DecodeEvent::Rotated {
                amount,
                head: rotor.head_symbol(),
            }
        }
    };
    debug!(%frame, %event, offset = rotor.offset(), "frame applied");
    event
}
