use std::fmt;

/// One parsed PRT-7 frame.
///
/// Frames are inert data: applying one to a cipher is the decoder's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frame {
    /// One ciphertext symbol to decode and append. Not limited to letters.
    Load(char),
    /// Signed rotation amount, not reduced mod 26.
    Map(i64),
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Load(_) => FrameKind::Load,
            Frame::Map(_) => FrameKind::Map,
        }
    }
}

/// Wire form: `L,A`, `L,` for a space payload, `M,-2`.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Load(' ') => write!(f, "L,"),
            Frame::Load(symbol) => write!(f, "L,{symbol}"),
            Frame::Map(amount) => write!(f, "M,{amount}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Load,
    Map,
}

impl FrameKind {
    /// Canonical (uppercase) marker letter.
    pub fn marker(self) -> char {
        match self {
            FrameKind::Load => 'L',
            FrameKind::Map => 'M',
        }
    }

    /// Classify a marker letter, case-insensitively.
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            'L' | 'l' => Some(FrameKind::Load),
            'M' | 'm' => Some(FrameKind::Map),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FrameKind::Load => "LOAD",
            FrameKind::Map => "MAP",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
