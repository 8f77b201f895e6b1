//! Decoder for PRT-7 frame streams.
//!
//! PRT-7 emitters print `L,<symbol>` and `M,<rotation>` lines; decoding them
//! through a rotating Caesar cipher reveals a hidden message.
//!
//! # Crate Structure
//!
//! - [`link`]: line-source links (serial ttys, Unix domain sockets)
//! - [`frame`]: frame recognition and line reading/writing
//! - [`decode`]: rotor, payload, and the session-owning decoder

/// Re-export link types.
pub mod link {
    pub use prt7_link::*;
}

/// Re-export frame types.
pub mod frame {
    pub use prt7_frame::*;
}

/// Re-export decoder types.
pub mod decode {
    pub use prt7_decode::*;
}
