use std::collections::TryReserveError;

use prt7_frame::ParseError;

/// Errors that can occur while driving a decoder.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A frame or shutdown was requested while no session is active.
    #[error("decoder is not active")]
    Inactive,

    /// The input line is not a frame.
    #[error("invalid frame: {0}")]
    Parse(#[from] ParseError),

    /// Session storage could not be reserved.
    #[error("failed to allocate session storage: {0}")]
    Allocation(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
