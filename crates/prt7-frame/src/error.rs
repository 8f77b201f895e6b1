/// Reasons a text line is not a frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line is empty, blank, or starts with NUL.
    #[error("empty frame line")]
    Empty,

    /// No `L,` / `M,` marker was found anywhere in the line.
    #[error("no frame marker found")]
    NoMatch,

    /// The line exceeds the configured bound.
    #[error("frame line too long ({len} characters, max {max})")]
    TooLong { len: usize, max: usize },
}

/// Errors from a line source.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    /// An I/O error occurred while reading or writing lines.
    #[error("line I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No data arrived within the source's read timeout.
    #[error("timed out waiting for data")]
    Timeout,

    /// A line exceeded the bound and was discarded up to its newline.
    #[error("line exceeds {max} bytes and was discarded")]
    LineTooLong { max: usize },

    /// The source reached end of stream.
    #[error("line source closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, ParseError>;
