use std::collections::TryReserveError;
use std::fmt;

/// Shown in place of an empty message.
pub const EMPTY_SENTINEL: &str = "(empty)";

/// Decoded symbols in arrival order. Append only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadSequence {
    symbols: Vec<char>,
}

impl PayloadSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty sequence with room for `capacity` symbols, or the
    /// allocation failure.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut symbols = Vec::new();
        symbols.try_reserve(capacity)?;
        Ok(Self { symbols })
    }

    pub fn append(&mut self, symbol: char) {
        self.symbols.push(symbol);
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }

    pub fn as_slice(&self) -> &[char] {
        &self.symbols
    }

    /// The message as plain text; empty when nothing was decoded.
    pub fn message(&self) -> String {
        self.symbols.iter().collect()
    }

    /// The message for display, or [`EMPTY_SENTINEL`] when empty.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return EMPTY_SENTINEL.to_string();
        }
        self.message()
    }

    /// Progress view with each symbol bracketed: `[H][O][L]`.
    pub fn snapshot(&self) -> String {
        if self.is_empty() {
            return EMPTY_SENTINEL.to_string();
        }
        self.symbols.iter().map(|c| format!("[{c}]")).collect()
    }

    /// Drop every symbol and release the storage.
    pub fn clear(&mut self) {
        self.symbols = Vec::new();
    }
}

impl fmt::Display for PayloadSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
