/// Number of symbols on the rotor ring ('A'..='Z').
pub const RING_LEN: u8 = 26;

/// Rotating substitution table over 'A'..='Z'.
///
/// The ring order never changes; only the head moves. The whole rotor is
/// therefore a single offset in `[0, 26)` and `map` is a Caesar shift by
/// that offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rotor {
    offset: u8,
}

impl Rotor {
    /// A rotor with its head on 'A'.
    pub fn new() -> Self {
        Self::default()
    }

    /// A rotor already rotated by `steps`.
    pub fn with_offset(steps: i64) -> Self {
        let mut rotor = Self::new();
        rotor.rotate(steps);
        rotor
    }

    /// Move the head `steps` positions. Negative steps rotate backwards.
    pub fn rotate(&mut self, steps: i64) {
        let steps = steps.rem_euclid(i64::from(RING_LEN)) as u8;
        self.offset = (self.offset + steps) % RING_LEN;
    }

    /// Substitute one symbol. Anything outside 'A'..='Z' passes through.
    pub fn map(&self, symbol: char) -> char {
        if !symbol.is_ascii_uppercase() {
            return symbol;
        }
        let index = symbol as u8 - b'A';
        char::from(b'A' + (self.offset + index) % RING_LEN)
    }

    /// Symbol currently under the head.
    pub fn head_symbol(&self) -> char {
        char::from(b'A' + self.offset)
    }

    /// Cumulative rotation, mod 26.
    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// The ring read forward from the head.
    pub fn ring(&self) -> [char; RING_LEN as usize] {
        std::array::from_fn(|i| char::from(b'A' + (self.offset + i as u8) % RING_LEN))
    }
}
