//! Seven-segment decoding: the 4-bit decoder and the display it drives.
//!
//! Segment order everywhere is `a b c d e f g`, bit 6 = `a` down to
//! bit 0 = `g`.

/// Pin positions of the decoder.
pub mod pin {
    pub const I3: usize = 0;
    pub const I2: usize = 1;
    pub const I1: usize = 2;
    pub const I0: usize = 3;
    /// First segment output (`a`); `g` is `SEGMENT_A + 6`
    pub const SEGMENT_A: usize = 4;
}

/// Number of segments.
pub const SEGMENTS: usize = 7;

/// Number of decoder pins (four inputs, seven outputs).
pub const DECODER_PINS: usize = 4 + SEGMENTS;

/// Segment letters in pin order.
pub const SEGMENT_NAMES: [char; SEGMENTS] = ['a', 'b', 'c', 'd', 'e', 'f', 'g'];

/// Hexadecimal seven-segment table, `abcdefg` as bits 6..0.
const HEX_SEGMENTS: [u8; 16] = [
    0b111_1110, // 0
    0b011_0000, // 1
    0b110_1101, // 2
    0b111_1001, // 3
    0b011_0011, // 4
    0b101_1011, // 5
    0b101_1111, // 6
    0b111_0000, // 7
    0b111_1111, // 8
    0b111_1011, // 9
    0b111_0111, // A
    0b001_1111, // b
    0b100_1110, // C
    0b011_1101, // d
    0b100_1111, // E
    0b100_0111, // F
];

/// Segment pattern for a 4-bit code.
pub fn segments_for(code: u8) -> [bool; SEGMENTS] {
    let bits = HEX_SEGMENTS[(code & 0x0f) as usize];
    let mut out = [false; SEGMENTS];
    for (i, seg) in out.iter_mut().enumerate() {
        *seg = bits & (1 << (SEGMENTS - 1 - i)) != 0;
    }
    out
}

/// Digit spelled by a segment pattern, if any.
pub fn digit_for(segments: &[bool; SEGMENTS]) -> Option<u8> {
    let bits = segments
        .iter()
        .fold(0u8, |acc, &on| (acc << 1) | u8::from(on));
    HEX_SEGMENTS
        .iter()
        .position(|&pattern| pattern == bits)
        .map(|d| d as u8)
}

/// Build a 4-bit code from the inputs, most significant first.
pub fn code_from_bits(i3: bool, i2: bool, i1: bool, i0: bool) -> u8 {
    (u8::from(i3) << 3) | (u8::from(i2) << 2) | (u8::from(i1) << 1) | u8::from(i0)
}

/// A hexadecimal 4-to-7 segment decoder.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    code: Option<u8>,
    pub(crate) published: [Option<bool>; SEGMENTS],
}

impl Decoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last decoded input code.
    pub fn code(&self) -> Option<u8> {
        self.code
    }

    pub(crate) fn set_code(&mut self, code: Option<u8>) {
        self.code = code;
    }

    pub(crate) fn forget_outputs(&mut self) {
        self.published = [None; SEGMENTS];
    }
}

/// A seven-segment display. Pure sink.
#[derive(Debug, Clone, Default)]
pub struct Display {
    lit: [bool; SEGMENTS],
}

impl Display {
    /// Create a dark display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments lit at the last evaluation.
    pub fn segments(&self) -> [bool; SEGMENTS] {
        self.lit
    }

    /// Digit currently shown, if the pattern spells one.
    pub fn digit(&self) -> Option<u8> {
        digit_for(&self.lit)
    }

    pub(crate) fn set_segments(&mut self, lit: [bool; SEGMENTS]) {
        self.lit = lit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_for_known_digits() {
        assert_eq!(segments_for(1), [false, true, true, false, false, false, false]);
        assert_eq!(segments_for(8), [true; SEGMENTS]);
        assert_eq!(segments_for(0), [true, true, true, true, true, true, false]);
    }

    #[test]
    fn test_digit_for_inverts_table() {
        for code in 0..16u8 {
            assert_eq!(digit_for(&segments_for(code)), Some(code));
        }
        assert_eq!(digit_for(&[false; SEGMENTS]), None);
    }

    #[test]
    fn test_code_from_bits() {
        assert_eq!(code_from_bits(false, false, false, false), 0);
        assert_eq!(code_from_bits(true, false, false, true), 9);
        assert_eq!(code_from_bits(true, true, true, true), 15);
    }
}
