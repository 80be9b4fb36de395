use crate::constellation_error::ConstellationError;

/// An endless stream of bits, each either 0 or 1.
pub trait BitSource {
    fn next_bit(&mut self) -> u8;
}

impl<F> BitSource for F
where F: FnMut() -> u8
{
    fn next_bit(&mut self) -> u8 {
        self() & 1
    }
}

/// Pseudo random binary sequence generated by a 9 bit linear feedback shift register.
///
/// The generator polynomial is x^9 + x^5 + 1 which gives a maximal length sequence of 511 bits.
///
/// # Diagram
/// ```text
///   +-------------------------XOR<-------------+
///   |                          ^               |
///   v                          |               |
/// | s8 | s7 | s6 | s5 | s4 | s3 | s2 | s1 | s0 | --> output
/// ```
/// Bit k of the register holds s(n+k), so s(n+9) = s(n+5) ^ s(n).
#[derive(Debug, Clone)]
pub struct Pn9 {
    register: u16,
}

impl Pn9 {
    pub const PERIOD: usize = 511;
    pub const DEFAULT_SEED: u16 = 0x1FF;
    const MASK: u16 = 0x1FF;

    /// Creates a generator with a non zero 9 bit seed.
    pub fn new(seed: u16) -> Result<Self, ConstellationError> {
        let register = seed & Self::MASK;
        if register == 0 || seed > Self::MASK {
            return Err(ConstellationError::InvalidSeed(seed));
        }
        Ok(Self { register })
    }

    pub fn register(&self) -> u16 {
        self.register
    }
}

impl Default for Pn9 {
    fn default() -> Self {
        Self { register: Self::DEFAULT_SEED }
    }
}

impl BitSource for Pn9 {
    fn next_bit(&mut self) -> u8 {
        let output = self.register & 1;
        let feedback = (self.register ^ (self.register >> 5)) & 1;
        self.register = (self.register >> 1) | (feedback << 8);
        output as u8
    }
}

impl Iterator for Pn9 {
    type Item = u8;
    fn next(&mut self) -> Option<u8> {
        Some(self.next_bit())
    }
}
