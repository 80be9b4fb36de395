use thiserror::Error;

/// Errors raised while selecting a constellation or converting bits into symbols.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstellationError {
    /// The modulation name does not match any supported constellation.
    #[error("Unknown modulation '{0}', expected one of BPSK, QPSK, QAM16")]
    UnknownModulation(String),

    /// Number of bits does not fill the requested number of symbols exactly.
    #[error("{bits} bits cannot be mapped onto {symbols} symbols of {bits_per_symbol} bits each")]
    LengthMismatch { bits: usize, symbols: usize, bits_per_symbol: usize },

    /// A bit value other than 0 or 1.
    #[error("Invalid bit value {value} at index {index}")]
    InvalidBit { index: usize, value: u8 },

    /// Seed that would lock the shift register at zero.
    #[error("Invalid shift register seed 0x{0:03x}")]
    InvalidSeed(u16),
}
