use constellation::ConstellationError;
use thiserror::Error;

pub type OfdmResult<T> = Result<T, OfdmError>;

/// Errors raised by the OFDM modulator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OfdmError {
    /// Invalid construction settings. Names the first field that failed validation.
    #[error("Invalid {field} setting: {reason}")]
    Configuration { field: &'static str, reason: String },

    /// Caller supplied data with the wrong size or dimensions. The modulator stays usable.
    #[error("Invalid shape: {0}")]
    Shape(String),

    /// A pilot index that lands outside of the FFT once centered on the DC bin.
    #[error("Pilot index {index} maps to subcarrier {row} which is outside of the {nb_fft} point FFT")]
    PilotRange { index: i32, row: isize, nb_fft: usize },

    #[error(transparent)]
    Constellation(#[from] ConstellationError),
}

impl OfdmError {
    pub(crate) fn configuration(field: &'static str, reason: impl Into<String>) -> Self {
        OfdmError::Configuration { field, reason: reason.into() }
    }

    /// The settings field that failed validation, if this is a configuration error.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            OfdmError::Configuration { field, .. } => Some(*field),
            OfdmError::PilotRange { .. } => Some("pilots"),
            _ => None,
        }
    }
}
