use crate::ofdm_error::{OfdmError, OfdmResult};
use constellation::ModulationKind;
use num::complex::Complex32;

/// Pilot positions as subcarrier offsets from the DC bin.
///
/// For a 16 point FFT, 0 is the DC bin, -8 is the lowest bin and +7 is the highest bin.
/// Each set holds the positions used by one OFDM symbol. Consecutive symbols cycle through the sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PilotIndices {
    sets: Vec<Vec<i32>>,
}

impl PilotIndices {
    /// The same pilot positions in every OFDM symbol.
    pub fn fixed(indices: Vec<i32>) -> Self {
        Self { sets: vec![indices] }
    }

    /// A different set of pilot positions for each OFDM symbol, wrapping back to the first set after the last.
    pub fn per_symbol(sets: Vec<Vec<i32>>) -> OfdmResult<Self> {
        let nb_pilots = match sets.first() {
            Some(set) => set.len(),
            None => return Err(OfdmError::configuration("pilots", "no pilot index sets were provided")),
        };
        if let Some((i, set)) = sets.iter().enumerate().find(|(_, set)| set.len() != nb_pilots) {
            return Err(OfdmError::configuration("pilots", format!(
                "pilot index set {} has {} pilots but set 0 has {}", i, set.len(), nb_pilots,
            )));
        }
        Ok(Self { sets })
    }

    pub fn nb_pilots(&self) -> usize {
        self.sets.first().map_or(0, |set| set.len())
    }

    pub fn nb_sets(&self) -> usize {
        self.sets.len()
    }

    pub fn sets(&self) -> &[Vec<i32>] {
        &self.sets
    }
}

/// Source of the values placed on pilot subcarriers.
#[derive(Debug, Clone, PartialEq)]
pub enum PilotValues {
    /// Values are used in order and restart from the beginning once exhausted.
    Sequence(Vec<Complex32>),
    /// BPSK mapped bits of a PN9 pseudo random sequence.
    Pn9,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfdmModulatorSettings {
    /// Number of FFT bins. Must be a power of two.
    pub nb_fft: usize,
    /// Half of the occupied bandwidth in Hz. The total bandwidth is twice this.
    pub half_bandwidth_hz: f32,
    /// Constellation used for the data carriers.
    pub modulation: ModulationKind,
    /// Linear gain applied to every data constellation point.
    pub modulation_factor: f32,
    /// Fraction of the time domain symbol repeated at its start.
    pub cyclic_prefix_fraction: f32,
    /// Empty FFT bins on the negative frequency edge.
    pub nb_padding_left: usize,
    /// Empty FFT bins on the positive frequency edge.
    pub nb_padding_right: usize,
    pub pilot_indices: Option<PilotIndices>,
    pub pilot_values: Option<PilotValues>,
    /// 1 for no spreading, 2 or 4 to repeat each data carrier that many times across the spectrum.
    pub frequency_spreading: usize,
    /// Whether the first bit of each constellation symbol is its most significant bit.
    pub msb_first: bool,
}

impl Default for OfdmModulatorSettings {
    fn default() -> Self {
        Self {
            nb_fft: 32,
            half_bandwidth_hz: 8e6,
            modulation: ModulationKind::Bpsk,
            modulation_factor: 1.0,
            cyclic_prefix_fraction: 1.0/8.0,
            nb_padding_left: 0,
            nb_padding_right: 0,
            pilot_indices: None,
            pilot_values: None,
            frequency_spreading: 1,
            msb_first: true,
        }
    }
}

pub const VALID_FREQUENCY_SPREADING: [usize; 3] = [1, 2, 4];

impl OfdmModulatorSettings {
    /// Selects the data constellation by name, e.g. "BPSK", "QPSK" or "QAM16".
    pub fn set_modulation_by_name(&mut self, name: &str) -> OfdmResult<()> {
        self.modulation = name
            .parse()
            .map_err(|err| OfdmError::configuration("modulation", format!("{}", err)))?;
        Ok(())
    }

    pub fn nb_pilots(&self) -> usize {
        self.pilot_indices.as_ref().map_or(0, |indices| indices.nb_pilots())
    }

    /// Checks each setting in turn and reports the first invalid one.
    pub fn validate(&self) -> OfdmResult<()> {
        if !self.nb_fft.is_power_of_two() {
            return Err(OfdmError::configuration("fft", format!("{} is not a power of two", self.nb_fft)));
        }
        if !self.half_bandwidth_hz.is_finite() || self.half_bandwidth_hz <= 0.0 {
            return Err(OfdmError::configuration("bandwidth", format!("{} Hz must be positive and finite", self.half_bandwidth_hz)));
        }
        if !self.modulation_factor.is_finite() {
            return Err(OfdmError::configuration("modulation_factor", format!("{} must be finite", self.modulation_factor)));
        }
        if !(0.0..=1.0).contains(&self.cyclic_prefix_fraction) {
            return Err(OfdmError::configuration("cyclic_prefix", format!("{} must be between 0 and 1", self.cyclic_prefix_fraction)));
        }

        match (&self.pilot_indices, &self.pilot_values) {
            (None, Some(_)) => return Err(OfdmError::configuration("pilots", "pilots must have corresponding indices")),
            (Some(_), None) => return Err(OfdmError::configuration("pilots", "pilot indices must have pilot values")),
            _ => {},
        }

        if !VALID_FREQUENCY_SPREADING.contains(&self.frequency_spreading) {
            return Err(OfdmError::configuration("frequency_spreading", format!(
                "{} must be one of {:?}", self.frequency_spreading, VALID_FREQUENCY_SPREADING,
            )));
        }

        if let Some(indices) = &self.pilot_indices {
            if indices.nb_sets() == 0 || indices.nb_pilots() == 0 {
                return Err(OfdmError::configuration("pilots", "pilot index sets must not be empty"));
            }
            for (i, set) in indices.sets().iter().enumerate() {
                if set.len() != indices.nb_pilots() {
                    return Err(OfdmError::configuration("pilots", format!("pilot index set {} has a different number of pilots", i)));
                }
                if set.windows(2).any(|pair| pair[0] > pair[1]) {
                    return Err(OfdmError::configuration("pilots", format!("pilot index set {} must be ordered: {:?}", i, set)));
                }
            }
        }
        if let Some(PilotValues::Sequence(values)) = &self.pilot_values {
            if values.is_empty() {
                return Err(OfdmError::configuration("pilots", "pilot value sequence must not be empty"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(settings: &OfdmModulatorSettings) -> Option<&'static str> {
        settings.validate().err().and_then(|err| err.field())
    }

    #[test]
    fn defaults_are_valid() {
        let settings = OfdmModulatorSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.nb_fft, 32);
        assert_eq!(settings.half_bandwidth_hz, 8e6);
        assert_eq!(settings.cyclic_prefix_fraction, 0.125);
        assert_eq!(settings.nb_pilots(), 0);
    }

    #[test]
    fn rejects_invalid_fft_sizes() {
        for nb_fft in [0, 12, 33] {
            let settings = OfdmModulatorSettings { nb_fft, ..Default::default() };
            assert_eq!(field_of(&settings), Some("fft"), "nb_fft={}", nb_fft);
        }
    }

    #[test]
    fn accepts_smallest_fft_sizes() {
        // A single bin leaves no data carrier, which the derived geometry rejects later
        for nb_fft in [1, 2, 4] {
            let settings = OfdmModulatorSettings { nb_fft, ..Default::default() };
            assert!(settings.validate().is_ok(), "nb_fft={}", nb_fft);
        }
    }

    #[test]
    fn rejects_invalid_bandwidth() {
        for half_bandwidth_hz in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let settings = OfdmModulatorSettings { half_bandwidth_hz, ..Default::default() };
            assert_eq!(field_of(&settings), Some("bandwidth"));
        }
    }

    #[test]
    fn reports_first_invalid_field() {
        let settings = OfdmModulatorSettings {
            nb_fft: 24,
            half_bandwidth_hz: -1.0,
            frequency_spreading: 3,
            ..Default::default()
        };
        assert_eq!(field_of(&settings), Some("fft"));
    }

    #[test]
    fn pilots_need_both_indices_and_values() {
        let settings = OfdmModulatorSettings {
            pilot_indices: Some(PilotIndices::fixed(vec![-3, 3])),
            ..Default::default()
        };
        assert_eq!(field_of(&settings), Some("pilots"));

        let settings = OfdmModulatorSettings {
            pilot_values: Some(PilotValues::Pn9),
            ..Default::default()
        };
        assert_eq!(field_of(&settings), Some("pilots"));
    }

    #[test]
    fn rejects_unsupported_spreading() {
        for frequency_spreading in [0, 3, 8] {
            let settings = OfdmModulatorSettings { frequency_spreading, ..Default::default() };
            assert_eq!(field_of(&settings), Some("frequency_spreading"));
        }
    }

    #[test]
    fn rejects_unordered_pilot_indices() {
        let settings = OfdmModulatorSettings {
            pilot_indices: Some(PilotIndices::per_symbol(vec![vec![-5, 2], vec![4, -1]]).unwrap()),
            pilot_values: Some(PilotValues::Pn9),
            ..Default::default()
        };
        assert_eq!(field_of(&settings), Some("pilots"));
    }

    #[test]
    fn rejects_ragged_pilot_sets() {
        let err = PilotIndices::per_symbol(vec![vec![-5, 2], vec![4]]).unwrap_err();
        assert_eq!(err.field(), Some("pilots"));
        assert!(PilotIndices::per_symbol(vec![]).is_err());
    }

    #[test]
    fn rejects_empty_pilot_values() {
        let settings = OfdmModulatorSettings {
            pilot_indices: Some(PilotIndices::fixed(vec![1])),
            pilot_values: Some(PilotValues::Sequence(vec![])),
            ..Default::default()
        };
        assert_eq!(field_of(&settings), Some("pilots"));
    }

    #[test]
    fn selects_modulation_by_name() {
        let mut settings = OfdmModulatorSettings::default();
        settings.set_modulation_by_name("QAM16").unwrap();
        assert_eq!(settings.modulation, ModulationKind::Qam16);

        let err = settings.set_modulation_by_name("QAM1024").unwrap_err();
        assert_eq!(err.field(), Some("modulation"));
        assert_eq!(settings.modulation, ModulationKind::Qam16);
    }
}
