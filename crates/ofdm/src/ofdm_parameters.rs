use crate::ofdm_error::{OfdmError, OfdmResult};
use crate::ofdm_modulator_settings::OfdmModulatorSettings;

/// Number of DC bins that are never used as a carrier.
pub const NB_DC_TONE: usize = 1;

/// Geometry of every symbol the modulator transmits, derived once from its settings.
/// Each symbol carries its data carriers, pilots, edge padding and a DC tone across the FFT bins.
/// The time domain symbol is prefixed with a copy of its tail.
///
/// # Diagram
/// ```text
/// | Spectrum (before DC tone)                            |
/// | PAD_L | UNUSED | DATA*SPREAD (with PILOTS) | PAD_R   |
///
/// | Symbol period           |
/// | Cyclic prefix | FFT     |
/// ```
///
/// The message is split into blocks of `nb_message_split` bits.
/// Each block is mapped into `nb_mapped_carriers` constellation points and spread over `nb_spread_carriers`.
/// When the spreading factor does not divide the data carriers evenly the remainder is left unused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfdmParameters {
    /// Number of FFT bins in one OFDM symbol.
    pub nb_fft: usize,
    /// Number of pilots in each OFDM symbol.
    pub nb_pilots: usize,
    /// Empty FFT bins on the negative frequency edge.
    pub nb_padding_left: usize,
    /// Empty FFT bins on the positive frequency edge.
    pub nb_padding_right: usize,
    /// Number of FFT bins left for data after removing pilots, padding and the DC tone.
    pub nb_data_carriers: usize,
    /// Number of bits carried by one constellation point.
    pub nb_bits_per_symbol: usize,
    /// Number of message bits carried by one OFDM symbol.
    pub nb_message_split: usize,
    /// Number of constellation points in one OFDM symbol before frequency spreading.
    pub nb_mapped_carriers: usize,
    /// Number of data carriers after frequency spreading.
    pub nb_spread_carriers: usize,
    /// Data carriers lost to the integer truncation of the message split.
    pub nb_unused_carriers: usize,
    /// Repetition factor of the frequency spreading.
    pub frequency_spreading: usize,
    /// Number of tail samples repeated in front of each time domain symbol.
    pub nb_cyclic_prefix: usize,
    /// Number of samples sent per symbol, cyclic prefix included.
    pub nb_symbol_period: usize,
    /// Frequency spacing between two FFT bins in Hz.
    pub subcarrier_spacing_hz: f32,
    /// Duration of one time domain sample in seconds.
    pub sample_period: f32,
}

impl OfdmParameters {
    /// Creates all derived parameters from validated settings and the bits per symbol of its constellation.
    pub fn new(settings: &OfdmModulatorSettings, nb_bits_per_symbol: usize) -> OfdmResult<Self> {
        assert!(nb_bits_per_symbol > 0, "Constellation must carry at least one bit per symbol");

        let nb_fft = settings.nb_fft;
        let nb_pilots = settings.nb_pilots();
        let frequency_spreading = settings.frequency_spreading;

        let nb_reserved = nb_pilots + settings.nb_padding_left + settings.nb_padding_right + NB_DC_TONE;
        let nb_data_carriers = match nb_fft.checked_sub(nb_reserved) {
            Some(length) => length,
            None => return Err(OfdmError::configuration("geometry", format!(
                "{} pilots, {}+{} padding bins and the DC tone do not fit in {} FFT bins",
                nb_pilots, settings.nb_padding_left, settings.nb_padding_right, nb_fft,
            ))),
        };

        // NOTE: Integer truncation is intended, a fractional data carrier is dropped
        let nb_message_split = nb_data_carriers*nb_bits_per_symbol / frequency_spreading;
        if nb_message_split == 0 {
            return Err(OfdmError::configuration("geometry", format!(
                "{} data carriers with {}x spreading leave no room for message bits",
                nb_data_carriers, frequency_spreading,
            )));
        }
        if nb_message_split % nb_bits_per_symbol != 0 {
            return Err(OfdmError::configuration("geometry", format!(
                "message split of {} bits is not a whole number of {} bit symbols",
                nb_message_split, nb_bits_per_symbol,
            )));
        }

        let nb_mapped_carriers = nb_message_split / nb_bits_per_symbol;
        let nb_spread_carriers = nb_mapped_carriers*frequency_spreading;
        assert!(nb_spread_carriers <= nb_data_carriers, "Spread carriers {} exceed data carriers {}", nb_spread_carriers, nb_data_carriers);
        let nb_unused_carriers = nb_data_carriers - nb_spread_carriers;

        let nb_cyclic_prefix = ((nb_fft as f32) * settings.cyclic_prefix_fraction).floor() as usize;
        let nb_symbol_period = nb_fft + nb_cyclic_prefix;

        let subcarrier_spacing_hz = 2.0*settings.half_bandwidth_hz / ((nb_fft-1) as f32);
        let sample_period = 1.0 / ((nb_fft as f32) * subcarrier_spacing_hz);

        Ok(Self {
            nb_fft,
            nb_pilots,
            nb_padding_left: settings.nb_padding_left,
            nb_padding_right: settings.nb_padding_right,
            nb_data_carriers,
            nb_bits_per_symbol,
            nb_message_split,
            nb_mapped_carriers,
            nb_spread_carriers,
            nb_unused_carriers,
            frequency_spreading,
            nb_cyclic_prefix,
            nb_symbol_period,
            subcarrier_spacing_hz,
            sample_period,
        })
    }

    /// Index of the DC bin in a centered spectrum.
    pub fn dc_index(&self) -> usize {
        self.nb_fft/2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ofdm_modulator_settings::{PilotIndices, PilotValues};
    use approx::assert_relative_eq;
    use num::complex::Complex32;

    fn settings(nb_fft: usize, frequency_spreading: usize) -> OfdmModulatorSettings {
        OfdmModulatorSettings {
            nb_fft,
            frequency_spreading,
            cyclic_prefix_fraction: 0.25,
            ..Default::default()
        }
    }

    #[test]
    fn derives_geometry_without_spreading() {
        let params = OfdmParameters::new(&settings(16, 1), 1).unwrap();
        assert_eq!(params.nb_data_carriers, 15);
        assert_eq!(params.nb_message_split, 15);
        assert_eq!(params.nb_spread_carriers, 15);
        assert_eq!(params.nb_unused_carriers, 0);
        assert_eq!(params.nb_cyclic_prefix, 4);
        assert_eq!(params.nb_symbol_period, 20);
        assert_eq!(params.dc_index(), 8);
        assert_relative_eq!(params.subcarrier_spacing_hz, 16e6 / 15.0, max_relative = 1e-6);
        assert_relative_eq!(params.sample_period, 15.0 / (16.0 * 16e6), max_relative = 1e-6);
    }

    #[test]
    fn truncates_message_split_with_spreading() {
        let params = OfdmParameters::new(&settings(16, 2), 1).unwrap();
        assert_eq!(params.nb_message_split, 7);
        assert_eq!(params.nb_spread_carriers, 14);
        assert_eq!(params.nb_unused_carriers, 1);

        let settings = OfdmModulatorSettings {
            nb_padding_left: 2,
            nb_padding_right: 1,
            ..settings(32, 4)
        };
        let params = OfdmParameters::new(&settings, 2).unwrap();
        assert_eq!(params.nb_data_carriers, 28);
        assert_eq!(params.nb_message_split, 14);
        assert_eq!(params.nb_mapped_carriers, 7);
        assert_eq!(params.nb_spread_carriers, 28);
        assert_eq!(params.nb_unused_carriers, 0);
    }

    #[test]
    fn rejects_partial_constellation_symbols() {
        // 15*2/4 = 7 bits is not a whole number of QPSK symbols
        let err = OfdmParameters::new(&settings(16, 4), 2).unwrap_err();
        assert_eq!(err.field(), Some("geometry"));
    }

    #[test]
    fn counts_pilots_and_padding() {
        let settings = OfdmModulatorSettings {
            nb_fft: 32,
            nb_padding_left: 3,
            nb_padding_right: 2,
            pilot_indices: Some(PilotIndices::fixed(vec![-7, 7])),
            pilot_values: Some(PilotValues::Sequence(vec![Complex32::new(1.0, 0.0)])),
            ..Default::default()
        };
        let params = OfdmParameters::new(&settings, 2).unwrap();
        assert_eq!(params.nb_pilots, 2);
        assert_eq!(params.nb_data_carriers, 32 - 2 - 3 - 2 - 1);
        assert_eq!(params.nb_message_split, 48);
        assert_eq!(params.nb_mapped_carriers, 24);
        assert_eq!(params.nb_cyclic_prefix, 4);
    }

    #[test]
    fn two_bins_hold_one_carrier_and_dc() {
        let params = OfdmParameters::new(&settings(2, 1), 1).unwrap();
        assert_eq!(params.nb_data_carriers, 1);
        assert_eq!(params.nb_message_split, 1);
        assert_eq!(params.dc_index(), 1);
        assert_relative_eq!(params.subcarrier_spacing_hz, 16e6, max_relative = 1e-6);

        let err = OfdmParameters::new(&settings(1, 1), 1).unwrap_err();
        assert_eq!(err.field(), Some("geometry"));
    }

    #[test]
    fn rejects_overfull_spectrum() {
        let settings = OfdmModulatorSettings {
            nb_fft: 8,
            nb_padding_left: 4,
            nb_padding_right: 4,
            ..Default::default()
        };
        let err = OfdmParameters::new(&settings, 1).unwrap_err();
        assert_eq!(err.field(), Some("geometry"));
    }
}
