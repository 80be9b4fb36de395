use crate::frequency_spreading::apply_frequency_spreading;
use crate::iq_signal::IqSignal;
use crate::ofdm_error::{OfdmError, OfdmResult};
use crate::ofdm_modulator_settings::{OfdmModulatorSettings, PilotValues};
use crate::ofdm_parameters::OfdmParameters;
use crate::ofdm_subcarrier_map::{fill_ofdm_symbol, format_subcarrier_map, get_ofdm_subcarrier_map, SubcarrierSlot};
use crate::symbol_grid::SymbolGrid;
use constellation::{get_constellation_mapper, BitSource, ConstellationMapper, ModulationKind, Pn9};
use itertools::izip;
use num::complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::{debug, info};

/// Converts a bit stream into a time domain OFDM signal.
///
/// # Pipeline
/// ```text
/// bits -> split -> constellation map -> frequency spread -> pilots, padding and DC -> IFFT -> cyclic prefix -> I/Q
/// ```
///
/// The pilot set and pilot value cursors carry over between calls.
/// Calls take `&mut self`, so sharing one modulator between threads requires a lock around it.
pub struct OfdmModulator {
    settings: OfdmModulatorSettings,
    params: OfdmParameters,
    mapper: Box<dyn ConstellationMapper + Send + Sync>,
    /// BPSK constellation points for the pseudo random pilot bits 0 and 1.
    pilot_bpsk_points: [Complex32; 2],
    /// One map per pilot set.
    subcarrier_maps: Vec<Vec<SubcarrierSlot>>,
    /// Printable form of each subcarrier map for debug logs.
    subcarrier_layouts: Vec<String>,
    pilot_set_index: usize,
    pilot_value_index: usize,
    pilot_bit_source: Box<dyn BitSource + Send>,
    ifft: Arc<dyn Fft<f32>>,
}

impl OfdmModulator {
    pub fn new(settings: OfdmModulatorSettings) -> OfdmResult<Self> {
        settings.validate()?;

        let mapper = get_constellation_mapper(settings.modulation, settings.msb_first);
        let params = OfdmParameters::new(&settings, mapper.bits_per_symbol())?;

        // Pilot placement is fixed for each set so it is resolved once here
        let subcarrier_maps = match &settings.pilot_indices {
            None => vec![get_ofdm_subcarrier_map(&params, &[])?],
            Some(indices) => indices
                .sets()
                .iter()
                .map(|set| get_ofdm_subcarrier_map(&params, set))
                .collect::<OfdmResult<Vec<_>>>()?,
        };

        let subcarrier_layouts: Vec<String> = subcarrier_maps
            .iter()
            .map(|map| format_subcarrier_map(map, params.dc_index()))
            .collect();

        let mut pilot_bpsk_points = [Complex32::default(); 2];
        get_constellation_mapper(ModulationKind::Bpsk, true).convert(&[0, 1], &mut pilot_bpsk_points)?;

        let mut planner = FftPlanner::new();
        let ifft = planner.plan_fft_inverse(params.nb_fft);

        info!(
            nb_fft = params.nb_fft,
            modulation = mapper.name(),
            nb_data_carriers = params.nb_data_carriers,
            nb_pilots = params.nb_pilots,
            nb_message_split = params.nb_message_split,
            frequency_spreading = params.frequency_spreading,
            nb_cyclic_prefix = params.nb_cyclic_prefix,
            "Created OFDM modulator with subcarrier spacing of {} Hz",
            params.subcarrier_spacing_hz,
        );

        Ok(Self {
            settings,
            params,
            mapper,
            pilot_bpsk_points,
            subcarrier_maps,
            subcarrier_layouts,
            pilot_set_index: 0,
            pilot_value_index: 0,
            pilot_bit_source: Box::new(Pn9::default()),
            ifft,
        })
    }

    /// Replaces the PN9 generator used for pseudo random pilots.
    pub fn with_bit_source(mut self, source: Box<dyn BitSource + Send>) -> Self {
        self.pilot_bit_source = source;
        self
    }

    pub fn settings(&self) -> &OfdmModulatorSettings {
        &self.settings
    }

    pub fn params(&self) -> &OfdmParameters {
        &self.params
    }

    /// The pilot set that the next OFDM symbol will use.
    pub fn pilot_set_index(&self) -> usize {
        self.pilot_set_index
    }

    /// Position of the next value in the pilot value sequence.
    pub fn pilot_value_index(&self) -> usize {
        self.pilot_value_index
    }

    /// Modulates a message of bits into I/Q samples.
    /// Its length must be a multiple of `params().nb_message_split` unless `pad` is set, in which case it is zero padded.
    pub fn message_to_iq(&mut self, bits: &[u8], pad: bool) -> OfdmResult<IqSignal> {
        let subcarriers = self.message_to_subcarriers(bits, pad)?;
        self.subcarriers_to_iq(&subcarriers)
    }

    /// Builds the centered spectrum of each OFDM symbol without transforming it to the time domain.
    pub fn message_to_subcarriers(&mut self, bits: &[u8], pad: bool) -> OfdmResult<SymbolGrid<Complex32>> {
        let message = split_message(bits, self.params.nb_message_split, pad)?;
        let mapped = self.constellation_map(&message)?;
        let spread = apply_frequency_spreading(&mapped, self.params.frequency_spreading)?;
        debug!(
            "Spread {} carriers to {} carriers ({}x)",
            mapped.nb_rows(), spread.nb_rows(), self.params.frequency_spreading,
        );
        // NOTE: Every fallible step is done so pilot cursors only move for a complete grid
        Ok(self.add_pilots_and_padding(&spread))
    }

    /// Converts centered spectrums with `nb_fft` rows into I/Q samples.
    pub fn subcarriers_to_iq(&self, subcarriers: &SymbolGrid<Complex32>) -> OfdmResult<IqSignal> {
        let nb_fft = self.params.nb_fft;
        if subcarriers.nb_rows() != nb_fft {
            return Err(OfdmError::Shape(format!(
                "Invalid number of subcarriers ({} / {})", subcarriers.nb_rows(), nb_fft,
            )));
        }

        let nb_symbol_period = self.params.nb_symbol_period;
        let mut samples = vec![Complex32::default(); subcarriers.nb_symbols()*nb_symbol_period];
        let mut fft_buffer = vec![Complex32::default(); nb_fft];
        // rustfft's inverse is unscaled
        let scale = 1.0 / (nb_fft as f32);

        debug!(nb_symbols = subcarriers.nb_symbols(), "Applying IFFT and {} sample cyclic prefix", self.params.nb_cyclic_prefix);
        for (spectrum, symbol_out) in izip!(subcarriers.iter_symbols(), samples.chunks_exact_mut(nb_symbol_period)) {
            fft_buffer.copy_from_slice(spectrum);
            apply_spectrum_shift(&mut fft_buffer);
            self.ifft.process(&mut fft_buffer);
            for x in fft_buffer.iter_mut() {
                *x *= scale;
            }
            apply_cyclic_prefix(&fft_buffer, self.params.nb_cyclic_prefix, symbol_out);
        }

        Ok(IqSignal::from_samples(&samples, nb_symbol_period, self.params.sample_period))
    }

    fn constellation_map(&self, message: &SymbolGrid<u8>) -> OfdmResult<SymbolGrid<Complex32>> {
        let mut mapped = SymbolGrid::<Complex32>::new(self.params.nb_mapped_carriers, message.nb_symbols());
        let factor = self.settings.modulation_factor;
        for (x, y) in izip!(message.iter_symbols(), mapped.iter_symbols_mut()) {
            self.mapper.convert(x, y)?;
            for value in y.iter_mut() {
                *value *= factor;
            }
        }
        debug!(
            "Mapped {}x{} bits to {}x{} {} symbols",
            message.nb_rows(), message.nb_symbols(), mapped.nb_rows(), mapped.nb_symbols(), self.mapper.name(),
        );
        Ok(mapped)
    }

    fn add_pilots_and_padding(&mut self, spread: &SymbolGrid<Complex32>) -> SymbolGrid<Complex32> {
        assert!(spread.nb_rows() == self.params.nb_spread_carriers, "Spread grid has {} rows but expected {}", spread.nb_rows(), self.params.nb_spread_carriers);

        let nb_pilots = self.params.nb_pilots;
        let mut subcarriers = SymbolGrid::<Complex32>::new(self.params.nb_fft, spread.nb_symbols());
        let mut pilots = vec![Complex32::default(); nb_pilots];

        for (data, spectrum) in izip!(spread.iter_symbols(), subcarriers.iter_symbols_mut()) {
            let pilot_set_index = self.pilot_set_index;
            for pilot in pilots.iter_mut() {
                *pilot = self.next_pilot_value();
            }
            fill_ofdm_symbol(&self.subcarrier_maps[pilot_set_index], data, &pilots, spectrum);

            debug!(pilot_set = pilot_set_index, nb_pilots, "Symbol layout {}", self.subcarrier_layouts[pilot_set_index]);
            if nb_pilots > 0 {
                self.pilot_set_index = (self.pilot_set_index + 1) % self.subcarrier_maps.len();
            }
        }
        debug!(
            "Added {}+{} padding bins and DC tone at bin {}",
            self.params.nb_padding_left, self.params.nb_padding_right, self.params.dc_index(),
        );
        subcarriers
    }

    fn next_pilot_value(&mut self) -> Complex32 {
        match &self.settings.pilot_values {
            Some(PilotValues::Pn9) => {
                let bit = self.pilot_bit_source.next_bit() & 1;
                self.pilot_bpsk_points[bit as usize]
            },
            Some(PilotValues::Sequence(values)) => {
                let value = values[self.pilot_value_index];
                self.pilot_value_index = (self.pilot_value_index + 1) % values.len();
                value
            },
            None => Complex32::default(),
        }
    }
}

/// Splits a message into one column of `nb_message_split` bits per OFDM symbol.
///
/// # Diagram
/// ```text
/// 0    n    2n   ..
/// 1    n+1  2n+1 ..
/// .    .    .
/// n-1  2n-1 3n-1 ..
/// ```
///
/// An empty message gives a grid without any symbols.
pub fn split_message(bits: &[u8], nb_message_split: usize, pad: bool) -> OfdmResult<SymbolGrid<u8>> {
    if nb_message_split == 0 {
        return Err(OfdmError::Shape("Message split length must be positive".into()));
    }

    let remainder = bits.len() % nb_message_split;
    if remainder != 0 && !pad {
        return Err(OfdmError::Shape(format!(
            "Message size must be a multiple of {} (it currently is {})", nb_message_split, bits.len(),
        )));
    }

    let mut message = bits.to_vec();
    if remainder != 0 {
        let nb_missing = nb_message_split - remainder;
        message.resize(bits.len() + nb_missing, 0);
        debug!("Padded message with {} zeros ({} -> {})", nb_missing, bits.len(), message.len());
    }

    let message = SymbolGrid::from_vec(message, nb_message_split)?;
    debug!(
        "Split message of {} bits into {} channels before mapping and {} OFDM symbols",
        bits.len(), message.nb_rows(), message.nb_symbols(),
    );
    Ok(message)
}

/// Moves a centered spectrum (most negative frequency first) into FFT order (DC first).
pub fn apply_spectrum_shift<T>(spectrum: &mut [T]) {
    let half = spectrum.len()/2;
    spectrum.rotate_left(half);
}

/// Writes the symbol into `out` behind a copy of its last `nb_cyclic_prefix` samples.
pub fn apply_cyclic_prefix<T: Copy>(symbol: &[T], nb_cyclic_prefix: usize, out: &mut [T]) {
    let length = symbol.len();
    assert!(nb_cyclic_prefix <= length, "Cyclic prefix ({}) is longer than the symbol ({})", nb_cyclic_prefix, length);
    assert!(out.len() == length + nb_cyclic_prefix, "Output ({}) must fit the prefix and symbol ({})", out.len(), length + nb_cyclic_prefix);

    let (prefix, body) = out.split_at_mut(nb_cyclic_prefix);
    prefix.copy_from_slice(&symbol[length-nb_cyclic_prefix..]);
    body.copy_from_slice(symbol);
}
