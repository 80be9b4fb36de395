use crate::ofdm_error::{OfdmError, OfdmResult};
use crate::ofdm_parameters::OfdmParameters;
use num::complex::Complex32;
use std::iter::repeat;

/// What a single FFT bin of an assembled OFDM symbol carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubcarrierSlot {
    /// Padding, unused carriers and the DC tone.
    Null,
    /// Row of the spread data for this symbol.
    Data(usize),
    /// Position of the pilot within its pilot set.
    Pilot(usize),
}

/// Creates the lookup table from FFT bin to its contents for one pilot set.
/// The table covers a centered spectrum where the bin at `nb_fft/2` is DC.
pub fn get_ofdm_subcarrier_map(params: &OfdmParameters, pilot_set: &[i32]) -> OfdmResult<Vec<SubcarrierSlot>> {
    assert!(pilot_set.len() == params.nb_pilots, "Pilot set has {} pilots but parameters expect {}", pilot_set.len(), params.nb_pilots);

    let nb_fft = params.nb_fft;
    let dc_index = params.dc_index();

    // Spectrum before pilots and DC are added
    // | PAD_L | UNUSED | DATA | PAD_R |
    let mut subcarrier_map: Vec<SubcarrierSlot> = Vec::with_capacity(nb_fft);
    subcarrier_map.extend(repeat(SubcarrierSlot::Null).take(params.nb_padding_left + params.nb_unused_carriers));
    subcarrier_map.extend((0..params.nb_spread_carriers).map(SubcarrierSlot::Data));
    subcarrier_map.extend(repeat(SubcarrierSlot::Null).take(params.nb_padding_right));
    assert!(subcarrier_map.len() + params.nb_pilots + 1 == nb_fft);

    // Pilots are inserted in ascending order so each insertion lands on its final bin
    for (ordinal, &pilot_index) in pilot_set.iter().enumerate() {
        let row = pilot_index as isize + dc_index as isize;
        if row < 0 || row >= nb_fft as isize {
            return Err(OfdmError::PilotRange { index: pilot_index, row, nb_fft });
        }
        let mut row = row as usize;
        // NOTE: The DC bin is not in the spectrum yet so bins above it are shifted down by one
        if row > dc_index {
            row -= 1;
        }
        if row > subcarrier_map.len() {
            return Err(OfdmError::PilotRange { index: pilot_index, row: row as isize, nb_fft });
        }
        subcarrier_map.insert(row, SubcarrierSlot::Pilot(ordinal));
    }

    subcarrier_map.insert(dc_index, SubcarrierSlot::Null);
    assert!(subcarrier_map.len() == nb_fft, "Subcarrier map has {} bins instead of {}", subcarrier_map.len(), nb_fft);
    Ok(subcarrier_map)
}

/// Fills a centered spectrum from its subcarrier map.
pub fn fill_ofdm_symbol(
    subcarrier_map: &[SubcarrierSlot],
    data: &[Complex32],
    pilots: &[Complex32],
    spectrum: &mut [Complex32],
) {
    assert!(subcarrier_map.len() == spectrum.len(), "Subcarrier map ({}) and spectrum ({}) have mismatching lengths", subcarrier_map.len(), spectrum.len());
    for (slot, bin) in subcarrier_map.iter().zip(spectrum.iter_mut()) {
        *bin = match *slot {
            SubcarrierSlot::Null         => Complex32::default(),
            SubcarrierSlot::Data(row)    => data[row],
            SubcarrierSlot::Pilot(index) => pilots[index],
        };
    }
}

/// Renders a subcarrier map one character per bin for logging.
/// `0` is padding or an unused carrier, `-` is data, `P` is a pilot and `D` is the DC tone.
pub fn format_subcarrier_map(subcarrier_map: &[SubcarrierSlot], dc_index: usize) -> String {
    subcarrier_map
        .iter()
        .enumerate()
        .map(|(i, slot)| match *slot {
            SubcarrierSlot::Null if i == dc_index => 'D',
            SubcarrierSlot::Null     => '0',
            SubcarrierSlot::Data(_)  => '-',
            SubcarrierSlot::Pilot(_) => 'P',
        })
        .collect()
}
