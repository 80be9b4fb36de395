use crate::ofdm_error::{OfdmError, OfdmResult};
use crate::symbol_grid::SymbolGrid;
use itertools::izip;
use num::complex::Complex32;

// Frequency spreading repeats every mapped carrier across the spectrum with a phase rotation.
// For carrier index k (starting at 1) the rotations are e^(j*2*pi*m/4) for an integer m.
//
// 2x: the data occupies the positive half, its rotated copy the negative half
// | x*e^(j*2pi*(2k-1)/4) | x |
//
// 4x: the data occupies the lower positive quarter
// | x*e^(j*2pi*(2k-1)/4) | x*e^(j*2pi*(3k-1)/4) | x | x*e^(j*2pi*(k-1)/4) |
//
// NOTE: (2k-1) is kept literally rather than read as 2(k-1).

#[derive(Clone, Copy)]
enum Segment {
    /// Copy rotated by the phase multiple for carrier k.
    Rotated(fn(usize) -> usize),
    Original,
}

fn negative_low(k: usize) -> usize { 2*k - 1 }
fn negative_high(k: usize) -> usize { 3*k - 1 }
fn positive_high(k: usize) -> usize { k - 1 }

const DOUBLE_SEGMENTS: [Segment; 2] = [
    Segment::Rotated(negative_low),
    Segment::Original,
];

const QUAD_SEGMENTS: [Segment; 4] = [
    Segment::Rotated(negative_low),
    Segment::Rotated(negative_high),
    Segment::Original,
    Segment::Rotated(positive_high),
];

/// Spreads each symbol of the mapped grid so it has `factor` times as many rows.
pub fn apply_frequency_spreading(mapped: &SymbolGrid<Complex32>, factor: usize) -> OfdmResult<SymbolGrid<Complex32>> {
    let segments: &[Segment] = match factor {
        1 => return Ok(mapped.clone()),
        2 => &DOUBLE_SEGMENTS,
        4 => &QUAD_SEGMENTS,
        _ => return Err(OfdmError::configuration("frequency_spreading", format!("{} must be one of [1, 2, 4]", factor))),
    };

    let nb_rows = mapped.nb_rows();
    let mut spread = SymbolGrid::<Complex32>::new(nb_rows*factor, mapped.nb_symbols());
    for (x, y) in mapped.iter_symbols().zip(spread.iter_symbols_mut()) {
        for (segment, kind) in y.chunks_exact_mut(nb_rows).zip(segments.iter()) {
            match kind {
                Segment::Original => segment.copy_from_slice(x),
                Segment::Rotated(phase_multiple) => {
                    for (out, value, k) in izip!(segment.iter_mut(), x.iter(), 1usize..) {
                        *out = *value * quarter_turn(phase_multiple(k));
                    }
                },
            }
        }
    }
    Ok(spread)
}

/// Exact value of e^(j*2*pi*m/4).
#[inline(always)]
fn quarter_turn(phase_multiple: usize) -> Complex32 {
    match phase_multiple % 4 {
        0 => Complex32::new( 1.0,  0.0),
        1 => Complex32::new( 0.0,  1.0),
        2 => Complex32::new(-1.0,  0.0),
        _ => Complex32::new( 0.0, -1.0),
    }
}
