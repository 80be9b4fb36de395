use crate::constellation_error::ConstellationError;
use num::complex::Complex32;
use std::fmt;
use std::str::FromStr;

/// The constellations that can be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModulationKind {
    Bpsk,
    Qpsk,
    Qam16,
}

impl ModulationKind {
    pub fn bits_per_symbol(&self) -> usize {
        match self {
            ModulationKind::Bpsk  => 1,
            ModulationKind::Qpsk  => 2,
            ModulationKind::Qam16 => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModulationKind::Bpsk  => "BPSK",
            ModulationKind::Qpsk  => "QPSK",
            ModulationKind::Qam16 => "QAM16",
        }
    }
}

impl fmt::Display for ModulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModulationKind {
    type Err = ConstellationError;
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_uppercase().as_str() {
            "BPSK"            => Ok(ModulationKind::Bpsk),
            "QPSK"            => Ok(ModulationKind::Qpsk),
            "QAM16" | "16QAM" => Ok(ModulationKind::Qam16),
            _ => Err(ConstellationError::UnknownModulation(name.to_string())),
        }
    }
}

/// Converts groups of bits into complex constellation points.
pub trait ConstellationMapper {
    fn bits_per_symbol(&self) -> usize;
    fn name(&self) -> &'static str;
    /// Maps `bits` into `symbols`, where each symbol consumes `bits_per_symbol()` consecutive bits.
    fn convert(&self, bits: &[u8], symbols: &mut [Complex32]) -> Result<(), ConstellationError>;
}

/// Creates the mapper for a modulation.
/// When `msb_first` is false each group of bits is read least significant bit first.
pub fn get_constellation_mapper(kind: ModulationKind, msb_first: bool) -> Box<dyn ConstellationMapper + Send + Sync> {
    Box::new(LookupMapper::new(kind, msb_first))
}

/// Mapper backed by a table indexed by the value of each bit group (most significant bit first).
struct LookupMapper {
    kind: ModulationKind,
    msb_first: bool,
    table: Vec<Complex32>,
}

impl LookupMapper {
    fn new(kind: ModulationKind, msb_first: bool) -> Self {
        let table = match kind {
            ModulationKind::Bpsk => vec![
                Complex32::new(-1.0, 0.0),
                Complex32::new( 1.0, 0.0),
            ],
            ModulationKind::Qpsk => {
                let scale = std::f32::consts::FRAC_1_SQRT_2;
                (0..4)
                    .map(|value: usize| {
                        let re = antipodal(value >> 1);
                        let im = antipodal(value & 1);
                        Complex32::new(re, im) * scale
                    })
                    .collect()
            },
            ModulationKind::Qam16 => {
                let scale = 1.0 / 10.0_f32.sqrt();
                (0..16)
                    .map(|value: usize| {
                        let re = gray_amplitude_4(value >> 2);
                        let im = gray_amplitude_4(value & 0b11);
                        Complex32::new(re, im) * scale
                    })
                    .collect()
            },
        };
        assert!(table.len() == 1 << kind.bits_per_symbol(), "Constellation table must cover every bit combination");
        Self { kind, msb_first, table }
    }

    fn group_value(&self, group: &[u8]) -> usize {
        let fold = |acc: usize, bit: &u8| (acc << 1) | (*bit as usize);
        match self.msb_first {
            true  => group.iter().fold(0, fold),
            false => group.iter().rev().fold(0, fold),
        }
    }
}

impl ConstellationMapper for LookupMapper {
    fn bits_per_symbol(&self) -> usize {
        self.kind.bits_per_symbol()
    }

    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn convert(&self, bits: &[u8], symbols: &mut [Complex32]) -> Result<(), ConstellationError> {
        let bits_per_symbol = self.bits_per_symbol();
        if bits.len() != symbols.len()*bits_per_symbol {
            return Err(ConstellationError::LengthMismatch {
                bits: bits.len(),
                symbols: symbols.len(),
                bits_per_symbol,
            });
        }
        if let Some((index, &value)) = bits.iter().enumerate().find(|&(_, &b)| b > 1) {
            return Err(ConstellationError::InvalidBit { index, value });
        }

        for (group, symbol) in bits.chunks_exact(bits_per_symbol).zip(symbols.iter_mut()) {
            *symbol = self.table[self.group_value(group)];
        }
        Ok(())
    }
}

#[inline(always)]
fn antipodal(bit: usize) -> f32 {
    match bit {
        0 => -1.0,
        _ =>  1.0,
    }
}

// Gray coded levels for a pair of bits: 00 -> -3, 01 -> -1, 11 -> +1, 10 -> +3
#[inline(always)]
fn gray_amplitude_4(pair: usize) -> f32 {
    match pair {
        0b00 => -3.0,
        0b01 => -1.0,
        0b11 =>  1.0,
        _    =>  3.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn map(kind: ModulationKind, msb_first: bool, bits: &[u8]) -> Vec<Complex32> {
        let mapper = get_constellation_mapper(kind, msb_first);
        let mut symbols = vec![Complex32::default(); bits.len() / mapper.bits_per_symbol()];
        mapper.convert(bits, &mut symbols).expect("convert");
        symbols
    }

    #[test]
    fn parses_modulation_names() {
        assert_eq!("BPSK".parse::<ModulationKind>().unwrap(), ModulationKind::Bpsk);
        assert_eq!("qpsk".parse::<ModulationKind>().unwrap(), ModulationKind::Qpsk);
        assert_eq!("QAM16".parse::<ModulationKind>().unwrap(), ModulationKind::Qam16);
        assert_eq!("16QAM".parse::<ModulationKind>().unwrap(), ModulationKind::Qam16);
        assert_eq!(
            "QAM64".parse::<ModulationKind>(),
            Err(ConstellationError::UnknownModulation("QAM64".into())),
        );
    }

    #[test]
    fn bpsk_maps_bits_to_real_axis() {
        let symbols = map(ModulationKind::Bpsk, true, &[0, 1, 1, 0]);
        assert_eq!(symbols, vec![
            Complex32::new(-1.0, 0.0),
            Complex32::new( 1.0, 0.0),
            Complex32::new( 1.0, 0.0),
            Complex32::new(-1.0, 0.0),
        ]);
    }

    #[test]
    fn qpsk_puts_first_bit_on_inphase() {
        let s = std::f32::consts::FRAC_1_SQRT_2;
        let symbols = map(ModulationKind::Qpsk, true, &[1, 0]);
        assert_abs_diff_eq!(symbols[0].re,  s, epsilon = 1e-6);
        assert_abs_diff_eq!(symbols[0].im, -s, epsilon = 1e-6);

        let symbols = map(ModulationKind::Qpsk, false, &[1, 0]);
        assert_abs_diff_eq!(symbols[0].re, -s, epsilon = 1e-6);
        assert_abs_diff_eq!(symbols[0].im,  s, epsilon = 1e-6);
    }

    #[test]
    fn qam16_has_unit_average_energy() {
        let bits: Vec<u8> = (0..16u8)
            .flat_map(|v| (0..4).rev().map(move |i| (v >> i) & 1))
            .collect();
        let symbols = map(ModulationKind::Qam16, true, &bits);
        let energy: f32 = symbols.iter().map(|x| x.norm_sqr()).sum::<f32>() / 16.0;
        assert_abs_diff_eq!(energy, 1.0, epsilon = 1e-5);

        // 1011 -> I level of 10 (+3), Q level of 11 (+1)
        let symbol = map(ModulationKind::Qam16, true, &[1, 0, 1, 1])[0] * 10.0_f32.sqrt();
        assert_abs_diff_eq!(symbol.re, 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(symbol.im, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn rejects_bad_lengths_and_bits() {
        let mapper = get_constellation_mapper(ModulationKind::Qpsk, true);
        let mut symbols = vec![Complex32::default(); 2];
        assert_eq!(
            mapper.convert(&[0, 1, 1], &mut symbols),
            Err(ConstellationError::LengthMismatch { bits: 3, symbols: 2, bits_per_symbol: 2 }),
        );
        assert_eq!(
            mapper.convert(&[0, 1, 2, 0], &mut symbols),
            Err(ConstellationError::InvalidBit { index: 2, value: 2 }),
        );
    }
}
