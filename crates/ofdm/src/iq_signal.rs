use crate::symbol_grid::chunk_slice;
use num::complex::Complex32;

/// Time domain output of the modulator.
///
/// Symbols are laid out one after another, each with its cyclic prefix in front.
/// ```text
/// | SYM0          | SYM1          | ...
/// | CP0 | FFT0    | CP1 | FFT1    | ...
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IqSignal {
    /// In-phase component (real part).
    pub i: Vec<f32>,
    /// Quadrature component (imaginary part).
    pub q: Vec<f32>,
    /// Time of each sample in seconds, starting at zero.
    pub t: Vec<f32>,
    pub nb_symbols: usize,
    /// Number of samples in each symbol including its cyclic prefix.
    pub nb_symbol_period: usize,
    /// Duration of one sample in seconds.
    pub sample_period: f32,
}

impl IqSignal {
    pub fn from_samples(samples: &[Complex32], nb_symbol_period: usize, sample_period: f32) -> Self {
        assert!(nb_symbol_period > 0);
        assert!(samples.len() % nb_symbol_period == 0, "{} samples do not form whole symbols of {} samples", samples.len(), nb_symbol_period);

        let (i, q) = samples.iter().map(|x| (x.re, x.im)).unzip();
        let t = (0..samples.len()).map(|n| (n as f32) * sample_period).collect();
        Self {
            i,
            q,
            t,
            nb_symbols: samples.len() / nb_symbol_period,
            nb_symbol_period,
            sample_period,
        }
    }

    pub fn len(&self) -> usize {
        self.i.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i.is_empty()
    }

    pub fn symbol_i(&self, index: usize) -> &[f32] {
        &self.i[chunk_slice(index, self.nb_symbol_period)]
    }

    pub fn symbol_q(&self, index: usize) -> &[f32] {
        &self.q[chunk_slice(index, self.nb_symbol_period)]
    }

    /// Recombines I and Q into complex samples.
    pub fn samples(&self) -> impl Iterator<Item = Complex32> + '_ {
        self.i.iter().zip(self.q.iter()).map(|(&re, &im)| Complex32::new(re, im))
    }
}
