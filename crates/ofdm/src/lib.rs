pub mod frequency_spreading;
pub mod iq_signal;
pub mod ofdm_error;
pub mod ofdm_modulator;
pub mod ofdm_modulator_settings;
pub mod ofdm_parameters;
pub mod ofdm_subcarrier_map;
pub mod symbol_grid;

pub use constellation::{BitSource, ConstellationError, ModulationKind, Pn9};
pub use frequency_spreading::apply_frequency_spreading;
pub use iq_signal::IqSignal;
pub use ofdm_error::{OfdmError, OfdmResult};
pub use ofdm_modulator::{apply_cyclic_prefix, apply_spectrum_shift, split_message, OfdmModulator};
pub use ofdm_modulator_settings::{OfdmModulatorSettings, PilotIndices, PilotValues};
pub use ofdm_parameters::OfdmParameters;
pub use symbol_grid::SymbolGrid;
