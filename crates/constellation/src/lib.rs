pub mod constellation_error;
pub mod constellation_mapper;
pub mod pn9_sequence;

pub use constellation_error::ConstellationError;
pub use constellation_mapper::{get_constellation_mapper, ConstellationMapper, ModulationKind};
pub use pn9_sequence::{BitSource, Pn9};
