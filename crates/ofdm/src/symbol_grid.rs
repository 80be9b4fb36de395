use crate::ofdm_error::{OfdmError, OfdmResult};
use std::slice::{ChunksExact, ChunksExactMut};

/// A two dimensional grid of values where each column is one OFDM symbol.
///
/// Columns are stored contiguously, so row `r` of symbol `s` lives at `s*nb_rows + r`.
///
/// # Diagram
/// ```text
///   SYM0  SYM1  ...
/// | 0   | n   | .
/// | 1   | n+1 | .
/// | .   | .   | .
/// | n-1 | 2n-1| .
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolGrid<T> {
    data: Vec<T>,
    nb_rows: usize,
}

impl<T: Copy + Default> SymbolGrid<T> {
    /// Creates a grid filled with default values.
    pub fn new(nb_rows: usize, nb_symbols: usize) -> Self {
        assert!(nb_rows > 0, "Symbol grid must have at least one row");
        Self {
            data: vec![T::default(); nb_rows*nb_symbols],
            nb_rows,
        }
    }
}

impl<T> SymbolGrid<T> {
    /// Wraps a flat buffer holding whole symbols of `nb_rows` values each. An empty buffer holds no symbols.
    pub fn from_vec(data: Vec<T>, nb_rows: usize) -> OfdmResult<Self> {
        if nb_rows == 0 {
            return Err(OfdmError::Shape("symbols must have at least one row".into()));
        }
        if data.len() % nb_rows != 0 {
            return Err(OfdmError::Shape(format!(
                "{} values do not form whole symbols of {} rows", data.len(), nb_rows,
            )));
        }
        Ok(Self { data, nb_rows })
    }

    /// A grid holding a single symbol.
    pub fn from_column(column: Vec<T>) -> OfdmResult<Self> {
        let nb_rows = column.len();
        Self::from_vec(column, nb_rows)
    }

    /// A grid holding one symbol per column. All columns must have the same length.
    pub fn from_columns(columns: Vec<Vec<T>>) -> OfdmResult<Self> {
        let nb_rows = columns.first().map_or(0, |column| column.len());
        if let Some((i, column)) = columns.iter().enumerate().find(|(_, column)| column.len() != nb_rows) {
            return Err(OfdmError::Shape(format!(
                "column {} has {} rows but column 0 has {}", i, column.len(), nb_rows,
            )));
        }
        let data: Vec<T> = columns.into_iter().flatten().collect();
        Self::from_vec(data, nb_rows)
    }

    pub fn nb_rows(&self) -> usize {
        self.nb_rows
    }

    pub fn nb_symbols(&self) -> usize {
        self.data.len() / self.nb_rows
    }

    pub fn symbol(&self, index: usize) -> &[T] {
        &self.data[chunk_slice(index, self.nb_rows)]
    }

    pub fn symbol_mut(&mut self, index: usize) -> &mut [T] {
        &mut self.data[chunk_slice(index, self.nb_rows)]
    }

    pub fn get(&self, row: usize, symbol: usize) -> Option<&T> {
        if row >= self.nb_rows {
            return None;
        }
        self.data.get(symbol*self.nb_rows + row)
    }

    pub fn iter_symbols(&self) -> ChunksExact<'_, T> {
        self.data.chunks_exact(self.nb_rows)
    }

    pub fn iter_symbols_mut(&mut self) -> ChunksExactMut<'_, T> {
        self.data.chunks_exact_mut(self.nb_rows)
    }

    /// Values of every symbol one after another.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

#[inline(always)]
pub(crate) fn span_slice(start: usize, length: usize) -> std::ops::Range<usize> {
    start..start+length
}

#[inline(always)]
pub(crate) fn chunk_slice(index: usize, length: usize) -> std::ops::Range<usize> {
    let start_index = index*length;
    span_slice(start_index, length)
}
