//! Uniform latitude/longitude grid for proximity queries.
//!
//! Items are bucketed into square cells of a fixed size in degrees. A query
//! inspects the cell containing the query point plus its eight neighbours, so
//! any item within one cell width of the query is guaranteed to be returned as
//! a candidate. Callers apply their own exact distance cut-off.

use std::collections::HashMap;

use crate::distance::Coordinates;

/// Default cell size in degrees (roughly 1.1 km at the equator).
pub const DEFAULT_CELL_DEGREES: f64 = 0.01;

type CellKey = (i64, i64);

/// Grid index over items identified by their position in a caller-owned slice.
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_degrees: f64,
    cells: HashMap<CellKey, Vec<usize>>,
    len: usize,
}

impl GridIndex {
    /// Create an empty grid. Non-positive or non-finite sizes fall back to
    /// [`DEFAULT_CELL_DEGREES`].
    pub fn new(cell_degrees: f64) -> Self {
        let cell_degrees = if cell_degrees.is_finite() && cell_degrees > 0.0 {
            cell_degrees
        } else {
            DEFAULT_CELL_DEGREES
        };
        Self {
            cell_degrees,
            cells: HashMap::new(),
            len: 0,
        }
    }

    /// Build a grid from `(index, position)` pairs.
    pub fn build<I>(cell_degrees: f64, items: I) -> Self
    where
        I: IntoIterator<Item = (usize, Coordinates)>,
    {
        let mut grid = Self::new(cell_degrees);
        for (index, position) in items {
            grid.insert(index, position);
        }
        grid
    }

    pub fn insert(&mut self, index: usize, position: Coordinates) {
        self.cells
            .entry(self.cell_of(position))
            .or_default()
            .push(index);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Items in the 3x3 block of cells around `position`.
    ///
    /// Cells are visited row by row and items within a cell in insertion
    /// order, so the output is stable for a given grid.
    pub fn candidates(&self, position: Coordinates) -> Vec<usize> {
        let (row, col) = self.cell_of(position);
        let mut found = Vec::new();
        for d_row in -1..=1 {
            for d_col in -1..=1 {
                if let Some(items) = self.cells.get(&(row + d_row, col + d_col)) {
                    found.extend_from_slice(items);
                }
            }
        }
        found
    }

    fn cell_of(&self, position: Coordinates) -> CellKey {
        // Floor, not truncation: -0.005 and 0.005 land in different cells.
        (
            (position.lat / self.cell_degrees).floor() as i64,
            (position.lon / self.cell_degrees).floor() as i64,
        )
    }
}
