use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Local mirror of the engine's board, indexed `[x, y]`.
///
/// Empty until the engine generates the board on the first reveal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<Cell>,
}

impl Grid {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn size(&self) -> Coord2 {
        let (width, height) = self.cells.dim();
        (width as Coord, height as Coord)
    }

    pub fn contains(&self, (x, y): Coord2) -> bool {
        let (width, height) = self.size();
        x < width && y < height
    }

    /// Replaces the empty grid with the table returned by board generation.
    ///
    /// `rows` holds `height` rows of `width` cells each.
    pub fn populate(&mut self, width: Coord, height: Coord, rows: &[Vec<Cell>]) -> Result<()> {
        if !self.is_empty() {
            return Err(SyncError::DuplicateGeneration);
        }

        let shape_matches = width > 0
            && height > 0
            && rows.len() == usize::from(height)
            && rows.iter().all(|row| row.len() == usize::from(width));
        if !shape_matches {
            return Err(SyncError::InvalidBoardShape { width, height });
        }

        for (y, row) in rows.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                check_value(x as Coord, y as Coord, cell.value)?;
            }
        }

        self.cells = Array2::from_shape_fn((width, height).to_nd_index(), |(x, y)| rows[y][x]);
        Ok(())
    }

    /// Overwrites whichever of `state` and `value` are given, leaving the other field alone.
    pub fn patch(
        &mut self,
        x: Coord,
        y: Coord,
        state: Option<CellState>,
        value: Option<u8>,
    ) -> Result<()> {
        if let Some(value) = value {
            check_value(x, y, value)?;
        }

        let cell = self
            .cells
            .get_mut((x, y).to_nd_index())
            .ok_or(SyncError::OutOfBounds { x, y })?;

        if let Some(state) = state {
            cell.state = state;
        }
        if let Some(value) = value {
            cell.value = value;
        }
        Ok(())
    }

    /// Hidden/0 for anything outside of the board, including every cell before generation.
    pub fn read(&self, x: Coord, y: Coord) -> Cell {
        self.cells
            .get((x, y).to_nd_index())
            .copied()
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.cells = Array2::default((0, 0));
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((x, y), &cell)| ((x as Coord, y as Coord), cell))
    }

    /// Row-major copy of the board, the same layout board generation uses.
    pub fn rows(&self) -> CellRows {
        let (width, height) = self.size();
        (0..height)
            .map(|y| (0..width).map(|x| self.read(x, y)).collect())
            .collect()
    }
}

fn check_value(x: Coord, y: Coord, value: u8) -> Result<()> {
    if value > MINE_VALUE {
        Err(SyncError::InvalidCellValue { x, y, value })
    } else {
        Ok(())
    }
}
