//! The row-major [`Grid`] payload underlying every raster band.

use crate::error::GridError;

/// A dense, row-major 2D grid of `f32` cells.
///
/// The origin is the upper-left cell: row index increases downward,
/// column index increases to the right, matching the pixel coordinate
/// convention of north-up raster files.
///
/// `Grid` carries no georeferencing of its own; pairing a grid with a
/// [`GeoTransform`](crate::GeoTransform) is what turns pixel indices into
/// world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<f32>,
}

impl Grid {
    /// Create a grid of the given shape with all cells set to zero.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::BadDimensions`] if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        Self::filled(width, height, 0.0)
    }

    /// Create a grid of the given shape with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::BadDimensions {
                reason: format!("width and height must be nonzero, got {width}x{height}"),
            });
        }
        Ok(Self {
            width,
            height,
            cells: vec![value; width * height],
        })
    }

    /// Wrap an existing row-major cell buffer.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::BadDimensions`] if the buffer length does not
    /// equal `width * height`, or a dimension is zero.
    pub fn from_cells(width: usize, height: usize, cells: Vec<f32>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::BadDimensions {
                reason: format!("width and height must be nonzero, got {width}x{height}"),
            });
        }
        if cells.len() != width * height {
            return Err(GridError::BadDimensions {
                reason: format!(
                    "cell buffer has {} values, expected {}",
                    cells.len(),
                    width * height
                ),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// A zero grid with the same shape as `other`.
    pub fn zeros_like(other: &Self) -> Self {
        Self {
            width: other.width,
            height: other.height,
            cells: vec![0.0; other.cells.len()],
        }
    }

    /// Grid width in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Shape as `(height, width)`, the matrix convention.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has zero cells. Always false for a constructed
    /// grid, provided for iterator-style completeness.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    /// Read the cell at `(row, col)`, if in bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.height && col < self.width {
            Some(self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// Write the cell at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when the index is outside the grid.
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<(), GridError> {
        if row >= self.height || col >= self.width {
            return Err(GridError::OutOfBounds {
                row,
                col,
                height: self.height,
                width: self.width,
            });
        }
        let i = self.index(row, col);
        self.cells[i] = value;
        Ok(())
    }

    /// The raw row-major cell buffer.
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Mutable access to the raw row-major cell buffer.
    pub fn cells_mut(&mut self) -> &mut [f32] {
        &mut self.cells
    }

    /// Iterate cells as `(row, col, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i / width, i % width, v))
    }

    /// Number of cells with a nonzero value.
    pub fn count_nonzero(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0.0).count()
    }

    /// The sorted, distinct finite values present in the grid.
    pub fn unique_values(&self) -> Vec<f32> {
        let mut vals: Vec<f32> = self.cells.iter().copied().filter(|v| v.is_finite()).collect();
        vals.sort_by(|a, b| a.partial_cmp(b).expect("finite values compare"));
        vals.dedup();
        vals
    }

    /// Whether every cell is exactly 0.0 or 1.0, the contract for
    /// presence/absence grids.
    pub fn is_binary(&self) -> bool {
        self.cells.iter().all(|&v| v == 0.0 || v == 1.0)
    }

    /// Apply `f` to every cell in place.
    pub fn map_in_place(&mut self, mut f: impl FnMut(f32) -> f32) {
        for v in &mut self.cells {
            *v = f(*v);
        }
    }

    /// Combine two grids cell-by-cell into a new grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] when the shapes differ.
    pub fn combine(&self, other: &Self, mut f: impl FnMut(f32, f32) -> f32) -> Result<Self, GridError> {
        if self.shape() != other.shape() {
            return Err(GridError::ShapeMismatch {
                expected: self.shape(),
                got: other.shape(),
            });
        }
        let cells = self
            .cells
            .iter()
            .zip(&other.cells)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self {
            width: self.width,
            height: self.height,
            cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert!(Grid::new(0, 4).is_err());
        assert!(Grid::new(4, 0).is_err());
    }

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(Grid::from_cells(3, 3, vec![0.0; 8]).is_err());
    }

    #[test]
    fn set_get_roundtrip() {
        let mut g = Grid::new(4, 3).unwrap();
        g.set(2, 1, 7.5).unwrap();
        assert_eq!(g.get(2, 1), Some(7.5));
        assert_eq!(g.get(3, 0), None);
        assert!(g.set(0, 4, 1.0).is_err());
    }

    #[test]
    fn unique_values_sorted_and_deduped() {
        let g = Grid::from_cells(2, 2, vec![3.0, 1.0, 3.0, f32::NAN]).unwrap();
        assert_eq!(g.unique_values(), vec![1.0, 3.0]);
    }

    #[test]
    fn binary_contract() {
        let g = Grid::from_cells(2, 1, vec![0.0, 1.0]).unwrap();
        assert!(g.is_binary());
        let g = Grid::from_cells(2, 1, vec![0.0, 2.0]).unwrap();
        assert!(!g.is_binary());
    }

    #[test]
    fn combine_checks_shape() {
        let a = Grid::new(2, 2).unwrap();
        let b = Grid::new(3, 2).unwrap();
        assert!(a.combine(&b, |x, y| x + y).is_err());
    }

    proptest! {
        #[test]
        fn iter_visits_every_cell_in_row_major_order(
            w in 1usize..12,
            h in 1usize..12,
        ) {
            let cells: Vec<f32> = (0..w * h).map(|i| i as f32).collect();
            let g = Grid::from_cells(w, h, cells).unwrap();
            let mut expected = 0usize;
            for (row, col, v) in g.iter() {
                prop_assert_eq!(row * w + col, expected);
                prop_assert_eq!(v as usize, expected);
                expected += 1;
            }
            prop_assert_eq!(expected, w * h);
        }

        #[test]
        fn count_nonzero_matches_filter(
            cells in prop::collection::vec(-2.0f32..2.0, 1..64),
        ) {
            let w = cells.len();
            let expected = cells.iter().filter(|&&v| v != 0.0).count();
            let g = Grid::from_cells(w, 1, cells).unwrap();
            prop_assert_eq!(g.count_nonzero(), expected);
        }
    }
}
