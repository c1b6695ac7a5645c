//! Bulk pixel-to-world coordinate conversion.

use crate::grid::Grid;
use crate::transform::GeoTransform;

/// Convert every grid cell to its world cell-center coordinate.
///
/// Returns `(latitude, longitude)` pairs in row-major cell order. When
/// `filter_nodata` is set, cells equal to `nodata` (and NaN cells) are
/// skipped; this is how presence grids and sampled pseudo-absence grids
/// are turned into point lists. With `filter_nodata` off, every cell is
/// converted, which yields the base coordinate list of a map.
pub fn world_coordinates(
    grid: &Grid,
    transform: &GeoTransform,
    filter_nodata: bool,
    nodata: f32,
) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    for (row, col, value) in grid.iter() {
        if filter_nodata && (value == nodata || value.is_nan()) {
            continue;
        }
        let (x, y) = transform.cell_center(row, col);
        out.push((y, x));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_visits_every_cell() {
        let grid = Grid::new(720, 360).unwrap();
        let t = GeoTransform::global(0.5);
        let coords = world_coordinates(&grid, &t, false, 0.0);
        assert_eq!(coords.len(), 259_200);
        // First cell center of the half-degree global grid.
        assert_eq!(coords[0], (89.75, -179.75));
    }

    #[test]
    fn filtered_keeps_only_burned_cells() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set(1, 2, 1.0).unwrap();
        grid.set(3, 0, 2.0).unwrap();
        let t = GeoTransform::global(1.0);
        let coords = world_coordinates(&grid, &t, true, 0.0);
        assert_eq!(coords.len(), 2);
    }
}
