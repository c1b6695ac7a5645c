//! PNG previews of raster bands.

use std::path::Path;

use image::{GrayImage, Luma};
use log::info;

use crate::error::RasterError;
use crate::raster::Raster;

/// Render a band as a grayscale PNG.
///
/// Finite, non-nodata values are stretched linearly between the band
/// minimum and maximum; nodata cells render black. A constant band
/// renders mid-gray.
pub fn render_png(raster: &Raster, band: usize, path: &Path) -> Result<(), RasterError> {
    let grid = raster.band(band)?;
    let nodata = raster.nodata();

    let valid = |v: f32| -> bool { v.is_finite() && Some(v) != nodata };
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for &v in grid.cells() {
        if valid(v) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    let span = hi - lo;

    let (height, width) = grid.shape();
    let mut img = GrayImage::new(width as u32, height as u32);
    for (row, col, v) in grid.iter() {
        let shade = if !valid(v) {
            0
        } else if span <= 0.0 {
            128
        } else {
            (1.0 + 254.0 * (v - lo) / span).round() as u8
        };
        img.put_pixel(col as u32, row as u32, Luma([shade]));
    }
    img.save(path).map_err(|e| RasterError::Render {
        detail: e.to_string(),
    })?;
    info!("rendered band {band} to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use biotope_core::{Crs, GeoTransform, Grid};

    #[test]
    fn writes_a_png_file() {
        let mut g = Grid::new(8, 8).unwrap();
        g.set(0, 0, 10.0).unwrap();
        g.set(7, 7, 20.0).unwrap();
        let r = Raster::single(g, GeoTransform::global(22.5), Crs::WGS84, Some(0.0)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        render_png(&r, 1, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn bad_band_is_an_error() {
        let g = Grid::new(2, 2).unwrap();
        let r = Raster::single(g, GeoTransform::global(90.0), Crs::WGS84, None).unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(render_png(&r, 2, &dir.path().join("x.png")).is_err());
    }
}
