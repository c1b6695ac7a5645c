//! The in-memory raster: bands plus georeferencing.

use crate::error::RasterError;
use biotope_core::{world_coordinates, Bounds, Crs, GeoTransform, Grid};

/// A georeferenced multi-band raster held in memory.
///
/// All bands share one shape; the shape, transform, CRS, and nodata value
/// are fixed at construction. Band indices are 1-based throughout, the
/// GDAL convention the rest of the toolkit follows.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    transform: GeoTransform,
    crs: Crs,
    nodata: Option<f32>,
    bands: Vec<Grid>,
}

impl Raster {
    /// Assemble a raster from bands.
    ///
    /// # Errors
    ///
    /// - [`RasterError::InvalidFormat`] when no bands are given.
    /// - [`RasterError::ShapeMismatch`] when band shapes differ.
    pub fn new(
        bands: Vec<Grid>,
        transform: GeoTransform,
        crs: Crs,
        nodata: Option<f32>,
    ) -> Result<Self, RasterError> {
        let first = bands.first().ok_or_else(|| RasterError::InvalidFormat {
            detail: "raster needs at least one band".to_string(),
        })?;
        let shape = first.shape();
        for band in &bands {
            if band.shape() != shape {
                return Err(RasterError::ShapeMismatch {
                    expected: shape,
                    got: band.shape(),
                });
            }
        }
        Ok(Self {
            transform,
            crs,
            nodata,
            bands,
        })
    }

    /// A single-band raster.
    pub fn single(
        band: Grid,
        transform: GeoTransform,
        crs: Crs,
        nodata: Option<f32>,
    ) -> Result<Self, RasterError> {
        Self::new(vec![band], transform, crs, nodata)
    }

    /// Width in columns.
    pub fn width(&self) -> usize {
        self.bands[0].width()
    }

    /// Height in rows.
    pub fn height(&self) -> usize {
        self.bands[0].height()
    }

    /// Shape as `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        self.bands[0].shape()
    }

    /// Number of bands.
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// The pixel-to-world transform.
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// The coordinate reference system.
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// The nodata sentinel, if declared.
    pub fn nodata(&self) -> Option<f32> {
        self.nodata
    }

    /// World extent covered by the raster.
    pub fn bounds(&self) -> Bounds {
        self.transform.bounds(self.width(), self.height())
    }

    /// Pixel size as `(x_res, y_res)`.
    pub fn resolution(&self) -> (f64, f64) {
        self.transform.resolution()
    }

    /// Borrow a band by 1-based index.
    ///
    /// # Errors
    ///
    /// [`RasterError::BandOutOfRange`] when the index is 0 or past the
    /// band count.
    pub fn band(&self, index: usize) -> Result<&Grid, RasterError> {
        if index == 0 || index > self.bands.len() {
            return Err(RasterError::BandOutOfRange {
                band: index,
                count: self.bands.len(),
            });
        }
        Ok(&self.bands[index - 1])
    }

    /// Mutable band access by 1-based index.
    pub fn band_mut(&mut self, index: usize) -> Result<&mut Grid, RasterError> {
        if index == 0 || index > self.bands.len() {
            return Err(RasterError::BandOutOfRange {
                band: index,
                count: self.bands.len(),
            });
        }
        Ok(&mut self.bands[index - 1])
    }

    /// All bands in order.
    pub fn bands(&self) -> &[Grid] {
        &self.bands
    }

    /// World cell-center coordinates of band cells, as `(lat, lon)` pairs.
    ///
    /// With `filter_nodata`, only cells different from the raster's nodata
    /// sentinel (0.0 when none is declared) are converted, the usual way
    /// presence and pseudo-absence grids become point lists.
    pub fn pixel_to_world_coordinates(
        &self,
        band: usize,
        filter_nodata: bool,
    ) -> Result<Vec<(f64, f64)>, RasterError> {
        let grid = self.band(band)?;
        let nodata = self.nodata.unwrap_or(0.0);
        Ok(world_coordinates(grid, &self.transform, filter_nodata, nodata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(w: usize, h: usize) -> Grid {
        Grid::new(w, h).unwrap()
    }

    #[test]
    fn rejects_empty_and_mismatched_bands() {
        let t = GeoTransform::global(1.0);
        assert!(Raster::new(vec![], t, Crs::WGS84, None).is_err());
        let r = Raster::new(vec![grid(4, 2), grid(2, 4)], t, Crs::WGS84, None);
        assert!(matches!(r, Err(RasterError::ShapeMismatch { .. })));
    }

    #[test]
    fn band_indexing_is_one_based() {
        let t = GeoTransform::global(1.0);
        let r = Raster::new(vec![grid(4, 2), grid(4, 2)], t, Crs::WGS84, None).unwrap();
        assert!(r.band(1).is_ok());
        assert!(r.band(2).is_ok());
        assert!(matches!(r.band(0), Err(RasterError::BandOutOfRange { .. })));
        assert!(matches!(r.band(3), Err(RasterError::BandOutOfRange { .. })));
    }

    #[test]
    fn bounds_follow_transform() {
        let t = GeoTransform::global(0.5);
        let r = Raster::single(grid(720, 360), t, Crs::WGS84, None).unwrap();
        let b = r.bounds();
        assert_eq!((b.left, b.bottom, b.right, b.top), (-180.0, -90.0, 180.0, 90.0));
        assert_eq!(r.resolution(), (0.5, 0.5));
    }

    #[test]
    fn coordinates_idempotent_without_mutation(){
        let t = GeoTransform::global(1.0);
        let mut g = grid(4, 4);
        g.set(0, 0, 3.0).unwrap();
        let r = Raster::single(g, t, Crs::WGS84, Some(0.0)).unwrap();
        let a = r.pixel_to_world_coordinates(1, true).unwrap();
        let b = r.pixel_to_world_coordinates(1, true).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
    }
}
