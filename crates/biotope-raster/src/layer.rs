//! The raster environmental layer: a file-backed raster with lifecycle.

use std::path::{Path, PathBuf};

use biotope_core::{Bounds, Crs, Grid, Source};
use biotope_geom::Polygon;
use log::info;

use crate::error::RasterError;
use crate::geotiff::{read_geotiff, write_geotiff, SampleKind};
use crate::polygonize::polygonize;
use crate::raster::Raster;
use crate::render::render_png;
use crate::reproject::{reproject, ReprojectOptions};
use crate::sample::{sample_pseudo_absences, PseudoAbsenceOptions, PseudoAbsenceSample};

/// A grid-based environmental layer backed by a GeoTIFF file.
///
/// The payload is loaded explicitly and can be dropped again with
/// [`close`](RasterLayer::close); every accessor that needs the payload
/// reports [`RasterError::NotLoaded`] until the next
/// [`load`](RasterLayer::load). Within one load, repeated reads return
/// identical data.
#[derive(Clone, Debug)]
pub struct RasterLayer {
    name: String,
    source: Source,
    path: Option<PathBuf>,
    raster: Option<Raster>,
}

impl RasterLayer {
    /// An empty layer with a display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: Source::Unknown,
            path: None,
            raster: None,
        }
    }

    /// A layer pointing at a file, not yet loaded.
    pub fn from_path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: Source::Unknown,
            path: Some(path.into()),
            raster: None,
        }
    }

    /// Open a file and load it immediately.
    pub fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, RasterError> {
        let mut layer = Self::from_path(name, path);
        layer.load()?;
        Ok(layer)
    }

    /// Wrap an already-assembled raster (e.g. a rasterization result).
    pub fn from_raster(name: impl Into<String>, raster: Raster) -> Self {
        Self {
            name: name.into(),
            source: Source::Unknown,
            path: None,
            raster: Some(raster),
        }
    }

    /// The layer's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The recorded data provenance.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Record the data provenance.
    pub fn set_source(&mut self, source: Source) {
        self.source = source;
    }

    /// The backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Point the layer at a (new) backing file without loading it.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// Load (or reload) the payload from the backing file.
    ///
    /// # Errors
    ///
    /// [`RasterError::NotLoaded`] when no path is set; I/O and format
    /// errors from the GeoTIFF reader otherwise.
    pub fn load(&mut self) -> Result<&Raster, RasterError> {
        let path = self.path.as_ref().ok_or(RasterError::NotLoaded)?;
        let raster = read_geotiff(path)?;
        info!(
            "loaded raster '{}' from {}: {}x{} cells, {} band(s), {}, bounds {:?}",
            self.name,
            path.display(),
            raster.height(),
            raster.width(),
            raster.band_count(),
            raster.crs(),
            raster.bounds(),
        );
        self.raster = Some(raster);
        Ok(self.raster.as_ref().expect("just loaded"))
    }

    /// Whether the payload is currently in memory.
    pub fn is_loaded(&self) -> bool {
        self.raster.is_some()
    }

    /// Drop the in-memory payload. Reads fail until the next load.
    pub fn close(&mut self) {
        if self.raster.take().is_some() {
            info!("closed raster layer '{}'", self.name);
        }
    }

    /// Borrow the loaded payload.
    pub fn raster(&self) -> Result<&Raster, RasterError> {
        self.raster.as_ref().ok_or(RasterError::NotLoaded)
    }

    /// Read one band of the loaded payload (1-based).
    pub fn band(&self, index: usize) -> Result<&Grid, RasterError> {
        self.raster()?.band(index)
    }

    /// World extent of the loaded payload.
    pub fn bounds(&self) -> Result<Bounds, RasterError> {
        Ok(self.raster()?.bounds())
    }

    /// Pixel size of the loaded payload.
    pub fn resolution(&self) -> Result<(f64, f64), RasterError> {
        Ok(self.raster()?.resolution())
    }

    /// CRS of the loaded payload.
    pub fn crs(&self) -> Result<Crs, RasterError> {
        Ok(self.raster()?.crs())
    }

    /// Save the payload as a GeoTIFF.
    pub fn save(&self, path: &Path, kind: SampleKind) -> Result<(), RasterError> {
        let raster = self.raster()?;
        write_geotiff(raster, path, kind)?;
        info!("saved raster '{}' to {}", self.name, path.display());
        Ok(())
    }

    /// Reproject the payload; the layer itself is left untouched.
    pub fn reproject(&self, opts: &ReprojectOptions) -> Result<Raster, RasterError> {
        reproject(self.raster()?, opts)
    }

    /// Trace the shapes of one band into world-coordinate polygons.
    pub fn polygonize(&self, band: usize) -> Result<Vec<(Polygon, f32)>, RasterError> {
        polygonize(self.raster()?, band)
    }

    /// World cell-center coordinates of one band as `(lat, lon)` pairs,
    /// optionally restricted to non-nodata cells.
    pub fn pixel_to_world_coordinates(
        &self,
        band: usize,
        filter_nodata: bool,
    ) -> Result<Vec<(f64, f64)>, RasterError> {
        self.raster()?.pixel_to_world_coordinates(band, filter_nodata)
    }

    /// Draw pseudo-absence cells against this layer's first band.
    ///
    /// See [`sample_pseudo_absences`] for the procedure.
    pub fn sample_pseudo_absences(
        &self,
        species: &Grid,
        opts: &PseudoAbsenceOptions<'_>,
    ) -> Result<PseudoAbsenceSample, RasterError> {
        let raster = self.raster()?;
        sample_pseudo_absences(raster.band(1)?, raster.nodata(), species, opts)
    }

    /// Render one band to a grayscale PNG preview.
    pub fn render_png(&self, band: usize, path: &Path) -> Result<(), RasterError> {
        render_png(self.raster()?, band, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biotope_core::GeoTransform;

    fn layer_with_payload() -> RasterLayer {
        let mut g = Grid::new(4, 4).unwrap();
        g.set(1, 1, 5.0).unwrap();
        let raster = Raster::single(g, GeoTransform::global(45.0), Crs::WGS84, Some(0.0)).unwrap();
        RasterLayer::from_raster("test", raster)
    }

    #[test]
    fn unloaded_layer_reports_not_loaded() {
        let layer = RasterLayer::new("empty");
        assert!(matches!(layer.raster(), Err(RasterError::NotLoaded)));
        assert!(matches!(layer.band(1), Err(RasterError::NotLoaded)));
        let mut layer = RasterLayer::new("no path");
        assert!(matches!(layer.load(), Err(RasterError::NotLoaded)));
    }

    #[test]
    fn close_drops_the_payload() {
        let mut layer = layer_with_payload();
        assert!(layer.is_loaded());
        layer.close();
        assert!(!layer.is_loaded());
        assert!(matches!(layer.band(1), Err(RasterError::NotLoaded)));
    }

    #[test]
    fn save_load_roundtrip_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer.tif");
        let layer = layer_with_payload();
        layer.save(&path, SampleKind::F32).unwrap();

        let loaded = RasterLayer::open("reloaded", &path).unwrap();
        assert_eq!(loaded.raster().unwrap(), layer.raster().unwrap());
        assert_eq!(loaded.resolution().unwrap(), (45.0, 45.0));
    }

    #[test]
    fn repeated_reads_are_identical() {
        let layer = layer_with_payload();
        let a = layer.band(1).unwrap().clone();
        let b = layer.band(1).unwrap().clone();
        assert_eq!(a, b);
    }
}
