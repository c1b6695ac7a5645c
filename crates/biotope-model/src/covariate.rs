//! The seam between environmental layers and the model grid.

use biotope_core::{Bounds, GeoTransform, Grid};
use biotope_raster::{resample_to, Raster, RasterLayer, Resampling};
use biotope_vector::{rasterize, RasterizeOptions, VectorLayer};

use crate::error::ModelError;

/// The grid a model aligns every covariate onto.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    /// World extent of the model grid.
    pub extent: Bounds,
    /// Square cell size in degrees.
    pub pixel_size: f64,
}

impl GridSpec {
    /// Grid width in columns.
    pub fn width(&self) -> usize {
        ((self.extent.width() / self.pixel_size) as usize).max(1)
    }

    /// Grid height in rows.
    pub fn height(&self) -> usize {
        ((self.extent.height() / self.pixel_size) as usize).max(1)
    }

    /// Shape as `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    /// The pixel-to-world transform of the model grid.
    pub fn transform(&self) -> GeoTransform {
        GeoTransform {
            origin_x: self.extent.left,
            origin_y: self.extent.top,
            pixel_width: self.pixel_size,
            pixel_height: -self.pixel_size,
        }
    }
}

/// One aligned covariate band.
#[derive(Clone, Debug)]
pub struct Covariate {
    /// Cell values on the model grid.
    pub grid: Grid,
    /// The value marking unusable cells, if any.
    pub nodata: Option<f32>,
}

/// Anything that can contribute a covariate column to a model.
///
/// Raster layers resample themselves onto the model grid; vector layers
/// rasterize onto it. The model never needs to know which kind it holds.
pub trait CovariateSource {
    /// Column name in the base table.
    fn name(&self) -> &str;

    /// Produce this source's values aligned to the model grid.
    fn covariate_grid(&self, spec: &GridSpec) -> Result<Covariate, ModelError>;
}

impl CovariateSource for RasterLayer {
    fn name(&self) -> &str {
        RasterLayer::name(self)
    }

    fn covariate_grid(&self, spec: &GridSpec) -> Result<Covariate, ModelError> {
        let raster = self.raster().map_err(|e| ModelError::Covariate {
            layer: RasterLayer::name(self).to_string(),
            detail: e.to_string(),
        })?;
        let aligned = resample_to(
            raster,
            &spec.transform(),
            spec.width(),
            spec.height(),
            Resampling::Nearest,
        )
        .map_err(|e| ModelError::Covariate {
            layer: RasterLayer::name(self).to_string(),
            detail: e.to_string(),
        })?;
        Ok(Covariate {
            grid: aligned.band(1).map_err(|e| ModelError::Covariate {
                layer: RasterLayer::name(self).to_string(),
                detail: e.to_string(),
            })?.clone(),
            nodata: aligned.nodata(),
        })
    }
}

impl CovariateSource for VectorLayer {
    fn name(&self) -> &str {
        VectorLayer::name(self)
    }

    fn covariate_grid(&self, spec: &GridSpec) -> Result<Covariate, ModelError> {
        let opts = RasterizeOptions {
            pixel_size: Some(spec.pixel_size),
            extent: Some(spec.extent),
            ..Default::default()
        };
        let result = rasterize(self.features(), &opts).map_err(|e| ModelError::Covariate {
            layer: VectorLayer::name(self).to_string(),
            detail: e.to_string(),
        })?;
        let nodata = result.raster.nodata();
        let grid = result
            .raster
            .band(1)
            .map_err(|e| ModelError::Covariate {
                layer: VectorLayer::name(self).to_string(),
                detail: e.to_string(),
            })?
            .clone();
        Ok(Covariate { grid, nodata })
    }
}

/// A named in-memory raster, the simplest covariate source. Useful for
/// derived grids that never touch a file.
pub struct NamedRaster {
    name: String,
    raster: Raster,
}

impl NamedRaster {
    /// Wrap a raster under a column name.
    pub fn new(name: impl Into<String>, raster: Raster) -> Self {
        Self {
            name: name.into(),
            raster,
        }
    }
}

impl CovariateSource for NamedRaster {
    fn name(&self) -> &str {
        &self.name
    }

    fn covariate_grid(&self, spec: &GridSpec) -> Result<Covariate, ModelError> {
        let aligned = resample_to(
            &self.raster,
            &spec.transform(),
            spec.width(),
            spec.height(),
            Resampling::Nearest,
        )
        .map_err(|e| ModelError::Covariate {
            layer: self.name.clone(),
            detail: e.to_string(),
        })?;
        Ok(Covariate {
            grid: aligned.band(1).map_err(|e| ModelError::Covariate {
                layer: self.name.clone(),
                detail: e.to_string(),
            })?.clone(),
            nodata: aligned.nodata(),
        })
    }
}
