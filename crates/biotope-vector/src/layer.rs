//! The vector environmental layer: shapefile-backed features.

use std::path::{Path, PathBuf};

use biotope_core::{Bounds, Source};
use biotope_raster::{write_geotiff, SampleKind};
use indexmap::IndexMap;
use log::{info, warn};

use crate::dbf::{read_dbf, write_dbf};
use crate::error::VectorError;
use crate::feature::Feature;
use crate::rasterize::{rasterize, RasterizeOptions, RasterizeResult};
use crate::shapefile::{read_shp, write_polygons_shp, ShpGeometry};

/// A geometry-based environmental layer backed by an ESRI shapefile.
///
/// Attribute column names are lower-cased on load so the rest of the
/// toolkit can rely on one spelling. The pixel size and classifier
/// column configured on the layer are the defaults for
/// [`rasterize`](VectorLayer::rasterize).
#[derive(Clone, Debug, Default)]
pub struct VectorLayer {
    name: String,
    source: Source,
    path: Option<PathBuf>,
    features: Vec<Feature>,
    pixel_size: Option<f64>,
    classifier: Option<String>,
    raster_path: Option<PathBuf>,
}

impl VectorLayer {
    /// An empty layer with a display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Open a shapefile and load it immediately.
    pub fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, VectorError> {
        let mut layer = Self::new(name);
        layer.path = Some(path.into());
        layer.load()?;
        Ok(layer)
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

    /// Load (or reload) features from the backing `.shp` and its sibling
    /// `.dbf`.
    ///
    /// A missing attribute table is tolerated (features keep empty
    /// attribute maps); a table whose record count disagrees with the
    /// shape count is not.
    pub fn load(&mut self) -> Result<(), VectorError> {
        let path = self.path.clone().ok_or_else(|| VectorError::InvalidFormat {
            detail: "no shapefile path set".to_string(),
        })?;
        let shapes = read_shp(&path)?;

        let dbf_path = path.with_extension("dbf");
        let attributes: Vec<IndexMap<String, crate::feature::AttrValue>> = if dbf_path.exists() {
            let records = read_dbf(&dbf_path)?;
            if records.len() != shapes.len() {
                return Err(VectorError::InvalidFormat {
                    detail: format!(
                        "{} shapes but {} attribute records",
                        shapes.len(),
                        records.len()
                    ),
                });
            }
            records
        } else {
            warn!("no attribute table next to {}; continuing without", path.display());
            vec![IndexMap::new(); shapes.len()]
        };

        let mut features = Vec::with_capacity(shapes.len());
        for (shape, attrs) in shapes.into_iter().zip(attributes) {
            let geometry = match shape {
                ShpGeometry::Polygon(mp) => mp,
                ShpGeometry::Null => biotope_geom::MultiPolygon::new(Vec::new()),
                ShpGeometry::Point(_) => {
                    return Err(VectorError::Unsupported {
                        feature: "point shapefile as an environmental layer".to_string(),
                    })
                }
            };
            // Lower-case the column names, the toolkit-wide convention.
            let attributes = attrs
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect();
            features.push(Feature {
                geometry,
                attributes,
            });
        }
        info!(
            "loaded vector layer '{}' from {}: {} features",
            self.name,
            path.display(),
            features.len()
        );
        self.features = features;
        Ok(())
    }

    /// Save the features as `.shp`/`.shx`/`.dbf` at `path` (the `.shp`
    /// file name).
    pub fn save(&self, path: &Path) -> Result<(), VectorError> {
        let geometries: Vec<_> = self.features.iter().map(|f| f.geometry.clone()).collect();
        write_polygons_shp(path, &geometries)?;
        let records: Vec<_> = self.features.iter().map(|f| f.attributes.clone()).collect();
        write_dbf(&path.with_extension("dbf"), &records)?;
        info!("saved vector layer '{}' to {}", self.name, path.display());
        Ok(())
    }

    /// The loaded features.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Replace the features. **Careful**, it overwrites the existing data.
    pub fn set_features(&mut self, features: Vec<Feature>) {
        self.features = features;
    }

    /// Union extent of the feature geometries, `None` when empty.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut boxes = self.features.iter().filter_map(|f| f.geometry.bounding_box());
        let first = boxes.next()?;
        Some(boxes.fold(first, |acc, b| acc.union(&b)))
    }

    /// The configured rasterization cell size.
    pub fn pixel_size(&self) -> Option<f64> {
        self.pixel_size
    }

    /// Configure the rasterization cell size.
    pub fn set_pixel_size(&mut self, pixel_size: f64) {
        self.pixel_size = Some(pixel_size);
    }

    /// The configured classifier column.
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Configure the classifier column used for band stacking.
    pub fn set_classifier(&mut self, column: impl Into<String>) {
        self.classifier = Some(column.into());
    }

    /// Where the last rasterization was saved, if anywhere.
    pub fn raster_path(&self) -> Option<&Path> {
        self.raster_path.as_deref()
    }

    /// Record the companion raster file.
    pub fn set_raster_path(&mut self, path: impl Into<PathBuf>) {
        self.raster_path = Some(path.into());
    }

    /// Burn the layer's features into a grid.
    ///
    /// Options not set in `opts` fall back to the layer configuration:
    /// a `None` pixel size uses [`set_pixel_size`](Self::set_pixel_size),
    /// a `None` classifier uses [`set_classifier`](Self::set_classifier).
    pub fn rasterize(&self, opts: &RasterizeOptions) -> Result<RasterizeResult, VectorError> {
        let mut opts = opts.clone();
        if opts.pixel_size.is_none() {
            opts.pixel_size = self.pixel_size;
        }
        if opts.classifier.is_none() {
            opts.classifier = self.classifier.clone();
        }
        rasterize(&self.features, &opts)
    }

    /// Rasterize and save the result as a byte GeoTIFF, recording the
    /// file as this layer's companion raster.
    pub fn rasterize_to_file(
        &mut self,
        path: &Path,
        opts: &RasterizeOptions,
    ) -> Result<RasterizeResult, VectorError> {
        let result = self.rasterize(opts)?;
        write_geotiff(&result.raster, path, SampleKind::U8)?;
        self.set_raster_path(path);
        info!("rasterized '{}' into {}", self.name, path.display());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::AttrValue;
    use biotope_geom::{MultiPolygon, Point, Polygon, Ring};
    use indexmap::IndexMap;

    fn square_feature(x0: f64, y0: f64, side: f64, attrs: &[(&str, AttrValue)]) -> Feature {
        let ring = Ring::new(vec![
            Point::new(x0, y0),
            Point::new(x0 + side, y0),
            Point::new(x0 + side, y0 + side),
            Point::new(x0, y0 + side),
        ])
        .unwrap();
        Feature {
            geometry: MultiPolygon::new(vec![Polygon::new(ring, Vec::new())]),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<IndexMap<_, _>>(),
        }
    }

    #[test]
    fn shapefile_roundtrip_with_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eco.shp");

        let mut layer = VectorLayer::new("ecoregions");
        layer.set_features(vec![
            square_feature(0.0, 0.0, 5.0, &[("REALM", AttrValue::Text("PA".into()))]),
            square_feature(10.0, 10.0, 2.0, &[("REALM", AttrValue::Text("NA".into()))]),
        ]);
        layer.save(&path).unwrap();

        let loaded = VectorLayer::open("reloaded", &path).unwrap();
        assert_eq!(loaded.features().len(), 2);
        // Column names are lower-cased on load.
        assert_eq!(
            loaded.features()[0].attribute("realm"),
            Some(&AttrValue::Text("PA".to_string()))
        );
        let b = loaded.bounds().unwrap();
        assert_eq!((b.left, b.bottom, b.right, b.top), (0.0, 0.0, 12.0, 12.0));
    }

    #[test]
    fn layer_configuration_feeds_rasterize() {
        let mut layer = VectorLayer::new("eco");
        layer.set_features(vec![square_feature(0.0, 0.0, 10.0, &[])]);
        assert!(matches!(
            layer.rasterize(&RasterizeOptions::default()),
            Err(VectorError::MissingPixelSize)
        ));

        layer.set_pixel_size(1.0);
        let out = layer.rasterize(&RasterizeOptions::default()).unwrap();
        assert_eq!(out.raster.band(1).unwrap().count_nonzero(), 100);
    }

    #[test]
    fn rasterize_to_file_writes_and_records_the_tiff() {
        let dir = tempfile::tempdir().unwrap();
        let tif = dir.path().join("eco.tif");
        let mut layer = VectorLayer::new("eco");
        layer.set_features(vec![square_feature(0.0, 0.0, 10.0, &[])]);
        layer.set_pixel_size(1.0);

        layer
            .rasterize_to_file(
                &tif,
                &RasterizeOptions {
                    cropped: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(layer.raster_path(), Some(tif.as_path()));

        let back = biotope_raster::read_geotiff(&tif).unwrap();
        assert_eq!(back.shape(), (10, 10));
        assert_eq!(back.band(1).unwrap().count_nonzero(), 100);
    }
}
