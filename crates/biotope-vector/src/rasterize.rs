//! Burning vector geometries into raster grids.

use biotope_core::{Bounds, Crs, GeoTransform, Grid};
use biotope_geom::MultiPolygon;
use biotope_raster::Raster;
use indexmap::IndexMap;
use log::{info, warn};

use crate::error::VectorError;
use crate::feature::Feature;

/// Options for [`rasterize`].
#[derive(Clone, Debug)]
pub struct RasterizeOptions {
    /// Cell size in CRS units. Required: rasterizing without a
    /// resolution is meaningless.
    pub pixel_size: Option<f64>,
    /// Burn every cell touched by a geometry's boundary, not only cells
    /// whose center falls inside.
    pub all_touched: bool,
    /// Value of unburned cells, and the raster's nodata sentinel.
    pub nodata_value: f32,
    /// Value of burned cells.
    pub burn_value: f32,
    /// Clip the grid to the envelope of the data instead of the global
    /// geographic extent.
    pub cropped: bool,
    /// Burn onto this exact extent, overriding `cropped`. Covariate
    /// alignment uses this to match a model's grid.
    pub extent: Option<Bounds>,
    /// Attribute column whose distinct values each get their own band.
    pub classifier: Option<String>,
    /// Reference system recorded on the result.
    pub crs: Crs,
}

impl Default for RasterizeOptions {
    fn default() -> Self {
        Self {
            pixel_size: None,
            all_touched: false,
            nodata_value: 0.0,
            burn_value: 1.0,
            cropped: false,
            extent: None,
            classifier: None,
            crs: Crs::WGS84,
        }
    }
}

/// The outcome of a rasterization.
#[derive(Clone, Debug)]
pub struct RasterizeResult {
    /// The burned grid; one band, or one per classifier category.
    pub raster: Raster,
    /// Features skipped for missing geometry or classifier value.
    pub skipped: usize,
    /// Category names in band order; empty without a classifier.
    pub categories: Vec<String>,
}

/// Burn features into a grid.
///
/// Without a classifier every geometry lands on a single band. With a
/// classifier column, each distinct value gets a band, in order of first
/// appearance. Features with empty geometry or a missing/blank
/// classifier value are skipped with a warning and counted in
/// [`RasterizeResult::skipped`]; the operation itself keeps going.
///
/// # Errors
///
/// - [`VectorError::MissingPixelSize`] when no pixel size is given.
/// - [`VectorError::NoFeatures`] when nothing is burnable.
/// - [`VectorError::UnknownClassifier`] when a classifier is named but
///   no feature carries the column.
pub fn rasterize(features: &[Feature], opts: &RasterizeOptions) -> Result<RasterizeResult, VectorError> {
    let pixel_size = opts.pixel_size.ok_or(VectorError::MissingPixelSize)?;
    if !pixel_size.is_finite() || pixel_size <= 0.0 {
        return Err(VectorError::MissingPixelSize);
    }
    if features.is_empty() {
        return Err(VectorError::NoFeatures);
    }

    let extent = if let Some(extent) = opts.extent {
        extent
    } else if opts.cropped {
        let mut boxes = features.iter().filter_map(|f| f.geometry.bounding_box());
        let first = boxes.next().ok_or(VectorError::NoFeatures)?;
        boxes.fold(first, |acc, b| acc.union(&b))
    } else {
        Bounds::GLOBAL
    };
    let width = ((extent.width() / pixel_size) as usize).max(1);
    let height = ((extent.height() / pixel_size) as usize).max(1);
    let transform = GeoTransform {
        origin_x: extent.left,
        origin_y: extent.top,
        pixel_width: pixel_size,
        pixel_height: -pixel_size,
    };
    info!(
        "rasterizing {} features onto a {height}x{width} grid (pixel_size={pixel_size}, all_touched={}, cropped={})",
        features.len(),
        opts.all_touched,
        opts.cropped
    );

    let mut skipped = 0usize;

    let (bands, categories) = match &opts.classifier {
        None => {
            let mut grid = Grid::filled(width, height, opts.nodata_value)
                .map_err(biotope_raster::RasterError::Grid)?;
            for (i, feature) in features.iter().enumerate() {
                if feature.geometry.is_empty() {
                    warn!("feature {i} has no geometry; skipping");
                    skipped += 1;
                    continue;
                }
                burn(&mut grid, &transform, &feature.geometry, opts);
            }
            (vec![grid], Vec::new())
        }
        Some(column) => {
            if !features.iter().any(|f| f.attributes.contains_key(column)) {
                return Err(VectorError::UnknownClassifier {
                    column: column.clone(),
                });
            }
            // One band per distinct value, first-appearance order.
            let mut stacks: IndexMap<String, Grid> = IndexMap::new();
            for (i, feature) in features.iter().enumerate() {
                let category = feature
                    .attribute(column)
                    .map(|v| v.as_text())
                    .unwrap_or_default();
                if category.is_empty() {
                    warn!("feature {i} has no '{column}' value; skipping");
                    skipped += 1;
                    continue;
                }
                if feature.geometry.is_empty() {
                    warn!("feature {i} has no geometry; skipping");
                    skipped += 1;
                    continue;
                }
                let grid = match stacks.entry(category) {
                    indexmap::map::Entry::Occupied(e) => e.into_mut(),
                    indexmap::map::Entry::Vacant(e) => e.insert(
                        Grid::filled(width, height, opts.nodata_value)
                            .map_err(biotope_raster::RasterError::Grid)?,
                    ),
                };
                burn(grid, &transform, &feature.geometry, opts);
            }
            if stacks.is_empty() {
                return Err(VectorError::NoFeatures);
            }
            let categories: Vec<String> = stacks.keys().cloned().collect();
            info!("rasterized {} classifier categories", categories.len());
            (stacks.into_values().collect(), categories)
        }
    };

    let raster = Raster::new(bands, transform, opts.crs, Some(opts.nodata_value))?;
    Ok(RasterizeResult {
        raster,
        skipped,
        categories,
    })
}

/// Burn one geometry into a grid.
fn burn(grid: &mut Grid, transform: &GeoTransform, geometry: &MultiPolygon, opts: &RasterizeOptions) {
    let (height, width) = grid.shape();
    for polygon in geometry.polygons() {
        let bb = polygon.bounding_box();
        // Pixel range covering the polygon's bounding box, clamped.
        let col_lo = ((bb.left - transform.origin_x) / transform.pixel_width).floor().max(0.0) as usize;
        let col_hi = (((bb.right - transform.origin_x) / transform.pixel_width).ceil() as usize).min(width);
        let row_lo = ((bb.top - transform.origin_y) / transform.pixel_height).floor().max(0.0) as usize;
        let row_hi = (((bb.bottom - transform.origin_y) / transform.pixel_height).ceil() as usize).min(height);

        for row in row_lo..row_hi {
            for col in col_lo..col_hi {
                let (x, y) = transform.cell_center(row, col);
                if polygon.contains(&biotope_geom::Point::new(x, y)) {
                    grid.set(row, col, opts.burn_value).expect("in bounds");
                }
            }
        }

        if opts.all_touched {
            // Walk every ring at half-pixel steps, burning the cells the
            // boundary passes through.
            let step = transform.pixel_width.min(-transform.pixel_height) / 2.0;
            let rings = std::iter::once(polygon.exterior()).chain(polygon.holes().iter());
            for ring in rings {
                let pts = ring.points();
                let n = pts.len();
                for i in 0..n {
                    let a = pts[i];
                    let b = pts[(i + 1) % n];
                    let length = a.distance(&b);
                    let steps = (length / step).ceil().max(1.0) as usize;
                    for s in 0..=steps {
                        let t = s as f64 / steps as f64;
                        let x = a.x + t * (b.x - a.x);
                        let y = a.y + t * (b.y - a.y);
                        if let Some((row, col)) = transform.world_to_pixel(x, y, width, height) {
                            grid.set(row, col, opts.burn_value).expect("in bounds");
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biotope_geom::{Point, Polygon, Ring};
    use indexmap::IndexMap;

    fn square_feature(x0: f64, y0: f64, side: f64) -> Feature {
        Feature::new(MultiPolygon::new(vec![Polygon::new(
            Ring::new(vec![
                Point::new(x0, y0),
                Point::new(x0 + side, y0),
                Point::new(x0 + side, y0 + side),
                Point::new(x0, y0 + side),
            ])
            .unwrap(),
            Vec::new(),
        )]))
    }

    fn with_attr(mut feature: Feature, key: &str, value: &str) -> Feature {
        let mut attrs = IndexMap::new();
        attrs.insert(key.to_string(), crate::feature::AttrValue::Text(value.to_string()));
        feature.attributes = attrs;
        feature
    }

    #[test]
    fn requires_a_pixel_size() {
        let features = vec![square_feature(0.0, 0.0, 10.0)];
        assert!(matches!(
            rasterize(&features, &RasterizeOptions::default()),
            Err(VectorError::MissingPixelSize)
        ));
    }

    #[test]
    fn burns_a_square_on_the_global_grid() {
        let features = vec![square_feature(0.0, 0.0, 10.0)];
        let opts = RasterizeOptions {
            pixel_size: Some(1.0),
            ..Default::default()
        };
        let out = rasterize(&features, &opts).unwrap();
        assert_eq!(out.raster.shape(), (180, 360));
        assert_eq!(out.skipped, 0);
        let burned = out.raster.band(1).unwrap().count_nonzero();
        assert_eq!(burned, 100);
        assert!(out.raster.band(1).unwrap().is_binary());
    }

    #[test]
    fn cropped_extent_hugs_the_data() {
        let features = vec![square_feature(10.0, 20.0, 4.0)];
        let opts = RasterizeOptions {
            pixel_size: Some(0.5),
            cropped: true,
            ..Default::default()
        };
        let out = rasterize(&features, &opts).unwrap();
        assert_eq!(out.raster.shape(), (8, 8));
        assert_eq!(out.raster.band(1).unwrap().count_nonzero(), 64);
        let b = out.raster.bounds();
        assert_eq!((b.left, b.bottom, b.right, b.top), (10.0, 20.0, 14.0, 24.0));
    }

    #[test]
    fn all_touched_widens_a_small_shape() {
        // A sliver far smaller than a cell: center-in misses it entirely.
        let features = vec![square_feature(5.1, 5.1, 0.05)];
        let base = RasterizeOptions {
            pixel_size: Some(1.0),
            ..Default::default()
        };
        let missed = rasterize(&features, &base).unwrap();
        assert_eq!(missed.raster.band(1).unwrap().count_nonzero(), 0);

        let touched = rasterize(
            &features,
            &RasterizeOptions {
                all_touched: true,
                ..base
            },
        )
        .unwrap();
        assert!(touched.raster.band(1).unwrap().count_nonzero() >= 1);
    }

    #[test]
    fn classifier_stacks_one_band_per_category() {
        let features = vec![
            with_attr(square_feature(0.0, 0.0, 5.0), "realm", "Palearctic"),
            with_attr(square_feature(20.0, 0.0, 5.0), "realm", "Nearctic"),
            with_attr(square_feature(-20.0, 0.0, 5.0), "realm", "Palearctic"),
        ];
        let opts = RasterizeOptions {
            pixel_size: Some(1.0),
            classifier: Some("realm".to_string()),
            ..Default::default()
        };
        let out = rasterize(&features, &opts).unwrap();
        assert_eq!(out.categories, vec!["Palearctic", "Nearctic"]);
        assert_eq!(out.raster.band_count(), 2);
        assert_eq!(out.raster.band(1).unwrap().count_nonzero(), 50);
        assert_eq!(out.raster.band(2).unwrap().count_nonzero(), 25);
    }

    #[test]
    fn features_without_category_are_skipped_not_fatal() {
        let features = vec![
            with_attr(square_feature(0.0, 0.0, 5.0), "realm", "Palearctic"),
            square_feature(20.0, 0.0, 5.0),
        ];
        let opts = RasterizeOptions {
            pixel_size: Some(1.0),
            classifier: Some("realm".to_string()),
            ..Default::default()
        };
        let out = rasterize(&features, &opts).unwrap();
        assert_eq!(out.skipped, 1);
        assert_eq!(out.raster.band_count(), 1);
    }

    #[test]
    fn unknown_classifier_is_an_error() {
        let features = vec![square_feature(0.0, 0.0, 5.0)];
        let opts = RasterizeOptions {
            pixel_size: Some(1.0),
            classifier: Some("realm".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            rasterize(&features, &opts),
            Err(VectorError::UnknownClassifier { .. })
        ));
    }
}
