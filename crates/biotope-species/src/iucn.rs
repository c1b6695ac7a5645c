//! Expert range maps in the IUCN shapefile layout.

use std::path::Path;

use biotope_core::Bounds;
use biotope_geom::{buffer_convex, convex_hull, simplify_ring, MultiPolygon, Point};
use biotope_raster::Raster;
use biotope_vector::{AttrValue, Feature, RasterizeOptions, VectorLayer};
use log::{info, warn};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::SpeciesError;

/// Options for [`IucnSpecies::random_pseudo_absence_points`].
#[derive(Clone, Copy, Debug)]
pub struct PseudoAbsencePointOptions {
    /// Number of points to place.
    pub count: usize,
    /// How far outside the range hull a point must lie, in degrees.
    pub buffer_distance: f64,
    /// Douglas-Peucker tolerance applied to the range rings before hull
    /// construction, bounding geometry complexity.
    pub simplify_tolerance: f64,
    /// Extent the points are drawn from.
    pub extent: Bounds,
    /// RNG seed; identical seeds reproduce identical points.
    pub seed: u64,
}

impl Default for PseudoAbsencePointOptions {
    fn default() -> Self {
        Self {
            count: 1000,
            buffer_distance: 2.0,
            simplify_tolerance: 0.1,
            extent: Bounds::GLOBAL,
            seed: 0,
        }
    }
}

/// A species described by an expert range map.
///
/// The attribute layout follows the IUCN distribution shapefiles: a
/// `binomial` column naming the species and `presence`/`legend` columns
/// describing the status of each range part.
#[derive(Clone, Debug, Default)]
pub struct IucnSpecies {
    name: String,
    features: Vec<Feature>,
}

impl IucnSpecies {
    /// A species with no range data yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
        }
    }

    /// The species' name (a binomial, or a collection label such as
    /// `"All"` while the full file is loaded).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the species.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Load range features from an IUCN distribution shapefile.
    pub fn load_shapefile(&mut self, path: &Path) -> Result<(), SpeciesError> {
        let layer = VectorLayer::open(self.name.clone(), path)?;
        self.features = layer.features().to_vec();
        info!(
            "loaded {} range features for '{}'",
            self.features.len(),
            self.name
        );
        Ok(())
    }

    /// Save the range features as a shapefile.
    pub fn save_shapefile(&self, path: &Path) -> Result<(), SpeciesError> {
        let mut layer = VectorLayer::new(self.name.clone());
        layer.set_features(self.features.clone());
        layer.save(path)?;
        Ok(())
    }

    /// The range features.
    pub fn get_data(&self) -> &[Feature] {
        &self.features
    }

    /// Replace the range features. **Careful**, it overwrites the
    /// existing data.
    pub fn set_data(&mut self, features: Vec<Feature>) {
        self.features = features;
    }

    /// The distinct binomials present in the loaded features, in file
    /// order, the iteration list for batch processing.
    pub fn binomials(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for f in &self.features {
            if let Some(name) = f.attribute("binomial").map(AttrValue::as_text) {
                if !name.is_empty() && !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        out
    }

    /// Narrow the features to one binomial and take its name.
    pub fn select_binomial(&mut self, binomial: &str) {
        self.features.retain(|f| {
            f.attribute("binomial")
                .map(|v| v.as_text() == binomial)
                .unwrap_or(false)
        });
        self.name = binomial.to_string();
    }

    /// Drop range parts recorded as extinct: a `legend` mentioning
    /// extinction or an IUCN `presence` code of 4 (possibly extinct)
    /// or 5 (extinct). An empty result is legal and logged.
    pub fn drop_extinct_species(&mut self) -> usize {
        let before = self.features.len();
        self.features.retain(|f| {
            let legend_extinct = f
                .attribute("legend")
                .map(|v| v.as_text().to_lowercase().contains("extinct"))
                .unwrap_or(false);
            let presence_extinct = f
                .attribute("presence")
                .and_then(AttrValue::as_f64)
                .map(|code| code == 4.0 || code == 5.0)
                .unwrap_or(false);
            !(legend_extinct || presence_extinct)
        });
        let removed = before - self.features.len();
        if self.features.is_empty() {
            warn!("'{}' has no non-extinct range parts left", self.name);
        }
        info!("dropped {removed} extinct range parts for '{}'", self.name);
        removed
    }

    /// Every range part merged into one geometry.
    pub fn combined_range(&self) -> MultiPolygon {
        MultiPolygon::new(
            self.features
                .iter()
                .flat_map(|f| f.geometry.polygons().iter().cloned())
                .collect(),
        )
    }

    /// Burn the range map into a presence grid.
    pub fn rasterize(&self, opts: &RasterizeOptions) -> Result<Raster, SpeciesError> {
        let result = biotope_vector::rasterize(&self.features, opts)?;
        Ok(result.raster)
    }

    /// Draw random points outside the species' buffered range.
    ///
    /// The range rings are simplified (Douglas-Peucker), pooled into a
    /// convex hull, and the hull buffered outward by
    /// `buffer_distance`; points are then drawn uniformly from the
    /// extent, rejecting anything inside the buffered hull, until
    /// `count` points are placed.
    ///
    /// # Errors
    ///
    /// - [`SpeciesError::EmptyRange`] when no usable geometry is loaded.
    /// - [`SpeciesError::SamplingExhausted`] when the extent is so
    ///   covered by the buffered hull that the attempt budget runs out;
    ///   exactly `count` points are returned otherwise.
    pub fn random_pseudo_absence_points(
        &self,
        opts: &PseudoAbsencePointOptions,
    ) -> Result<Vec<Point>, SpeciesError> {
        let range = self.combined_range();
        if range.is_empty() || range.area() == 0.0 {
            return Err(SpeciesError::EmptyRange);
        }

        // Bound ring complexity before the hull/buffer work.
        let mut pooled: Vec<Point> = Vec::new();
        for polygon in range.polygons() {
            let simplified = simplify_ring(polygon.exterior(), opts.simplify_tolerance)?;
            pooled.extend(simplified.points().iter().copied());
        }
        let hull = convex_hull(&pooled)?;
        let exclusion = buffer_convex(&hull, opts.buffer_distance, 4)?;
        info!(
            "pseudo-absence exclusion hull for '{}' covers {:.1} square degrees",
            self.name,
            exclusion.area()
        );

        let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);
        let mut points = Vec::with_capacity(opts.count);
        let budget = opts.count.saturating_mul(200).max(10_000);
        let mut attempts = 0usize;
        while points.len() < opts.count && attempts < budget {
            attempts += 1;
            let x = rng.gen_range(opts.extent.left..opts.extent.right);
            let y = rng.gen_range(opts.extent.bottom..opts.extent.top);
            let p = Point::new(x, y);
            if !exclusion.contains(&p) {
                points.push(p);
            }
        }
        if points.len() < opts.count {
            return Err(SpeciesError::SamplingExhausted {
                requested: opts.count,
                placed: points.len(),
            });
        }
        info!(
            "placed {} pseudo-absence points for '{}' in {attempts} attempts",
            points.len(),
            self.name
        );
        Ok(points)
    }
}
