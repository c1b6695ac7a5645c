//! The model: layers + species labels -> base table -> fit.

use biotope_core::{Bounds, Grid};
use indexmap::IndexMap;
use log::{info, warn};

use crate::algorithm::{fit, Algorithm, TrainedModel};
use crate::covariate::{CovariateSource, GridSpec};
use crate::crossval::{cross_validate, CrossValidation};
use crate::error::ModelError;
use crate::table::BaseTable;

/// Model configuration.
#[derive(Clone, Copy, Debug)]
pub struct ModelConfig {
    /// Extent of the model grid.
    pub extent: Bounds,
    /// Square cell size in degrees.
    pub pixel_size: f64,
    /// Drop rows holding nodata covariates when building the base table.
    pub discard_nodata_values: bool,
    /// Tolerated fraction of nodata covariates per row before it is
    /// dropped. 0.0 drops on any nodata.
    pub discard_threshold: f64,
    /// Seed for every stochastic step (cross-validation shuffling).
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            extent: Bounds::GLOBAL,
            pixel_size: 0.5,
            discard_nodata_values: true,
            discard_threshold: 0.0,
            seed: 0,
        }
    }
}

/// A presence/absence distribution model under assembly.
///
/// Layers and species grids are attached incrementally; the base table
/// is built lazily and rebuilt whenever an input changes.
pub struct Model {
    config: ModelConfig,
    layers: Vec<Box<dyn CovariateSource>>,
    presence: Option<Grid>,
    absence: Option<Grid>,
    base: Option<BaseTable>,
}

impl Model {
    /// A model with no layers or species data yet.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            layers: Vec::new(),
            presence: None,
            absence: None,
            base: None,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The grid every input is aligned onto.
    pub fn grid_spec(&self) -> GridSpec {
        GridSpec {
            extent: self.config.extent,
            pixel_size: self.config.pixel_size,
        }
    }

    /// Number of attached layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Attach a covariate source. Invalidates the cached base table.
    pub fn add_environmental_layer(&mut self, layer: Box<dyn CovariateSource>) {
        info!("attached environmental layer '{}'", layer.name());
        self.layers.push(layer);
        self.base = None;
    }

    /// Set the species label grids: cells of `presence` valued 1 become
    /// presence rows, nonzero cells of `absence` become pseudo-absence
    /// rows. Both must match the model grid shape.
    pub fn set_species(&mut self, presence: Grid, absence: Grid) -> Result<(), ModelError> {
        let expected = self.grid_spec().shape();
        for grid in [&presence, &absence] {
            if grid.shape() != expected {
                return Err(ModelError::ShapeMismatch {
                    expected,
                    got: grid.shape(),
                });
            }
        }
        self.presence = Some(presence);
        self.absence = Some(absence);
        self.base = None;
        Ok(())
    }

    /// Build (or return the cached) base table.
    ///
    /// One row per labeled cell: presences first, then pseudo-absences,
    /// each row carrying the cell-center coordinate and one value per
    /// layer. The discard policy drops rows whose nodata-covariate
    /// fraction exceeds the configured threshold.
    pub fn base_table(&mut self) -> Result<&BaseTable, ModelError> {
        if self.base.is_none() {
            self.base = Some(self.build_base_table()?);
        }
        Ok(self.base.as_ref().expect("just built"))
    }

    fn build_base_table(&self) -> Result<BaseTable, ModelError> {
        let presence = self.presence.as_ref().ok_or(ModelError::NoSpecies)?;
        let absence = self.absence.as_ref().ok_or(ModelError::NoSpecies)?;
        let spec = self.grid_spec();
        let transform = spec.transform();

        // Align every layer onto the model grid once.
        let mut covariates = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let cov = layer.covariate_grid(&spec)?;
            if cov.grid.shape() != spec.shape() {
                return Err(ModelError::ShapeMismatch {
                    expected: spec.shape(),
                    got: cov.grid.shape(),
                });
            }
            covariates.push((layer.name().to_string(), cov));
        }

        let mut coords = Vec::new();
        let mut labels = Vec::new();
        let mut columns: IndexMap<String, Vec<f64>> = covariates
            .iter()
            .map(|(name, _)| (name.clone(), Vec::new()))
            .collect();
        let mut discarded = 0usize;

        let mut push_row = |row: usize, col: usize, label: f64| {
            let values: Vec<f64> = covariates
                .iter()
                .map(|(_, cov)| {
                    let v = cov.grid.get(row, col).expect("aligned shapes");
                    if v.is_nan() || Some(v) == cov.nodata {
                        f64::NAN
                    } else {
                        f64::from(v)
                    }
                })
                .collect();
            if self.config.discard_nodata_values && !values.is_empty() {
                let bad = values.iter().filter(|v| v.is_nan()).count();
                if bad as f64 / values.len() as f64 > self.config.discard_threshold {
                    discarded += 1;
                    return;
                }
            }
            let (x, y) = transform.cell_center(row, col);
            coords.push((y, x));
            labels.push(label);
            for (column, value) in columns.values_mut().zip(values) {
                column.push(value);
            }
        };

        for (row, col, v) in presence.iter() {
            if v == 1.0 {
                push_row(row, col, 1.0);
            }
        }
        for (row, col, v) in absence.iter() {
            if v != 0.0 && !v.is_nan() {
                push_row(row, col, 0.0);
            }
        }

        if discarded > 0 {
            warn!("discarded {discarded} rows holding nodata covariates");
        }
        if labels.is_empty() {
            return Err(ModelError::EmptyTable);
        }
        info!(
            "base table built: {} rows, {} covariate column(s)",
            labels.len(),
            columns.len()
        );
        Ok(BaseTable::new(coords, labels, columns))
    }

    /// Build the base table and fit an algorithm on it.
    pub fn fit(&mut self, algorithm: Algorithm) -> Result<TrainedModel, ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::NoLayers);
        }
        let table = self.base_table()?;
        fit(table, algorithm)
    }

    /// Fit and evaluate on the full base table (resubstitution).
    pub fn evaluate_performance(
        &mut self,
        algorithm: Algorithm,
    ) -> Result<crate::evaluate::Evaluation, ModelError> {
        let trained = self.fit(algorithm)?;
        let table = self.base_table()?;
        trained.evaluate(table)
    }

    /// Cross-validate an algorithm with `k` seeded folds.
    pub fn cross_validate(
        &mut self,
        algorithm: Algorithm,
        k: usize,
    ) -> Result<CrossValidation, ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::NoLayers);
        }
        let seed = self.config.seed;
        let table = self.base_table()?;
        cross_validate(table, algorithm, k, seed)
    }
}
