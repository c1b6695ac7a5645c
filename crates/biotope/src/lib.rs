//! Biotope: a species-distribution-modeling toolkit.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Biotope sub-crates. For most users, adding `biotope` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use biotope::prelude::*;
//!
//! // A small environmental raster: one region band covering the world.
//! let env = Grid::filled(36, 18, 1.0).unwrap();
//! let env = Raster::single(env, GeoTransform::global(10.0), Crs::WGS84, Some(0.0)).unwrap();
//! let layer = RasterLayer::from_raster("biomes", env);
//!
//! // A presence grid with two occupied cells.
//! let mut presence = Grid::new(36, 18).unwrap();
//! presence.set(4, 7, 1.0).unwrap();
//! presence.set(5, 7, 1.0).unwrap();
//!
//! // Sample pseudo-absences outside the presences, deterministically.
//! let sample = layer
//!     .sample_pseudo_absences(
//!         &presence,
//!         &PseudoAbsenceOptions { count: 20, seed: 42, ..Default::default() },
//!     )
//!     .unwrap();
//! assert_eq!(sample.sampled.count_nonzero(), 20);
//!
//! // Join labels and covariates into a model and evaluate it.
//! let mut model = Model::new(ModelConfig { pixel_size: 10.0, ..Default::default() });
//! model.add_environmental_layer(Box::new(NamedRaster::new(
//!     "biomes",
//!     layer.raster().unwrap().clone(),
//! )));
//! model.set_species(presence, sample.sampled).unwrap();
//! assert_eq!(model.base_table().unwrap().n_covariates(), 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`core`] | `biotope-core` | Grids, transforms, bounds, CRS, provenance |
//! | [`geom`] | `biotope-geom` | Geometry primitives and base algorithms |
//! | [`raster`] | `biotope-raster` | GeoTIFF layers, reprojection, sampling |
//! | [`vector`] | `biotope-vector` | Shapefile layers and rasterization |
//! | [`species`] | `biotope-species` | Occurrence tables, GBIF, IUCN ranges |
//! | [`model`] | `biotope-model` | Base table, fitting, evaluation |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Grid, transform, and provenance types (`biotope-core`).
pub use biotope_core as core;

/// Geometry primitives and base algorithms (`biotope-geom`).
pub use biotope_geom as geom;

/// Raster environmental layers (`biotope-raster`).
///
/// GeoTIFF I/O, reprojection with five resampling kernels,
/// polygonization, and deterministic pseudo-absence sampling.
pub use biotope_raster as raster;

/// Vector environmental layers (`biotope-vector`).
///
/// Shapefile I/O and rasterization, including classifier-column band
/// stacks.
pub use biotope_vector as vector;

/// Species occurrence and range-map ingestion (`biotope-species`).
///
/// [`species::GbifSpecies`] for occurrence records,
/// [`species::IucnSpecies`] for expert range maps. Live fetching sits
/// behind the `remote` cargo feature.
pub use biotope_species as species;

/// Presence/absence model fitting and evaluation (`biotope-model`).
pub use biotope_model as model;

/// Common imports for typical Biotope usage.
///
/// ```rust
/// use biotope::prelude::*;
/// ```
pub mod prelude {
    // Core data model
    pub use biotope_core::{Bounds, Crs, GeoTransform, Grid, Source};

    // Geometry
    pub use biotope_geom::{MultiPolygon, Point, Polygon, Ring};

    // Errors
    pub use biotope_core::GridError;
    pub use biotope_geom::GeometryError;
    pub use biotope_model::ModelError;
    pub use biotope_raster::RasterError;
    pub use biotope_species::SpeciesError;
    pub use biotope_vector::VectorError;

    // Raster layers
    pub use biotope_raster::{
        PseudoAbsenceOptions, Raster, RasterLayer, ReprojectOptions, Resampling, SampleKind,
    };

    // Vector layers
    pub use biotope_vector::{Feature, RasterizeOptions, VectorLayer};

    // Species
    pub use biotope_species::{
        CsvOptions, GbifSpecies, IucnSpecies, Occurrence, OccurrenceTable,
        PseudoAbsencePointOptions,
    };

    // Model
    pub use biotope_model::{
        Algorithm, BaseTable, CovariateSource, Model, ModelConfig, TrainedModel,
    };
    pub use biotope_model::covariate::NamedRaster;
}
