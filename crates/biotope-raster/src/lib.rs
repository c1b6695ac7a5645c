//! Raster environmental layers for Biotope.
//!
//! A [`Raster`] is one or more [`Grid`](biotope_core::Grid) bands plus
//! georeferencing; a [`RasterLayer`] wraps a raster with its file source
//! and lifecycle. GeoTIFF files within the profile described in
//! [`geotiff`] are read and written without any native GIS dependency.
//!
//! Operations: [`reproject`](reproject::reproject) with five resampling
//! kernels, [`polygonize`](polygonize::polygonize) into vector shapes,
//! bulk pixel-to-world conversion, deterministic
//! [`sample_pseudo_absences`](sample::sample_pseudo_absences), and PNG
//! previews.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod geotiff;
pub mod layer;
pub mod polygonize;
pub mod project;
pub mod raster;
pub mod render;
pub mod reproject;
pub mod sample;

pub use error::RasterError;
pub use geotiff::{read_geotiff, write_geotiff, SampleKind};
pub use layer::RasterLayer;
pub use polygonize::polygonize;
pub use raster::Raster;
pub use reproject::{reproject, resample_to, ReprojectOptions, Resampling};
pub use sample::{sample_pseudo_absences, PseudoAbsenceOptions, PseudoAbsenceSample};
