//! Core types for the Biotope species-distribution-modeling toolkit.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! fundamental abstractions shared by every other Biotope crate: the
//! row-major [`Grid`] payload, the [`GeoTransform`] affine mapping between
//! pixel and world coordinates, geographic [`Bounds`], the [`Crs`]
//! reference-system code, and the [`Source`] provenance enum.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bounds;
pub mod coords;
pub mod crs;
pub mod error;
pub mod grid;
pub mod source;
pub mod transform;

pub use bounds::Bounds;
pub use coords::world_coordinates;
pub use crs::Crs;
pub use error::GridError;
pub use grid::Grid;
pub use source::Source;
pub use transform::GeoTransform;
