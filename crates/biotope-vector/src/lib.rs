//! Vector environmental layers for Biotope.
//!
//! A [`VectorLayer`] holds polygon [`Feature`]s read from an ESRI
//! shapefile (`.shp` + `.dbf`, written back with `.shx`). The central
//! operation is [`rasterize`](rasterize::rasterize): burning geometries
//! into a [`Raster`](biotope_raster::Raster) grid, either all on one band
//! or stacked one band per classifier-column category.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dbf;
pub mod error;
pub mod feature;
pub mod layer;
pub mod rasterize;
pub mod shapefile;

pub use error::VectorError;
pub use feature::{AttrValue, Feature};
pub use layer::VectorLayer;
pub use rasterize::{rasterize, RasterizeOptions, RasterizeResult};
