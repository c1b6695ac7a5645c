//! Geometric primitives and base algorithms for Biotope.
//!
//! Vector environmental layers and species range maps are built from the
//! types here: [`Point`], [`Ring`], [`Polygon`], and [`MultiPolygon`].
//! The algorithms are the small set the toolkit actually needs
//! (even-odd containment, shoelace areas, a monotone-chain
//! [`convex_hull`], Douglas-Peucker [`simplify_ring`], and outward
//! [`buffer_convex`] offsetting), implemented directly rather than
//! pulled from a GIS binding.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod error;
pub mod hull;
pub mod point;
pub mod polygon;
pub mod simplify;

pub use buffer::buffer_convex;
pub use error::GeometryError;
pub use hull::convex_hull;
pub use point::Point;
pub use polygon::{MultiPolygon, Polygon, Ring};
pub use simplify::simplify_ring;
