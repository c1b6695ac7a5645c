//! Species data ingestion for Biotope.
//!
//! Two kinds of species data feed a distribution model:
//!
//! - **Occurrence records**: point observations, typically exported from
//!   or fetched live from the GBIF occurrence service. Held in an
//!   [`OccurrenceTable`] and wrapped by [`GbifSpecies`], which can
//!   geometrize, overlay against a range map, and rasterize to a
//!   presence grid.
//! - **Expert range maps**: polygon shapefiles in the IUCN layout,
//!   wrapped by [`IucnSpecies`] with extinct-record filtering and
//!   random pseudo-absence point generation outside the (buffered)
//!   range.
//!
//! Live fetching sits behind the `remote` cargo feature; parsing and
//! pagination logic is pure and fully testable offline.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod gbif;
pub mod iucn;
pub mod occurrence;
pub mod render;
pub mod table;

#[cfg(feature = "remote")]
pub mod client;

pub use error::SpeciesError;
pub use gbif::{parse_occurrence_page, GbifSpecies, OccurrencePage};
pub use iucn::{IucnSpecies, PseudoAbsencePointOptions};
pub use occurrence::Occurrence;
pub use render::render_points_png;
pub use table::{CsvOptions, OccurrenceTable};

#[cfg(feature = "remote")]
pub use client::GbifClient;
