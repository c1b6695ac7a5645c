//! Error types for species ingestion.

use std::fmt;
use std::io;

/// Errors from occurrence tables, range maps, and the occurrence service.
#[derive(Debug)]
pub enum SpeciesError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// A CSV parse or write error.
    Csv(csv::Error),
    /// A required column is absent from the input table.
    MissingColumn {
        /// The missing column name.
        column: String,
    },
    /// The range map holds no usable geometry.
    EmptyRange,
    /// The species name did not match anything in the service's backbone.
    NoMatch {
        /// The name that was looked up.
        name: String,
    },
    /// Live fetching was requested but the crate was built without the
    /// `remote` feature.
    RemoteDisabled,
    /// The occurrence service answered with an error.
    Service {
        /// Status or transport detail.
        detail: String,
    },
    /// A service response could not be parsed.
    Parse {
        /// What failed to parse.
        detail: String,
    },
    /// Rejection sampling could not place the requested number of points.
    SamplingExhausted {
        /// How many points were requested.
        requested: usize,
        /// How many were placed before the attempt budget ran out.
        placed: usize,
    },
    /// A vector-layer error surfaced from range-map handling.
    Vector(biotope_vector::VectorError),
    /// A raster-level error surfaced from rasterization.
    Raster(biotope_raster::RasterError),
    /// A geometry error surfaced from hull/buffer construction.
    Geometry(biotope_geom::GeometryError),
}

impl fmt::Display for SpeciesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Csv(e) => write!(f, "CSV error: {e}"),
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::EmptyRange => write!(f, "range map holds no usable geometry"),
            Self::NoMatch { name } => write!(f, "no backbone match for species '{name}'"),
            Self::RemoteDisabled => {
                write!(f, "remote fetching not compiled; build with --features remote")
            }
            Self::Service { detail } => write!(f, "occurrence service error: {detail}"),
            Self::Parse { detail } => write!(f, "bad service response: {detail}"),
            Self::SamplingExhausted { requested, placed } => {
                write!(
                    f,
                    "could only place {placed} of {requested} pseudo-absence points"
                )
            }
            Self::Vector(e) => write!(f, "vector error: {e}"),
            Self::Raster(e) => write!(f, "raster error: {e}"),
            Self::Geometry(e) => write!(f, "geometry error: {e}"),
        }
    }
}

impl std::error::Error for SpeciesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Vector(e) => Some(e),
            Self::Raster(e) => Some(e),
            Self::Geometry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SpeciesError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for SpeciesError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<biotope_vector::VectorError> for SpeciesError {
    fn from(e: biotope_vector::VectorError) -> Self {
        Self::Vector(e)
    }
}

impl From<biotope_raster::RasterError> for SpeciesError {
    fn from(e: biotope_raster::RasterError) -> Self {
        Self::Raster(e)
    }
}

impl From<biotope_geom::GeometryError> for SpeciesError {
    fn from(e: biotope_geom::GeometryError) -> Self {
        Self::Geometry(e)
    }
}
