//! Error types for raster loading, transformation, and sampling.

use biotope_core::GridError;
use std::fmt;
use std::io;

/// Errors from raster I/O and raster operations.
#[derive(Debug)]
pub enum RasterError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The file is not a TIFF, or violates the TIFF structure.
    InvalidFormat {
        /// What was malformed.
        detail: String,
    },
    /// The file is valid TIFF but uses a construct outside the supported
    /// baseline profile (compression, tiling, exotic sample types).
    Unsupported {
        /// The offending construct.
        feature: String,
    },
    /// The raster carries no ModelPixelScale/ModelTiepoint georeferencing.
    MissingGeoreference,
    /// The layer's payload has not been loaded, or was closed.
    NotLoaded,
    /// A 1-based band index is outside the band count.
    BandOutOfRange {
        /// The requested band.
        band: usize,
        /// Number of bands present.
        count: usize,
    },
    /// Two grids that must be aligned have different shapes.
    ShapeMismatch {
        /// Expected shape `(height, width)`.
        expected: (usize, usize),
        /// Actual shape.
        got: (usize, usize),
    },
    /// A sampling input violates its contract (non-binary presence grid,
    /// non-binary habitat grid).
    BadSampleInput {
        /// What was wrong.
        reason: String,
    },
    /// No transform is available between the two reference systems.
    UnsupportedProjection {
        /// Source EPSG code.
        from: u32,
        /// Destination EPSG code.
        to: u32,
    },
    /// PNG rendering failed.
    Render {
        /// Encoder error detail.
        detail: String,
    },
    /// A grid-level error surfaced from biotope-core.
    Grid(GridError),
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidFormat { detail } => write!(f, "invalid raster format: {detail}"),
            Self::Unsupported { feature } => {
                write!(f, "unsupported raster feature: {feature}")
            }
            Self::MissingGeoreference => {
                write!(f, "raster has no georeferencing tags")
            }
            Self::NotLoaded => write!(f, "raster data not loaded; call load() first"),
            Self::BandOutOfRange { band, count } => {
                write!(f, "band {band} out of range (raster has {count})")
            }
            Self::ShapeMismatch { expected, got } => {
                write!(
                    f,
                    "grid shape mismatch: expected {}x{}, got {}x{}",
                    expected.0, expected.1, got.0, got.1
                )
            }
            Self::BadSampleInput { reason } => write!(f, "bad sampling input: {reason}"),
            Self::UnsupportedProjection { from, to } => {
                write!(f, "no transform from EPSG:{from} to EPSG:{to}")
            }
            Self::Render { detail } => write!(f, "render failed: {detail}"),
            Self::Grid(e) => write!(f, "grid error: {e}"),
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RasterError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<GridError> for RasterError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}
