//! Error types for vector loading and rasterization.

use std::fmt;
use std::io;

/// Errors from shapefile I/O and vector operations.
#[derive(Debug)]
pub enum VectorError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// A file violates the shapefile or dBASE structure.
    InvalidFormat {
        /// What was malformed.
        detail: String,
    },
    /// The file is structurally valid but uses a shape or field type
    /// outside the supported profile.
    Unsupported {
        /// The offending construct.
        feature: String,
    },
    /// Rasterization was requested without a pixel size, on the layer or
    /// in the call.
    MissingPixelSize,
    /// The classifier column is absent from every feature.
    UnknownClassifier {
        /// The requested column name.
        column: String,
    },
    /// The layer holds no features to operate on.
    NoFeatures,
    /// A raster-level error surfaced while assembling the result grid.
    Raster(biotope_raster::RasterError),
}

impl fmt::Display for VectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidFormat { detail } => write!(f, "invalid vector format: {detail}"),
            Self::Unsupported { feature } => write!(f, "unsupported vector feature: {feature}"),
            Self::MissingPixelSize => {
                write!(f, "pixel size required before rasterizing; set one first")
            }
            Self::UnknownClassifier { column } => {
                write!(f, "classifier column '{column}' not present in the data")
            }
            Self::NoFeatures => write!(f, "layer holds no features"),
            Self::Raster(e) => write!(f, "raster error: {e}"),
        }
    }
}

impl std::error::Error for VectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Raster(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for VectorError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<biotope_raster::RasterError> for VectorError {
    fn from(e: biotope_raster::RasterError) -> Self {
        Self::Raster(e)
    }
}
