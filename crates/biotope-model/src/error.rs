//! Error types for model assembly, fitting, and evaluation.

use std::fmt;
use std::io;

/// Errors from base-table assembly and model fitting.
#[derive(Debug)]
pub enum ModelError {
    /// Species presence/absence grids have not been set.
    NoSpecies,
    /// Fitting needs at least one environmental layer.
    NoLayers,
    /// Every row was discarded (or none was produced) while building
    /// the base table.
    EmptyTable,
    /// A covariate source could not produce an aligned grid.
    Covariate {
        /// The layer that failed.
        layer: String,
        /// What went wrong.
        detail: String,
    },
    /// A grid does not match the model's configured shape.
    ShapeMismatch {
        /// Expected shape `(height, width)`.
        expected: (usize, usize),
        /// Actual shape.
        got: (usize, usize),
    },
    /// Evaluation needs both classes present.
    DegenerateLabels,
    /// Cross-validation fold count is out of range.
    BadFold {
        /// Requested fold count.
        k: usize,
        /// Number of rows available.
        rows: usize,
    },
    /// An I/O error while persisting artifacts.
    Io(io::Error),
    /// A serialization error while persisting artifacts.
    Serde(serde_json::Error),
    /// A CSV error while exporting the base table.
    Csv(csv::Error),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSpecies => write!(f, "species presence/absence grids not set"),
            Self::NoLayers => write!(f, "no environmental layers attached"),
            Self::EmptyTable => write!(f, "base table is empty after discards"),
            Self::Covariate { layer, detail } => {
                write!(f, "covariate layer '{layer}' failed: {detail}")
            }
            Self::ShapeMismatch { expected, got } => {
                write!(
                    f,
                    "grid shape mismatch: expected {}x{}, got {}x{}",
                    expected.0, expected.1, got.0, got.1
                )
            }
            Self::DegenerateLabels => {
                write!(f, "evaluation needs both presence and absence rows")
            }
            Self::BadFold { k, rows } => {
                write!(f, "cannot split {rows} rows into {k} folds")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Serde(e) => write!(f, "serialization error: {e}"),
            Self::Csv(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Serde(e) => Some(e),
            Self::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ModelError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e)
    }
}

impl From<csv::Error> for ModelError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}
