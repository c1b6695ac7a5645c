//! Error types for geometry construction and algorithms.

use std::fmt;

/// Errors arising from geometry construction or the base algorithms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The input has too few distinct vertices or no area.
    Degenerate {
        /// What was wrong with the input.
        reason: String,
    },
    /// An operation restricted to convex input received a concave ring.
    NotConvex,
    /// A numeric parameter is outside its valid range.
    BadParameter {
        /// Description of the offending parameter.
        reason: String,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degenerate { reason } => write!(f, "degenerate geometry: {reason}"),
            Self::NotConvex => write!(f, "ring is not convex"),
            Self::BadParameter { reason } => write!(f, "bad parameter: {reason}"),
        }
    }
}

impl std::error::Error for GeometryError {}
