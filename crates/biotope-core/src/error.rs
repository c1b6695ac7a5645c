//! Error types for grid construction and access.

use std::fmt;

/// Errors arising from grid construction or cell access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Two grids that must share a shape do not.
    ShapeMismatch {
        /// The shape the operation expected, as `(height, width)`.
        expected: (usize, usize),
        /// The shape it was given.
        got: (usize, usize),
    },
    /// A cell index is outside the grid.
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Grid height in rows.
        height: usize,
        /// Grid width in columns.
        width: usize,
    },
    /// Attempted to construct a grid with a zero dimension, or with a
    /// cell buffer whose length does not match `width * height`.
    BadDimensions {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { expected, got } => {
                write!(
                    f,
                    "grid shape mismatch: expected {}x{}, got {}x{}",
                    expected.0, expected.1, got.0, got.1
                )
            }
            Self::OutOfBounds {
                row,
                col,
                height,
                width,
            } => {
                write!(
                    f,
                    "cell ({row}, {col}) out of bounds for a {height}x{width} grid"
                )
            }
            Self::BadDimensions { reason } => write!(f, "bad grid dimensions: {reason}"),
        }
    }
}

impl std::error::Error for GridError {}
