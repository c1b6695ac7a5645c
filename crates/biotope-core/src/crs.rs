//! Coordinate reference system identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An EPSG coordinate reference system code.
///
/// Biotope does not carry full projection databases; layers record the
/// EPSG code of their data and the raster crate knows how to transform
/// between the two systems the toolkit actually uses, [`Crs::WGS84`]
/// geographic coordinates and [`Crs::WEB_MERCATOR`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs(pub u32);

impl Crs {
    /// Geographic latitude/longitude on the WGS84 datum, `EPSG:4326`.
    pub const WGS84: Crs = Crs(4326);

    /// Spherical web mercator, `EPSG:3857`.
    pub const WEB_MERCATOR: Crs = Crs(3857);

    /// The numeric EPSG code.
    pub fn code(&self) -> u32 {
        self.0
    }

    /// Whether this is a geographic (degree-unit) system.
    pub fn is_geographic(&self) -> bool {
        self.0 == 4326
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::WGS84
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl From<u32> for Crs {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        assert_eq!(Crs::WGS84.to_string(), "EPSG:4326");
        assert_eq!(Crs::from(3857), Crs::WEB_MERCATOR);
    }
}
