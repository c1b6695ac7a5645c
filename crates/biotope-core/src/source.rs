//! Provenance of environmental data.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known sources of global environmental data.
///
/// Layers record where their data came from; the value is informational
/// and never changes behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// WorldClim global climate grids.
    WorldClim,
    /// The GLOBE digital elevation model.
    Globe,
    /// The Nature Conservancy ecoregion data.
    Tnc,
    /// ArcGIS-distributed reference layers.
    ArcGis,
    /// World Wildlife ecoregion/realm layers.
    Wwl,
    /// Unspecified provenance.
    #[default]
    Unknown,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WorldClim => "WorldClim",
            Self::Globe => "GLOBE",
            Self::Tnc => "TNC",
            Self::ArcGis => "ArcGIS",
            Self::Wwl => "WWL",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
