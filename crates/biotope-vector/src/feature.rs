//! Features: geometry plus attributes.

use std::fmt;

use biotope_geom::MultiPolygon;
use indexmap::IndexMap;

/// A single attribute value from a dBASE table.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// A character field.
    Text(String),
    /// A numeric field. Empty numeric cells read as NaN.
    Number(f64),
}

impl AttrValue {
    /// The value as a float, parsing text when possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            Self::Number(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// The value as text, formatting numbers when needed.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(v) => format!("{v}"),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(v) => write!(f, "{v}"),
        }
    }
}

/// A polygon geometry with its attribute row.
///
/// Attribute keys preserve table column order; the layer lower-cases
/// them on load so callers can rely on one spelling.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    /// The feature's geometry.
    pub geometry: MultiPolygon,
    /// Attribute values keyed by column name.
    pub attributes: IndexMap<String, AttrValue>,
}

impl Feature {
    /// A feature with no attributes.
    pub fn new(geometry: MultiPolygon) -> Self {
        Self {
            geometry,
            attributes: IndexMap::new(),
        }
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }
}
