//! A single occurrence record.

use biotope_geom::Point;
use serde::{Deserialize, Serialize};

/// Basis-of-record values accepted by the reliability filter: direct
/// observations, as opposed to preserved specimens, literature, or
/// living collections.
pub const OBSERVATION_BASES: [&str; 3] =
    ["OBSERVATION", "HUMAN_OBSERVATION", "MACHINE_OBSERVATION"];

/// One occurrence record in Darwin Core terms.
///
/// The serde names match the lower-cased column headers of GBIF CSV
/// exports; the camelCase aliases cover the JSON occurrence API, so one
/// struct deserializes from both.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Service record identifier.
    #[serde(default, rename = "gbifid", alias = "key")]
    pub key: Option<i64>,
    /// Scientific (binomial) name of the observed species.
    #[serde(default, rename = "species", alias = "scientificName", alias = "scientificname")]
    pub species: Option<String>,
    /// Latitude in decimal degrees, when the record is georeferenced.
    #[serde(default, rename = "decimallatitude", alias = "decimalLatitude")]
    pub decimal_latitude: Option<f64>,
    /// Longitude in decimal degrees, when the record is georeferenced.
    #[serde(default, rename = "decimallongitude", alias = "decimalLongitude")]
    pub decimal_longitude: Option<f64>,
    /// How the record was made (observation, specimen, ...).
    #[serde(default, rename = "basisofrecord", alias = "basisOfRecord")]
    pub basis_of_record: Option<String>,
    /// Event date as written by the source.
    #[serde(default, rename = "eventdate", alias = "eventDate")]
    pub event_date: Option<String>,
    /// Event year, when the source split it out.
    #[serde(default)]
    pub year: Option<i32>,
}

impl Occurrence {
    /// Whether both coordinates are present and finite.
    pub fn has_coordinates(&self) -> bool {
        matches!(
            (self.decimal_latitude, self.decimal_longitude),
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite()
        )
    }

    /// The record as a world point (`x` = longitude, `y` = latitude).
    pub fn point(&self) -> Option<Point> {
        if self.has_coordinates() {
            Some(Point::new(
                self.decimal_longitude.expect("checked"),
                self.decimal_latitude.expect("checked"),
            ))
        } else {
            None
        }
    }

    /// The quality filter applied before overlay and rasterization:
    /// georeferenced, recorded after `min_year` (by year or event date),
    /// and based on a direct observation.
    pub fn is_reliable(&self, min_year: i32) -> bool {
        if !self.has_coordinates() {
            return false;
        }
        let recent = self.year.map(|y| y > min_year).unwrap_or(false)
            || self
                .event_date
                .as_deref()
                .map(|d| d > min_year.to_string().as_str())
                .unwrap_or(false);
        let observed = self
            .basis_of_record
            .as_deref()
            .map(|b| OBSERVATION_BASES.contains(&b))
            .unwrap_or(false);
        recent && observed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lat: Option<f64>, lon: Option<f64>) -> Occurrence {
        Occurrence {
            decimal_latitude: lat,
            decimal_longitude: lon,
            ..Default::default()
        }
    }

    #[test]
    fn coordinates_must_be_present_and_finite() {
        assert!(record(Some(10.0), Some(20.0)).has_coordinates());
        assert!(!record(None, Some(20.0)).has_coordinates());
        assert!(!record(Some(f64::NAN), Some(5.0)).has_coordinates());
        assert_eq!(
            record(Some(10.0), Some(20.0)).point(),
            Some(Point::new(20.0, 10.0))
        );
    }

    #[test]
    fn reliability_filter() {
        let good = Occurrence {
            decimal_latitude: Some(1.0),
            decimal_longitude: Some(2.0),
            basis_of_record: Some("HUMAN_OBSERVATION".to_string()),
            year: Some(2005),
            ..Default::default()
        };
        assert!(good.is_reliable(1990));
        assert!(!good.is_reliable(2010));

        let specimen = Occurrence {
            basis_of_record: Some("PRESERVED_SPECIMEN".to_string()),
            ..good.clone()
        };
        assert!(!specimen.is_reliable(1990));

        // No year column, but a recent event date string.
        let dated = Occurrence {
            year: None,
            event_date: Some("2001-06-15".to_string()),
            ..good
        };
        assert!(dated.is_reliable(1990));
    }

    #[test]
    fn deserializes_from_api_json() {
        let json = r#"{
            "key": 42,
            "scientificName": "Salmo trutta",
            "decimalLatitude": 46.5,
            "decimalLongitude": 7.25,
            "basisOfRecord": "HUMAN_OBSERVATION",
            "year": 2014
        }"#;
        let rec: Occurrence = serde_json::from_str(json).unwrap();
        assert_eq!(rec.key, Some(42));
        assert_eq!(rec.species.as_deref(), Some("Salmo trutta"));
        assert_eq!(rec.decimal_latitude, Some(46.5));
        assert!(rec.is_reliable(1990));
    }
}
