//! Tabular occurrence storage with CSV I/O.

use std::fs::File;
use std::path::Path;

use biotope_geom::Point;
use log::{info, warn};

use crate::error::SpeciesError;
use crate::occurrence::Occurrence;

/// Options for [`OccurrenceTable::load_csv`].
#[derive(Clone, Copy, Debug)]
pub struct CsvOptions {
    /// Field delimiter. Plain CSV by default; see [`CsvOptions::gbif`]
    /// for the tab-delimited occurrence exports.
    pub delimiter: u8,
    /// Drop records without finite coordinates instead of keeping them
    /// flagged.
    pub discard_bad: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            discard_bad: true,
        }
    }
}

impl CsvOptions {
    /// The GBIF occurrence-export dialect: tab-delimited.
    pub fn gbif() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }
}

/// An in-memory table of occurrence records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OccurrenceTable {
    records: Vec<Occurrence>,
}

impl OccurrenceTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing records.
    pub fn from_records(records: Vec<Occurrence>) -> Self {
        Self { records }
    }

    /// Load records from a delimited file.
    ///
    /// The latitude/longitude columns must exist (either spelling);
    /// records with missing or non-finite coordinates are dropped when
    /// `discard_bad` is set, kept but detectable through
    /// [`Occurrence::has_coordinates`] otherwise.
    ///
    /// # Errors
    ///
    /// [`SpeciesError::MissingColumn`] when a coordinate column is
    /// absent; CSV errors for malformed rows.
    pub fn load_csv(path: &Path, opts: &CsvOptions) -> Result<Self, SpeciesError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(opts.delimiter)
            .from_reader(File::open(path)?);

        let headers = reader.headers()?.clone();
        for required in ["decimallatitude", "decimallongitude"] {
            if !headers
                .iter()
                .any(|h| h.eq_ignore_ascii_case(required))
            {
                return Err(SpeciesError::MissingColumn {
                    column: required.to_string(),
                });
            }
        }

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for row in reader.deserialize::<Occurrence>() {
            let record = row?;
            if opts.discard_bad && !record.has_coordinates() {
                dropped += 1;
                continue;
            }
            records.push(record);
        }
        if dropped > 0 {
            warn!("dropped {dropped} records without usable coordinates");
        }
        info!(
            "loaded {} occurrence records from {}",
            records.len(),
            path.display()
        );
        Ok(Self { records })
    }

    /// Write the records as comma-delimited CSV.
    pub fn save_csv(&self, path: &Path) -> Result<(), SpeciesError> {
        let mut writer = csv::Writer::from_writer(File::create(path)?);
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(SpeciesError::Io)?;
        info!("saved {} occurrence records to {}", self.records.len(), path.display());
        Ok(())
    }

    /// The records.
    pub fn records(&self) -> &[Occurrence] {
        &self.records
    }

    /// Replace the records. **Careful**, it overwrites the existing data.
    pub fn set_records(&mut self, records: Vec<Occurrence>) {
        self.records = records;
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep only records passing [`Occurrence::is_reliable`]: recent,
    /// georeferenced, observation-based. Returns how many were removed.
    pub fn filter_reliable(&mut self, min_year: i32) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.is_reliable(min_year));
        let removed = before - self.records.len();
        info!(
            "reliability filter kept {} of {before} records (min_year={min_year})",
            self.records.len()
        );
        removed
    }

    /// The georeferenced records as world points, NaN rows skipped.
    pub fn geometrize(&self) -> Vec<Point> {
        self.records.iter().filter_map(Occurrence::point).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occ.csv");
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn discard_bad_drops_the_nan_row() {
        let (_dir, path) = write_csv(
            "decimallatitude,decimallongitude\n10.0,20.0\nNaN,5.0\n",
        );
        let table = OccurrenceTable::load_csv(&path, &CsvOptions::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].decimal_latitude, Some(10.0));
    }

    #[test]
    fn keep_bad_rows_when_asked() {
        let (_dir, path) = write_csv(
            "decimallatitude,decimallongitude\n10.0,20.0\nNaN,5.0\n",
        );
        let opts = CsvOptions {
            discard_bad: false,
            ..Default::default()
        };
        let table = OccurrenceTable::load_csv(&path, &opts).unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.records()[1].has_coordinates());
        assert_eq!(table.geometrize().len(), 1);
    }

    #[test]
    fn missing_coordinate_column_is_an_error() {
        let (_dir, path) = write_csv("species,decimallatitude\nSalmo trutta,10.0\n");
        assert!(matches!(
            OccurrenceTable::load_csv(&path, &CsvOptions::default()),
            Err(SpeciesError::MissingColumn { .. })
        ));
    }

    #[test]
    fn gbif_dialect_reads_tabs() {
        let (_dir, path) = write_csv(
            "gbifid\tspecies\tdecimallatitude\tdecimallongitude\tbasisofrecord\tyear\n\
             7\tEsox lucius\t52.1\t5.3\tHUMAN_OBSERVATION\t2003\n",
        );
        let table = OccurrenceTable::load_csv(&path, &CsvOptions::gbif()).unwrap();
        assert_eq!(table.len(), 1);
        let r = &table.records()[0];
        assert_eq!(r.key, Some(7));
        assert_eq!(r.species.as_deref(), Some("Esox lucius"));
        assert_eq!(r.year, Some(2003));
    }

    #[test]
    fn csv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = OccurrenceTable::from_records(vec![Occurrence {
            key: Some(1),
            species: Some("Salmo trutta".to_string()),
            decimal_latitude: Some(46.0),
            decimal_longitude: Some(7.0),
            basis_of_record: Some("OBSERVATION".to_string()),
            event_date: None,
            year: Some(2010),
        }]);
        table.save_csv(&path).unwrap();
        let back = OccurrenceTable::load_csv(&path, &CsvOptions::default()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn reliability_filter_counts_removals() {
        let mut table = OccurrenceTable::from_records(vec![
            Occurrence {
                decimal_latitude: Some(1.0),
                decimal_longitude: Some(1.0),
                basis_of_record: Some("OBSERVATION".to_string()),
                year: Some(2000),
                ..Default::default()
            },
            Occurrence {
                decimal_latitude: Some(1.0),
                decimal_longitude: Some(1.0),
                basis_of_record: Some("FOSSIL_SPECIMEN".to_string()),
                year: Some(2000),
                ..Default::default()
            },
        ]);
        assert_eq!(table.filter_reliable(1990), 1);
        assert_eq!(table.len(), 1);
    }
}
