//! The base table: labels joined with covariates by raster cell.

use std::fs::File;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::ModelError;

/// The joined table a model trains on.
///
/// One row per labeled cell, indexed by the cell-center world coordinate
/// `(lat, lon)`. The label column is 1.0 for presence and 0.0 for
/// pseudo-absence; covariate columns appear in layer-attachment order.
/// Unusable covariate cells hold NaN.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BaseTable {
    coords: Vec<(f64, f64)>,
    labels: Vec<f64>,
    columns: IndexMap<String, Vec<f64>>,
}

impl BaseTable {
    /// Assemble a table from parallel columns.
    pub(crate) fn new(
        coords: Vec<(f64, f64)>,
        labels: Vec<f64>,
        columns: IndexMap<String, Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(coords.len(), labels.len());
        for column in columns.values() {
            debug_assert_eq!(column.len(), labels.len());
        }
        Self {
            coords,
            labels,
            columns,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of covariate columns.
    pub fn n_covariates(&self) -> usize {
        self.columns.len()
    }

    /// Covariate column names, in attachment order.
    pub fn covariate_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// The `(lat, lon)` cell centers of every row.
    pub fn coords(&self) -> &[(f64, f64)] {
        &self.coords
    }

    /// The label column.
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// A covariate column by name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// The covariate values of one row, in column order.
    pub fn row(&self, index: usize) -> Vec<f64> {
        self.columns.values().map(|col| col[index]).collect()
    }

    /// Whether any covariate of the row is NaN.
    pub fn row_has_nodata(&self, index: usize) -> bool {
        self.columns.values().any(|col| col[index].is_nan())
    }

    /// A new table holding only the given rows, preserving column order.
    pub fn subset(&self, indices: &[usize]) -> Self {
        let coords = indices.iter().map(|&i| self.coords[i]).collect();
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        let columns = self
            .columns
            .iter()
            .map(|(name, col)| {
                (
                    name.clone(),
                    indices.iter().map(|&i| col[i]).collect::<Vec<f64>>(),
                )
            })
            .collect();
        Self {
            coords,
            labels,
            columns,
        }
    }

    /// Export the table as CSV with `decimallatitude`, `decimallongitude`,
    /// `label`, then one column per covariate.
    pub fn save_csv(&self, path: &Path) -> Result<(), ModelError> {
        let mut writer = csv::Writer::from_writer(File::create(path)?);
        let mut header = vec![
            "decimallatitude".to_string(),
            "decimallongitude".to_string(),
            "label".to_string(),
        ];
        header.extend(self.columns.keys().cloned());
        writer.write_record(&header)?;
        for i in 0..self.len() {
            let mut record = vec![
                self.coords[i].0.to_string(),
                self.coords[i].1.to_string(),
                self.labels[i].to_string(),
            ];
            for col in self.columns.values() {
                record.push(if col[i].is_nan() {
                    String::new()
                } else {
                    col[i].to_string()
                });
            }
            writer.write_record(&record)?;
        }
        writer.flush().map_err(ModelError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BaseTable {
        let mut columns = IndexMap::new();
        columns.insert("temp".to_string(), vec![10.0, 12.0, f64::NAN, 9.0]);
        columns.insert("elev".to_string(), vec![100.0, 250.0, 80.0, 40.0]);
        BaseTable::new(
            vec![(50.5, 4.5), (50.5, 5.5), (51.5, 4.5), (51.5, 5.5)],
            vec![1.0, 1.0, 0.0, 0.0],
            columns,
        )
    }

    #[test]
    fn shape_and_access() {
        let t = sample();
        assert_eq!(t.len(), 4);
        assert_eq!(t.n_covariates(), 2);
        assert_eq!(t.covariate_names(), vec!["temp", "elev"]);
        assert_eq!(t.row(1), vec![12.0, 250.0]);
        assert!(t.row_has_nodata(2));
        assert!(!t.row_has_nodata(0));
    }

    #[test]
    fn subset_preserves_order() {
        let t = sample();
        let s = t.subset(&[3, 0]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.labels(), &[0.0, 1.0]);
        assert_eq!(s.row(0), vec![9.0, 40.0]);
        assert_eq!(s.covariate_names(), t.covariate_names());
    }

    #[test]
    fn csv_export_blanks_nodata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.csv");
        sample().save_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "decimallatitude,decimallongitude,label,temp,elev"
        );
        let nodata_row = lines.nth(2).unwrap();
        assert_eq!(nodata_row, "51.5,4.5,0,,80");
    }
}
