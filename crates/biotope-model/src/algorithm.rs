//! Fitting algorithms and the trained-model artifact.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::evaluate::{evaluate_scores, Evaluation};
use crate::table::BaseTable;

/// The algorithms a [`Model`](crate::Model) can fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Algorithm {
    /// Logistic regression by batch gradient descent on standardized
    /// covariates.
    LogisticRegression {
        /// Gradient step size.
        learning_rate: f64,
        /// Number of full-batch iterations.
        iterations: usize,
        /// L2 penalty on the non-intercept weights.
        l2: f64,
    },
    /// A climate envelope: the per-covariate range of the presence rows.
    /// Scores are the fraction of covariates falling inside their range.
    ClimateEnvelope,
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::LogisticRegression {
            learning_rate: 0.1,
            iterations: 500,
            l2: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum TrainedKind {
    Logistic {
        /// Intercept first, then one weight per covariate.
        weights: Vec<f64>,
        means: Vec<f64>,
        stds: Vec<f64>,
    },
    Envelope {
        mins: Vec<f64>,
        maxs: Vec<f64>,
    },
}

/// A fitted model, ready to score covariate rows.
///
/// Serializes to JSON for caching between pipeline runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    covariate_names: Vec<String>,
    kind: TrainedKind,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Fit an algorithm on a base table.
///
/// Rows holding NaN covariates are excluded from fitting with a warning;
/// the discard policy upstream decides whether they were kept at all.
pub fn fit(table: &BaseTable, algorithm: Algorithm) -> Result<TrainedModel, ModelError> {
    if table.n_covariates() == 0 {
        return Err(ModelError::NoLayers);
    }
    let usable: Vec<usize> = (0..table.len())
        .filter(|&i| !table.row_has_nodata(i))
        .collect();
    if usable.len() < table.len() {
        warn!(
            "fitting on {} of {} rows; the rest hold nodata covariates",
            usable.len(),
            table.len()
        );
    }
    if usable.is_empty() {
        return Err(ModelError::EmptyTable);
    }
    let names: Vec<String> = table
        .covariate_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let kind = match algorithm {
        Algorithm::LogisticRegression {
            learning_rate,
            iterations,
            l2,
        } => fit_logistic(table, &usable, learning_rate, iterations, l2)?,
        Algorithm::ClimateEnvelope => fit_envelope(table, &usable)?,
    };
    Ok(TrainedModel {
        covariate_names: names,
        kind,
    })
}

fn fit_logistic(
    table: &BaseTable,
    usable: &[usize],
    learning_rate: f64,
    iterations: usize,
    l2: f64,
) -> Result<TrainedKind, ModelError> {
    let n = usable.len();
    let p = table.n_covariates();

    // Column standardization, from the training rows only.
    let mut means = vec![0.0; p];
    let mut stds = vec![0.0; p];
    for (j, mean) in means.iter_mut().enumerate() {
        let sum: f64 = usable.iter().map(|&i| table.row(i)[j]).sum();
        *mean = sum / n as f64;
    }
    for (j, std) in stds.iter_mut().enumerate() {
        let var: f64 = usable
            .iter()
            .map(|&i| (table.row(i)[j] - means[j]).powi(2))
            .sum::<f64>()
            / n as f64;
        *std = if var.sqrt() > 0.0 { var.sqrt() } else { 1.0 };
    }

    let rows: Vec<Vec<f64>> = usable
        .iter()
        .map(|&i| {
            table
                .row(i)
                .iter()
                .enumerate()
                .map(|(j, &v)| (v - means[j]) / stds[j])
                .collect()
        })
        .collect();
    let labels: Vec<f64> = usable.iter().map(|&i| table.labels()[i]).collect();

    let mut weights = vec![0.0; p + 1];
    for _ in 0..iterations {
        let mut gradient = vec![0.0; p + 1];
        for (row, &y) in rows.iter().zip(&labels) {
            let z = weights[0]
                + row
                    .iter()
                    .zip(&weights[1..])
                    .map(|(x, w)| x * w)
                    .sum::<f64>();
            let err = y - sigmoid(z);
            gradient[0] += err;
            for (g, x) in gradient[1..].iter_mut().zip(row) {
                *g += err * x;
            }
        }
        weights[0] += learning_rate * gradient[0] / n as f64;
        for (w, g) in weights[1..].iter_mut().zip(&gradient[1..]) {
            *w += learning_rate * (g / n as f64 - l2 * *w);
        }
    }
    info!("logistic fit converged over {n} rows, {p} covariates");
    Ok(TrainedKind::Logistic {
        weights,
        means,
        stds,
    })
}

fn fit_envelope(table: &BaseTable, usable: &[usize]) -> Result<TrainedKind, ModelError> {
    let p = table.n_covariates();
    let mut mins = vec![f64::INFINITY; p];
    let mut maxs = vec![f64::NEG_INFINITY; p];
    let mut presences = 0usize;
    for &i in usable {
        if table.labels()[i] != 1.0 {
            continue;
        }
        presences += 1;
        for (j, v) in table.row(i).into_iter().enumerate() {
            mins[j] = mins[j].min(v);
            maxs[j] = maxs[j].max(v);
        }
    }
    if presences == 0 {
        return Err(ModelError::DegenerateLabels);
    }
    info!("climate envelope built from {presences} presence rows");
    Ok(TrainedKind::Envelope { mins, maxs })
}

impl TrainedModel {
    /// Covariate column names the model was fitted on, in order.
    pub fn covariate_names(&self) -> &[String] {
        &self.covariate_names
    }

    /// Score one covariate row (same column order as the fit). Returns
    /// a presence probability-like value in `[0, 1]`; rows holding NaN
    /// score 0.
    pub fn predict(&self, covariates: &[f64]) -> f64 {
        if covariates.iter().any(|v| v.is_nan()) {
            return 0.0;
        }
        match &self.kind {
            TrainedKind::Logistic {
                weights,
                means,
                stds,
            } => {
                let z = weights[0]
                    + covariates
                        .iter()
                        .enumerate()
                        .map(|(j, &v)| (v - means[j]) / stds[j] * weights[j + 1])
                        .sum::<f64>();
                sigmoid(z)
            }
            TrainedKind::Envelope { mins, maxs } => {
                let inside = covariates
                    .iter()
                    .enumerate()
                    .filter(|&(j, &v)| v >= mins[j] && v <= maxs[j])
                    .count();
                inside as f64 / covariates.len() as f64
            }
        }
    }

    /// Score every row of a table.
    pub fn predict_table(&self, table: &BaseTable) -> Vec<f64> {
        (0..table.len()).map(|i| self.predict(&table.row(i))).collect()
    }

    /// Evaluate discrimination on a labeled table.
    pub fn evaluate(&self, table: &BaseTable) -> Result<Evaluation, ModelError> {
        let scores = self.predict_table(table);
        evaluate_scores(table.labels(), &scores)
    }

    /// Persist the fitted model as JSON.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a fitted model from JSON.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    /// Presences cluster at high temperature, absences at low; linearly
    /// separable.
    fn separable_table() -> BaseTable {
        let mut columns = IndexMap::new();
        columns.insert(
            "temp".to_string(),
            vec![20.0, 22.0, 21.0, 19.5, 5.0, 4.0, 6.0, 5.5],
        );
        columns.insert(
            "elev".to_string(),
            vec![100.0, 120.0, 90.0, 110.0, 900.0, 950.0, 870.0, 910.0],
        );
        BaseTable::new(
            (0..8).map(|i| (40.0 + i as f64, 5.0)).collect(),
            vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            columns,
        )
    }

    #[test]
    fn logistic_separates_separable_data() {
        let table = separable_table();
        let model = fit(&table, Algorithm::default()).unwrap();
        let e = model.evaluate(&table).unwrap();
        assert!(e.auc > 0.99, "expected near-perfect AUC, got {}", e.auc);
        assert!(model.predict(&[21.0, 100.0]) > 0.5);
        assert!(model.predict(&[5.0, 900.0]) < 0.5);
    }

    #[test]
    fn envelope_scores_inside_and_outside() {
        let table = separable_table();
        let model = fit(&table, Algorithm::ClimateEnvelope).unwrap();
        // Inside both presence ranges.
        assert_eq!(model.predict(&[20.0, 100.0]), 1.0);
        // Outside both.
        assert_eq!(model.predict(&[5.0, 900.0]), 0.0);
        // Inside one of two.
        assert_eq!(model.predict(&[20.0, 900.0]), 0.5);
        let e = model.evaluate(&table).unwrap();
        assert!(e.auc > 0.99);
    }

    #[test]
    fn nan_rows_are_excluded_from_fit_and_scored_zero() {
        let mut columns = IndexMap::new();
        columns.insert("temp".to_string(), vec![20.0, f64::NAN, 5.0, 6.0]);
        let table = BaseTable::new(
            vec![(0.0, 0.0); 4],
            vec![1.0, 1.0, 0.0, 0.0],
            columns,
        );
        let model = fit(&table, Algorithm::default()).unwrap();
        assert_eq!(model.predict(&[f64::NAN]), 0.0);
    }

    #[test]
    fn artifact_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = fit(&separable_table(), Algorithm::default()).unwrap();
        model.save(&path).unwrap();
        let back = TrainedModel::load(&path).unwrap();
        assert_eq!(back, model);
        assert_eq!(back.covariate_names(), &["temp".to_string(), "elev".to_string()]);
    }

    #[test]
    fn no_covariates_is_an_error() {
        let table = BaseTable::new(vec![(0.0, 0.0)], vec![1.0], IndexMap::new());
        assert!(matches!(
            fit(&table, Algorithm::default()),
            Err(ModelError::NoLayers)
        ));
    }
}
