//! Seeded k-fold cross-validation.

use log::info;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::algorithm::{fit, Algorithm};
use crate::error::ModelError;
use crate::table::BaseTable;

/// Per-fold and aggregate discrimination of a cross-validated fit.
#[derive(Clone, Debug, PartialEq)]
pub struct CrossValidation {
    /// AUC of each held-out fold.
    pub fold_aucs: Vec<f64>,
    /// Mean of the fold AUCs.
    pub mean_auc: f64,
    /// Population standard deviation of the fold AUCs.
    pub std_auc: f64,
}

/// Shuffle the rows with a seeded RNG, split into `k` contiguous folds,
/// and fit/evaluate `k` times, each fold held out once.
///
/// # Errors
///
/// - [`ModelError::BadFold`] when `k < 2` or `k` exceeds the row count.
/// - [`ModelError::DegenerateLabels`] when a held-out fold ends up with
///   one class only; pick a smaller `k` or reseed.
pub fn cross_validate(
    table: &BaseTable,
    algorithm: Algorithm,
    k: usize,
    seed: u64,
) -> Result<CrossValidation, ModelError> {
    let n = table.len();
    if k < 2 || k > n {
        return Err(ModelError::BadFold { k, rows: n });
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let mut fold_aucs = Vec::with_capacity(k);
    for fold in 0..k {
        let lo = fold * n / k;
        let hi = (fold + 1) * n / k;
        let test: Vec<usize> = order[lo..hi].to_vec();
        let train: Vec<usize> = order[..lo].iter().chain(order[hi..].iter()).copied().collect();

        let fitted = fit(&table.subset(&train), algorithm)?;
        let evaluation = fitted.evaluate(&table.subset(&test))?;
        fold_aucs.push(evaluation.auc);
    }

    let mean_auc = fold_aucs.iter().sum::<f64>() / k as f64;
    let variance = fold_aucs
        .iter()
        .map(|a| (a - mean_auc).powi(2))
        .sum::<f64>()
        / k as f64;
    let std_auc = variance.sqrt();
    info!("{k}-fold cross-validation: mean AUC {mean_auc:.3} (std {std_auc:.3})");

    Ok(CrossValidation {
        fold_aucs,
        mean_auc,
        std_auc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn separable_table(n_per_class: usize) -> BaseTable {
        let mut temps = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n_per_class {
            temps.push(20.0 + (i % 5) as f64 * 0.3);
            labels.push(1.0);
        }
        for i in 0..n_per_class {
            temps.push(5.0 + (i % 5) as f64 * 0.3);
            labels.push(0.0);
        }
        let mut columns = IndexMap::new();
        columns.insert("temp".to_string(), temps);
        BaseTable::new(vec![(0.0, 0.0); n_per_class * 2], labels, columns)
    }

    #[test]
    fn folds_average_near_one_on_separable_data() {
        let table = separable_table(20);
        let cv = cross_validate(&table, Algorithm::default(), 4, 17).unwrap();
        assert_eq!(cv.fold_aucs.len(), 4);
        assert!(cv.mean_auc > 0.95, "mean AUC {}", cv.mean_auc);
    }

    #[test]
    fn same_seed_same_folds() {
        let table = separable_table(12);
        let a = cross_validate(&table, Algorithm::default(), 3, 5).unwrap();
        let b = cross_validate(&table, Algorithm::default(), 3, 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bad_fold_counts_rejected() {
        let table = separable_table(4);
        assert!(matches!(
            cross_validate(&table, Algorithm::default(), 1, 0),
            Err(ModelError::BadFold { .. })
        ));
        assert!(matches!(
            cross_validate(&table, Algorithm::default(), 100, 0),
            Err(ModelError::BadFold { .. })
        ));
    }
}
