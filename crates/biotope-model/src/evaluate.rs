//! Discrimination metrics: confusion counts, ROC curve, AUC.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// How well a set of scores separates presences from absences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Correct predictions at the 0.5 threshold, divided by row count.
    pub accuracy: f64,
    /// Presences scored >= 0.5.
    pub true_positives: usize,
    /// Absences scored >= 0.5.
    pub false_positives: usize,
    /// Absences scored < 0.5.
    pub true_negatives: usize,
    /// Presences scored < 0.5.
    pub false_negatives: usize,
    /// The ROC curve as `(false_positive_rate, true_positive_rate)`
    /// points from `(0, 0)` to `(1, 1)`, one per distinct score.
    pub roc: Vec<(f64, f64)>,
    /// Area under the ROC curve, by the trapezoid rule.
    pub auc: f64,
}

/// Score a labeled set of predictions.
///
/// `labels` are 1.0/0.0; `scores` are in `[0, 1]`, higher meaning more
/// presence-like.
///
/// # Errors
///
/// [`ModelError::DegenerateLabels`] unless both classes are present.
pub fn evaluate_scores(labels: &[f64], scores: &[f64]) -> Result<Evaluation, ModelError> {
    debug_assert_eq!(labels.len(), scores.len());
    let positives = labels.iter().filter(|&&y| y == 1.0).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(ModelError::DegenerateLabels);
    }

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut tn = 0usize;
    let mut fn_ = 0usize;
    for (&y, &s) in labels.iter().zip(scores) {
        match (y == 1.0, s >= 0.5) {
            (true, true) => tp += 1,
            (true, false) => fn_ += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
        }
    }

    // Sweep thresholds from the highest score down; each distinct score
    // contributes one ROC point.
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .expect("finite scores compare")
    });
    let mut roc = vec![(0.0, 0.0)];
    let mut auc = 0.0;
    let (mut cum_tp, mut cum_fp) = (0usize, 0usize);
    let (mut prev_fpr, mut prev_tpr) = (0.0f64, 0.0f64);
    let mut i = 0;
    while i < order.len() {
        // Consume ties together so the curve is threshold-faithful.
        let score = scores[order[i]];
        while i < order.len() && scores[order[i]] == score {
            if labels[order[i]] == 1.0 {
                cum_tp += 1;
            } else {
                cum_fp += 1;
            }
            i += 1;
        }
        let tpr = cum_tp as f64 / positives as f64;
        let fpr = cum_fp as f64 / negatives as f64;
        auc += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0;
        roc.push((fpr, tpr));
        (prev_fpr, prev_tpr) = (fpr, tpr);
    }

    Ok(Evaluation {
        accuracy: (tp + tn) as f64 / labels.len() as f64,
        true_positives: tp,
        false_positives: fp,
        true_negatives: tn,
        false_negatives: fn_,
        roc,
        auc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_separation_has_auc_one() {
        let labels = [1.0, 1.0, 0.0, 0.0];
        let scores = [0.9, 0.8, 0.2, 0.1];
        let e = evaluate_scores(&labels, &scores).unwrap();
        assert_relative_eq!(e.auc, 1.0);
        assert_relative_eq!(e.accuracy, 1.0);
        assert_eq!(e.true_positives, 2);
        assert_eq!(e.true_negatives, 2);
        assert_eq!(e.roc.first(), Some(&(0.0, 0.0)));
        assert_eq!(e.roc.last(), Some(&(1.0, 1.0)));
    }

    #[test]
    fn inverted_scores_have_auc_zero() {
        let labels = [1.0, 0.0];
        let scores = [0.1, 0.9];
        let e = evaluate_scores(&labels, &scores).unwrap();
        assert_relative_eq!(e.auc, 0.0);
    }

    #[test]
    fn constant_scores_have_auc_half() {
        let labels = [1.0, 0.0, 1.0, 0.0];
        let scores = [0.5, 0.5, 0.5, 0.5];
        let e = evaluate_scores(&labels, &scores).unwrap();
        assert_relative_eq!(e.auc, 0.5);
    }

    #[test]
    fn one_class_is_degenerate() {
        assert!(matches!(
            evaluate_scores(&[1.0, 1.0], &[0.5, 0.6]),
            Err(ModelError::DegenerateLabels)
        ));
    }
}
