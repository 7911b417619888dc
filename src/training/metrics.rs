//! Binary classification metrics

use crate::error::{CarrotError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Metric catalogue: the names accepted for sorting and optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "accuracy")]
    Accuracy,
    #[serde(rename = "precision")]
    Precision,
    #[serde(rename = "recall")]
    Recall,
    #[serde(rename = "f1")]
    F1,
    #[serde(rename = "roc_auc")]
    RocAuc,
}

impl Metric {
    /// Every metric, in table column order
    pub fn all() -> Vec<Metric> {
        vec![
            Metric::Accuracy,
            Metric::Precision,
            Metric::Recall,
            Metric::F1,
            Metric::RocAuc,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::Precision => "precision",
            Metric::Recall => "recall",
            Metric::F1 => "f1",
            Metric::RocAuc => "roc_auc",
        }
    }

    /// Score predictions against the truth.
    ///
    /// `y_score` is only read by ROC-AUC.
    pub fn score(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>, y_score: &Array1<f64>) -> Result<f64> {
        let counts = ConfusionCounts::from_labels(y_true, y_pred)?;
        match self {
            Metric::Accuracy => Ok(counts.accuracy()),
            Metric::Precision => Ok(counts.precision()),
            Metric::Recall => Ok(counts.recall()),
            Metric::F1 => Ok(counts.f1()),
            Metric::RocAuc => roc_auc_score(y_true, y_score),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = CarrotError;

    fn from_str(s: &str) -> Result<Self> {
        Metric::all()
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| CarrotError::UnknownMetric(s.to_string()))
    }
}

/// Binary confusion counts with 1 as the positive label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl ConfusionCounts {
    pub fn from_labels(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(CarrotError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(CarrotError::ComputationError("Cannot score an empty fold".to_string()));
        }

        let mut counts = Self::default();
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => counts.tp += 1,
                (false, true) => counts.fp += 1,
                (false, false) => counts.tn += 1,
                (true, false) => counts.fn_ += 1,
            }
        }
        Ok(counts)
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        (self.tp + self.tn) as f64 / self.total().max(1) as f64
    }

    /// Zero when nothing was predicted positive
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// Zero when there are no positives
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Area under the ROC curve via the Mann-Whitney rank statistic.
///
/// Tied scores share their average rank, so a positive/negative tie counts
/// one half.
pub fn roc_auc_score(y_true: &Array1<f64>, y_score: &Array1<f64>) -> Result<f64> {
    if y_true.len() != y_score.len() {
        return Err(CarrotError::ShapeError {
            expected: format!("{} scores", y_true.len()),
            actual: format!("{} scores", y_score.len()),
        });
    }
    if y_score.iter().any(|s| !s.is_finite()) {
        return Err(CarrotError::ComputationError("Decision scores contain NaN or infinite values".to_string()));
    }

    let n_pos = y_true.iter().filter(|&&v| v > 0.5).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(CarrotError::ComputationError(
            "Only one class present in y_true. ROC AUC score is not defined in that case".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..y_score.len()).collect();
    order.sort_by(|&a, &b| y_score[a].total_cmp(&y_score[b]));

    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && y_score[order[j + 1]] == y_score[order[i]] {
            j += 1;
        }
        // ranks are 1-based; tied block i..=j shares the average
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if y_true[idx] > 0.5 {
                rank_sum_pos += avg_rank;
            }
        }
        i = j + 1;
    }

    let u = rank_sum_pos - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Ok(u / (n_pos * n_neg) as f64)
}

/// All five catalogue metrics for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassificationScores {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
}

impl ClassificationScores {
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>, y_score: &Array1<f64>) -> Result<Self> {
        let counts = ConfusionCounts::from_labels(y_true, y_pred)?;
        Ok(Self {
            accuracy: counts.accuracy(),
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
            roc_auc: roc_auc_score(y_true, y_score)?,
        })
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Accuracy => self.accuracy,
            Metric::Precision => self.precision,
            Metric::Recall => self.recall,
            Metric::F1 => self.f1,
            Metric::RocAuc => self.roc_auc,
        }
    }

    /// Element-wise mean over several evaluations
    pub fn mean(scores: &[ClassificationScores]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let n = scores.len() as f64;
        let sum = |m: Metric| scores.iter().map(|s| s.get(m)).sum::<f64>() / n;
        Self {
            accuracy: sum(Metric::Accuracy),
            precision: sum(Metric::Precision),
            recall: sum(Metric::Recall),
            f1: sum(Metric::F1),
            roc_auc: sum(Metric::RocAuc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_metric_names() {
        for metric in Metric::all() {
            assert_eq!(metric.as_str().parse::<Metric>().unwrap(), metric);
        }
        let err = "mse".parse::<Metric>().unwrap_err();
        assert!(matches!(err, CarrotError::UnknownMetric(ref m) if m == "mse"));
        assert!("algorithm".parse::<Metric>().is_err());
    }

    #[test]
    fn test_classification_metrics() {
        let y_true = array![1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        let y_pred = array![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0];

        let counts = ConfusionCounts::from_labels(&y_true, &y_pred).unwrap();
        assert_eq!(counts, ConfusionCounts { tp: 3, fp: 1, tn: 3, fn_: 1 });
        assert!((counts.accuracy() - 0.75).abs() < 1e-12);
        assert!((counts.precision() - 0.75).abs() < 1e-12);
        assert!((counts.recall() - 0.75).abs() < 1e-12);
        assert!((counts.f1() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_zero_division_is_zero() {
        let y_true = array![1.0, 0.0, 1.0];
        let y_pred = array![0.0, 0.0, 0.0];
        let counts = ConfusionCounts::from_labels(&y_true, &y_pred).unwrap();
        assert_eq!(counts.precision(), 0.0);
        assert_eq!(counts.f1(), 0.0);
    }

    #[test]
    fn test_roc_auc() {
        let y_true = array![0.0, 0.0, 1.0, 1.0];
        let perfect = array![0.1, 0.2, 0.8, 0.9];
        assert!((roc_auc_score(&y_true, &perfect).unwrap() - 1.0).abs() < 1e-12);

        let scores = array![0.1, 0.4, 0.35, 0.8];
        assert!((roc_auc_score(&y_true, &scores).unwrap() - 0.75).abs() < 1e-12);

        let tied = array![0.5, 0.5, 0.5, 0.5];
        assert!((roc_auc_score(&y_true, &tied).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_single_class_fails() {
        let y_true = array![1.0, 1.0, 1.0];
        let scores = array![0.1, 0.5, 0.9];
        assert!(matches!(
            roc_auc_score(&y_true, &scores),
            Err(CarrotError::ComputationError(_))
        ));
    }

    #[test]
    fn test_scores_mean() {
        let a = ClassificationScores { accuracy: 1.0, precision: 1.0, recall: 0.5, f1: 0.0, roc_auc: 0.5 };
        let b = ClassificationScores { accuracy: 0.0, precision: 0.5, recall: 0.5, f1: 1.0, roc_auc: 1.0 };
        let mean = ClassificationScores::mean(&[a, b]);
        assert!((mean.accuracy - 0.5).abs() < 1e-12);
        assert!((mean.precision - 0.75).abs() < 1e-12);
        assert!((mean.roc_auc - 0.75).abs() < 1e-12);
    }
}
