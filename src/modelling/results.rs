//! Result tables and the fitted-model registry

use super::catalogue::Algorithm;
use super::hyperparams::Hyperparams;
use crate::error::Result;
use crate::training::{ClassificationScores, Metric, ModelInstance};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column holding the mean fold fit time
pub const FIT_TIME_COLUMN: &str = "Fit time (s)";

/// One compared algorithm: fold-mean metrics and mean fit time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub algorithm: Algorithm,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
    #[serde(rename = "Fit time (s)")]
    pub fit_time_secs: f64,
}

impl ComparisonRow {
    pub fn new(algorithm: Algorithm, scores: ClassificationScores, fit_time_secs: f64) -> Self {
        Self {
            algorithm,
            accuracy: scores.accuracy,
            precision: scores.precision,
            recall: scores.recall,
            f1: scores.f1,
            roc_auc: scores.roc_auc,
            fit_time_secs,
        }
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
}

/// Comparator output, one row per evaluated algorithm in evaluation order
/// until [`ComparisonTable::sort_by_metric`] reorders it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ComparisonRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn algorithms(&self) -> Vec<Algorithm> {
        self.rows.iter().map(|r| r.algorithm).collect()
    }

    /// Stable sort: `metric` descending, then fit time ascending
    pub fn sort_by_metric(&mut self, metric: Metric) {
        self.rows.sort_by(|a, b| {
            b.get(metric)
                .total_cmp(&a.get(metric))
                .then(a.fit_time_secs.total_cmp(&b.fit_time_secs))
        });
    }

    /// Columns: `algorithm, accuracy, precision, recall, f1, roc_auc, Fit time (s)`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let algorithms: Vec<&str> = self.rows.iter().map(|r| r.algorithm.id()).collect();
        let mut columns: Vec<Column> = vec![Column::new("algorithm".into(), algorithms)];
        for metric in Metric::all() {
            let values: Vec<f64> = self.rows.iter().map(|r| r.get(metric)).collect();
            columns.push(Column::new(metric.as_str().into(), values));
        }
        let fit_times: Vec<f64> = self.rows.iter().map(|r| r.fit_time_secs).collect();
        columns.push(Column::new(FIT_TIME_COLUMN.into(), fit_times));

        Ok(DataFrame::new(columns)?)
    }
}

/// One tuned algorithm: best objective value and the parameters behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningRow {
    pub algorithm: Algorithm,
    pub metric: f64,
    pub hyperparams: Hyperparams,
}

/// Tuner output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TuningTable {
    rows: Vec<TuningRow>,
}

impl TuningTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: TuningRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[TuningRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn algorithms(&self) -> Vec<Algorithm> {
        self.rows.iter().map(|r| r.algorithm).collect()
    }

    /// Columns: `algorithm, metric, hyperparams`, the last one as a JSON string
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let algorithms: Vec<&str> = self.rows.iter().map(|r| r.algorithm.id()).collect();
        let metrics: Vec<f64> = self.rows.iter().map(|r| r.metric).collect();
        let hyperparams = self
            .rows
            .iter()
            .map(|r| Ok(r.hyperparams.to_json()?.to_string()))
            .collect::<Result<Vec<String>>>()?;

        Ok(DataFrame::new(vec![
            Column::new("algorithm".into(), algorithms),
            Column::new("metric".into(), metrics),
            Column::new("hyperparams".into(), hyperparams),
        ])?)
    }

    pub(crate) fn from_rows(rows: Vec<TuningRow>) -> Self {
        Self { rows }
    }
}

/// Models returned by the comparator, keyed by algorithm.
///
/// `None` marks an algorithm that was evaluated without keeping its model.
/// Inserting the same algorithm twice keeps the last model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelRegistry {
    models: BTreeMap<Algorithm, Option<ModelInstance>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, algorithm: Algorithm, model: Option<ModelInstance>) {
        self.models.insert(algorithm, model);
    }

    pub fn contains(&self, algorithm: Algorithm) -> bool {
        self.models.contains_key(&algorithm)
    }

    /// Fitted model for `algorithm`, if one was kept
    pub fn get(&self, algorithm: Algorithm) -> Option<&ModelInstance> {
        self.models.get(&algorithm).and_then(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Algorithm, &Option<ModelInstance>)> {
        self.models.iter()
    }

    pub fn into_inner(self) -> BTreeMap<Algorithm, Option<ModelInstance>> {
        self.models
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modelling::hyperparams::RidgeParams;

    fn row(algorithm: Algorithm, f1: f64, fit_time_secs: f64) -> ComparisonRow {
        ComparisonRow::new(
            algorithm,
            ClassificationScores {
                f1,
                ..Default::default()
            },
            fit_time_secs,
        )
    }

    #[test]
    fn test_sort_is_stable() {
        let mut table = ComparisonTable::new();
        table.push(row(Algorithm::KNN, 0.5, 0.1));
        table.push(row(Algorithm::DecisionTree, 0.9, 0.3));
        table.push(row(Algorithm::NaiveBayes, 0.9, 0.3));
        table.push(row(Algorithm::Ridge, 0.9, 0.1));

        table.sort_by_metric(Metric::F1);
        assert_eq!(
            table.algorithms(),
            vec![Algorithm::Ridge, Algorithm::DecisionTree, Algorithm::NaiveBayes, Algorithm::KNN]
        );
    }

    #[test]
    fn test_comparison_frame_columns() {
        let mut table = ComparisonTable::new();
        table.push(row(Algorithm::LogisticRegression, 0.8, 0.01));
        let df = table.to_dataframe().unwrap();

        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec!["algorithm", "accuracy", "precision", "recall", "f1", "roc_auc", "Fit time (s)"]
        );
        assert_eq!(df.height(), 1);

        let json = serde_json::to_value(&table.rows()[0]).unwrap();
        assert_eq!(json["algorithm"], "lr");
        assert!(json.get("Fit time (s)").is_some());
    }

    #[test]
    fn test_tuning_frame() {
        let mut table = TuningTable::new();
        table.push(TuningRow {
            algorithm: Algorithm::Ridge,
            metric: 0.75,
            hyperparams: Hyperparams::Ridge(RidgeParams { alpha: 2.0 }),
        });
        let df = table.to_dataframe().unwrap();

        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["algorithm", "metric", "hyperparams"]);

        let rendered = df.column("hyperparams").unwrap().str().unwrap().get(0).unwrap().to_string();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["alpha"], 2.0);
    }

    #[test]
    fn test_registry_last_insert_wins() {
        let mut registry = ModelRegistry::new();
        registry.insert(Algorithm::NaiveBayes, None);
        assert!(registry.contains(Algorithm::NaiveBayes));
        assert!(registry.get(Algorithm::NaiveBayes).is_none());

        let model = crate::modelling::get_model_instance(Algorithm::NaiveBayes, None).unwrap();
        registry.insert(Algorithm::NaiveBayes, Some(model));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(Algorithm::NaiveBayes).is_some());
    }
}
