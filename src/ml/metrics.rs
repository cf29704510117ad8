//! Classification metrics
//!
//! Accuracy plus support-weighted precision, recall and F1. Classes with no
//! predicted (or no true) samples contribute zero instead of NaN.

use crate::utils::as_percent;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Labels in ascending order; rows of `confusion` are true labels
    pub labels: Vec<usize>,
    pub confusion: Vec<Vec<usize>>,
}

impl ClassificationReport {
    /// Entry for the metrics file, ratios expressed as percentages
    pub fn to_record(&self, model: &str) -> MetricsRecord {
        MetricsRecord {
            model: model.to_string(),
            accuracy: as_percent(self.accuracy),
            precision: as_percent(self.precision),
            recall: as_percent(self.recall),
            f1_score: as_percent(self.f1),
            extra: Map::new(),
        }
    }
}

fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Score predictions against ground truth
pub fn evaluate(y_true: &[usize], y_pred: &[usize]) -> ClassificationReport {
    let n = y_true.len().min(y_pred.len());
    let labels: Vec<usize> = y_true[..n]
        .iter()
        .chain(&y_pred[..n])
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index = |l: usize| labels.iter().position(|&x| x == l).unwrap_or(0);

    let mut confusion = vec![vec![0usize; labels.len()]; labels.len()];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        confusion[index(t)][index(p)] += 1;
    }

    let correct: usize = (0..labels.len()).map(|i| confusion[i][i]).sum();
    let accuracy = safe_div(correct as f64, n as f64);

    let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);
    for (k, row) in confusion.iter().enumerate() {
        let support: usize = row.iter().sum();
        let predicted: usize = confusion.iter().map(|r| r[k]).sum();
        let tp = row[k] as f64;

        let p = safe_div(tp, predicted as f64);
        let r = safe_div(tp, support as f64);
        let f = safe_div(2.0 * p * r, p + r);

        let weight = safe_div(support as f64, n as f64);
        precision += weight * p;
        recall += weight * r;
        f1 += weight * f;
    }

    ClassificationReport {
        accuracy,
        precision,
        recall,
        f1,
        labels,
        confusion,
    }
}

/// One entry in `model_accuracies.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub precision: f64,
    #[serde(default)]
    pub recall: f64,
    #[serde(default, rename = "f1Score")]
    pub f1_score: f64,
    /// Fields written by other tools are preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetricsRecord {
    pub fn matches(&self, key: &str) -> bool {
        self.model.contains(key)
    }

    /// Copy the scores of `other` while keeping this entry's name and extras
    pub fn update_from(&mut self, other: &MetricsRecord) {
        self.accuracy = other.accuracy;
        self.precision = other.precision;
        self.recall = other.recall;
        self.f1_score = other.f1_score;
    }
}
