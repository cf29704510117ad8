//! Integration tests for the classical model and metrics

use super::*;
use crate::config::SvmConfig;
use serde_json::json;

#[test]
fn test_perfect_predictions() {
    let report = evaluate(&[0, 1, 1, 0], &[0, 1, 1, 0]);
    assert_eq!(report.accuracy, 1.0);
    assert_eq!(report.precision, 1.0);
    assert_eq!(report.recall, 1.0);
    assert_eq!(report.f1, 1.0);
    assert_eq!(report.confusion, vec![vec![2, 0], vec![0, 2]]);
}

#[test]
fn test_weighted_scores() {
    // class 0: tp 1, predicted 1, support 2 -> p 1, r 0.5, f 2/3
    // class 1: tp 2, predicted 3, support 2 -> p 2/3, r 1, f 0.8
    let report = evaluate(&[0, 0, 1, 1], &[0, 1, 1, 1]);
    assert_eq!(report.accuracy, 0.75);
    assert!((report.precision - (0.5 * 1.0 + 0.5 * 2.0 / 3.0)).abs() < 1e-12);
    assert!((report.recall - 0.75).abs() < 1e-12);
    assert!((report.f1 - (0.5 * 2.0 / 3.0 + 0.5 * 0.8)).abs() < 1e-12);
}

#[test]
fn test_zero_division_is_zero() {
    // nothing predicted as class 1
    let report = evaluate(&[0, 1], &[0, 0]);
    assert_eq!(report.accuracy, 0.5);
    assert!((report.precision - 0.25).abs() < 1e-12);
    assert!(report.precision.is_finite() && report.f1.is_finite());
}

#[test]
fn test_empty_input() {
    let report = evaluate(&[], &[]);
    assert_eq!(report.accuracy, 0.0);
    assert!(report.labels.is_empty());
}

#[test]
fn test_record_uses_percentages() {
    let report = evaluate(&[0, 0, 1], &[0, 1, 1]);
    let record = report.to_record("SVM (Classical)");
    assert_eq!(record.accuracy, 66.67);
    assert_eq!(record.model, "SVM (Classical)");

    let value = serde_json::to_value(&record).unwrap();
    assert!(value.get("f1Score").is_some());
    assert!(value.get("f1_score").is_none());
}

#[test]
fn test_record_keeps_unknown_fields() {
    let raw = json!({
        "model": "VQC (Quantum)",
        "accuracy": 51.0,
        "precision": 50.0,
        "recall": 49.0,
        "f1Score": 48.0,
        "color": "#8884d8"
    });
    let mut record: MetricsRecord = serde_json::from_value(raw).unwrap();
    assert!(record.matches("VQC"));
    assert!(!record.matches("SVM"));

    let fresh = evaluate(&[1, 1], &[1, 1]).to_record("VQC");
    record.update_from(&fresh);
    assert_eq!(record.accuracy, 100.0);
    assert_eq!(record.model, "VQC (Quantum)");

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["color"], "#8884d8");
}

#[test]
fn test_svm_scores_on_noisy_threshold() {
    let rows: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64 / 40.0 * std::f64::consts::PI]).collect();
    let labels: Vec<usize> = (0..40).map(|i| usize::from(i >= 20)).collect();
    let model = svm::fit(&rows, &labels, &SvmConfig::default(), 42).unwrap();
    let report = evaluate(&labels, &model.predict(&rows));
    assert!(report.accuracy >= 0.8, "accuracy {}", report.accuracy);
}
