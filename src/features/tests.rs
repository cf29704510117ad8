//! Integration tests for the feature pipeline

use super::*;
use super::pipeline::{median, quantile};
use crate::data::FeatureFrame;
use crate::types::FEATURE_COLUMNS;
use chrono::{Duration, NaiveDate};

fn frame_with(columns: Vec<(&str, Vec<f64>)>) -> FeatureFrame {
    let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    FeatureFrame {
        dates: (0..rows).map(|i| start + Duration::days(i as i64)).collect(),
        columns: columns
            .into_iter()
            .map(|(n, v)| (n.to_string(), v))
            .collect(),
    }
}

fn full_frame(rows: usize) -> FeatureFrame {
    let mut columns: Vec<(&str, Vec<f64>)> = FEATURE_COLUMNS
        .iter()
        .enumerate()
        .map(|(j, name)| (*name, (0..rows).map(|i| (i * (j + 1)) as f64).collect()))
        .collect();
    columns.push(("target", (0..rows).map(|i| (i % 2) as f64).collect()));
    frame_with(columns)
}

#[test]
fn test_median_skips_nan() {
    assert_eq!(median(&[3.0, f64::NAN, 1.0, 2.0]), Some(2.0));
    assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    assert_eq!(median(&[f64::NAN]), None);
}

#[test]
fn test_quantile_interpolates_over_finite_values() {
    let values: Vec<f64> = (0..=100).map(f64::from).collect();
    assert_eq!(quantile(&values, 0.99), Some(99.0));
    assert_eq!(quantile(&values, 0.01), Some(1.0));
    assert_eq!(quantile(&[0.0, 10.0, f64::INFINITY], 0.5), Some(5.0));
    assert_eq!(quantile(&[f64::INFINITY], 0.5), None);
}

#[test]
fn test_clean_frame_fills_nan_with_median() {
    let mut frame = full_frame(5);
    frame.column_mut("rsi").unwrap()[1] = f64::NAN;
    frame.column_mut("target").unwrap()[4] = f64::NAN;

    // rsi column is 0, 3, 6, 9, 12 before the gap
    let report = clean_frame(&mut frame);

    assert_eq!(frame.column("rsi").unwrap()[1], 7.5);
    assert_eq!(frame.column("target").unwrap()[4], 0.0);
    assert!(report.filled_nan.contains(&("rsi".to_string(), 1)));
    assert!(report.filled_nan.contains(&("target".to_string(), 1)));
}

#[test]
fn test_clean_frame_replaces_infinities_by_sign() {
    let mut values: Vec<f64> = (0..=100).map(f64::from).collect();
    values[10] = f64::INFINITY;
    values[20] = f64::NEG_INFINITY;
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let expected_high = quantile(&finite, 0.99).unwrap();
    let expected_low = quantile(&finite, 0.01).unwrap();

    let mut frame = full_frame(101);
    *frame.column_mut("macd").unwrap() = values;
    let report = clean_frame(&mut frame);

    let macd = frame.column("macd").unwrap();
    assert_eq!(macd[10], expected_high);
    assert_eq!(macd[20], expected_low);
    assert!(macd.iter().all(|v| v.is_finite()));
    assert_eq!(report.replaced_inf, vec![("macd".to_string(), 2)]);
}

#[test]
fn test_clean_frame_adds_missing_columns_as_zero() {
    let mut frame = frame_with(vec![
        ("rsi", vec![50.0, 60.0]),
        ("target", vec![1.0, 0.0]),
    ]);
    let report = clean_frame(&mut frame);

    assert_eq!(report.added_columns.len(), FEATURE_COLUMNS.len() - 1);
    assert_eq!(frame.column("obv").unwrap(), &[0.0, 0.0]);
    assert_eq!(frame.column("rsi").unwrap(), &[50.0, 60.0]);
}

#[test]
fn test_all_nan_column_falls_back_to_zero() {
    let mut frame = full_frame(3);
    *frame.column_mut("adx").unwrap() = vec![f64::NAN; 3];
    clean_frame(&mut frame);
    assert_eq!(frame.column("adx").unwrap(), &[0.0, 0.0, 0.0]);
}

#[test]
fn test_split_is_chronological() {
    let split = preprocess_for_ml(full_frame(10), 0.8).unwrap();
    assert_eq!(split.train.len(), 8);
    assert_eq!(split.test.len(), 2);

    let last_train = split.train.dates.last().unwrap();
    assert!(split.test.dates.iter().all(|d| d > last_train));
    assert_eq!(split.train.features[0].len(), FEATURE_COLUMNS.len());
    assert_eq!(split.train.labels, vec![0, 1, 0, 1, 0, 1, 0, 1]);
}

#[test]
fn test_split_floor_index() {
    let split = preprocess_for_ml(full_frame(7), 0.8).unwrap();
    assert_eq!(split.train.len(), 5);
    assert_eq!(split.test.len(), 2);
}

#[test]
fn test_preprocess_requires_target() {
    let frame = frame_with(vec![("rsi", vec![1.0, 2.0])]);
    assert!(preprocess_for_ml(frame, 0.8).is_err());
    assert!(preprocess_for_ml(FeatureFrame::default(), 0.8).is_err());
}

#[test]
fn test_selection_then_scaling_on_split() {
    let split = preprocess_for_ml(full_frame(20), 0.8).unwrap();
    let selected = select_k_best(&split.train, 3).unwrap();
    assert_eq!(selected.len(), 3);

    let train = split.train.select(&selected).unwrap();
    let scaler = MinMaxScaler::fit(&train.features, (0.0, std::f64::consts::PI)).unwrap();
    let scaled = scaler.transform(&train.features).unwrap();
    for row in &scaled {
        assert!(row.iter().all(|v| (0.0..=std::f64::consts::PI + 1e-12).contains(v)));
    }
}
