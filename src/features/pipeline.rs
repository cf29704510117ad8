//! Cleaning and chronological splitting of the feature dataset

use crate::data::FeatureFrame;
use crate::error::{ForecastError, Result};
use crate::types::{Dataset, FEATURE_COLUMNS, TARGET_COLUMN};
use std::cmp::Ordering;
use tracing::{info, warn};

/// What the cleaning step changed, per column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    pub added_columns: Vec<String>,
    pub filled_nan: Vec<(String, usize)>,
    pub replaced_inf: Vec<(String, usize)>,
}

/// Chronologically ordered train/test halves
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

/// Median of the non-NaN values
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let value = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };
    (!value.is_nan()).then_some(value)
}

/// Linearly interpolated quantile over the finite values
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Fill gaps in the monitored columns in place
///
/// Absent feature columns are created as zeros, NaN becomes the column median
/// (0 for the label), and +/-inf becomes the 99th/1st percentile.
pub fn clean_frame(frame: &mut FeatureFrame) -> CleanReport {
    let mut report = CleanReport::default();
    let rows = frame.len();

    for feature in FEATURE_COLUMNS {
        if !frame.has_column(feature) {
            warn!("{} missing, filled with zeros", feature);
            frame.columns.push((feature.to_string(), vec![0.0; rows]));
            report.added_columns.push(feature.to_string());
        }
    }

    let monitored = FEATURE_COLUMNS.iter().copied().chain(std::iter::once(TARGET_COLUMN));
    for name in monitored {
        let Some(values) = frame.column_mut(name) else {
            continue;
        };

        let nan_count = values.iter().filter(|v| v.is_nan()).count();
        if nan_count > 0 {
            let fill = if name == TARGET_COLUMN {
                0.0
            } else {
                median(values).unwrap_or(0.0)
            };
            for v in values.iter_mut().filter(|v| v.is_nan()) {
                *v = fill;
            }
            info!("Filled {} NaN values in {}", nan_count, name);
            report.filled_nan.push((name.to_string(), nan_count));
        }

        let inf_count = values.iter().filter(|v| v.is_infinite()).count();
        if inf_count > 0 {
            let high = quantile(values, 0.99).unwrap_or(0.0);
            let low = quantile(values, 0.01).unwrap_or(0.0);
            for v in values.iter_mut() {
                if *v == f64::INFINITY {
                    *v = high;
                } else if *v == f64::NEG_INFINITY {
                    *v = low;
                }
            }
            info!("Replaced {} infinite values in {}", inf_count, name);
            report.replaced_inf.push((name.to_string(), inf_count));
        }
    }

    report
}

/// Assemble the fixed feature set and binary labels from a cleaned frame
pub fn to_dataset(frame: &FeatureFrame) -> Result<Dataset> {
    let columns: Vec<&[f64]> = FEATURE_COLUMNS
        .iter()
        .map(|name| {
            frame
                .column(name)
                .ok_or_else(|| ForecastError::InvalidData(format!("missing feature column {name}")))
        })
        .collect::<Result<_>>()?;
    let target = frame
        .column(TARGET_COLUMN)
        .ok_or_else(|| ForecastError::InvalidData(format!("missing label column {TARGET_COLUMN}")))?;

    let features = (0..frame.len())
        .map(|row| columns.iter().map(|col| col[row]).collect())
        .collect();
    let labels = target.iter().map(|&v| usize::from(v >= 0.5)).collect();

    Ok(Dataset {
        dates: frame.dates.clone(),
        columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        features,
        labels,
    })
}

/// Split at `floor(len * ratio)` without reordering rows
pub fn chronological_split(dataset: &Dataset, ratio: f64) -> Split {
    let split_index = ((dataset.len() as f64) * ratio).floor() as usize;
    let split_index = split_index.min(dataset.len());

    let part = |range: std::ops::Range<usize>| Dataset {
        dates: dataset.dates[range.clone()].to_vec(),
        columns: dataset.columns.clone(),
        features: dataset.features[range.clone()].to_vec(),
        labels: dataset.labels[range].to_vec(),
    };

    Split {
        train: part(0..split_index),
        test: part(split_index..dataset.len()),
    }
}

/// Clean, assemble and split a dataset for the trainers
pub fn preprocess_for_ml(mut frame: FeatureFrame, split_ratio: f64) -> Result<Split> {
    if frame.is_empty() {
        return Err(ForecastError::InvalidData("dataset has no rows".to_string()));
    }
    if !frame.has_column(TARGET_COLUMN) {
        return Err(ForecastError::InvalidData(format!(
            "missing label column {TARGET_COLUMN}"
        )));
    }

    clean_frame(&mut frame);
    let dataset = to_dataset(&frame)?;
    let split = chronological_split(&dataset, split_ratio);

    info!("Training samples: {}", split.train.len());
    info!("Test samples: {}", split.test.len());
    Ok(split)
}
