//! Univariate ANOVA F-test feature selection

use crate::error::{ForecastError, Result};
use crate::types::Dataset;
use std::collections::BTreeMap;

/// One-way ANOVA F statistic for every column against the class labels
///
/// Columns with no within-class variance score NaN when they are constant
/// overall and +inf otherwise.
pub fn f_classif(features: &[Vec<f64>], labels: &[usize]) -> Vec<f64> {
    let n = features.len();
    let Some(width) = features.first().map(Vec::len) else {
        return Vec::new();
    };

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate().take(n) {
        groups.entry(label).or_default().push(i);
    }
    let k = groups.len();
    if k < 2 || n <= k {
        return vec![f64::NAN; width];
    }

    (0..width)
        .map(|col| {
            let grand_mean = features.iter().map(|r| r[col]).sum::<f64>() / n as f64;

            let mut ss_between = 0.0;
            let mut ss_within = 0.0;
            for rows in groups.values() {
                let mean = rows.iter().map(|&i| features[i][col]).sum::<f64>() / rows.len() as f64;
                ss_between += rows.len() as f64 * (mean - grand_mean).powi(2);
                ss_within += rows
                    .iter()
                    .map(|&i| (features[i][col] - mean).powi(2))
                    .sum::<f64>();
            }

            let ms_between = ss_between / (k - 1) as f64;
            let ms_within = ss_within / (n - k) as f64;
            if ms_within == 0.0 {
                if ms_between == 0.0 {
                    f64::NAN
                } else {
                    f64::INFINITY
                }
            } else {
                ms_between / ms_within
            }
        })
        .collect()
}

/// Names of the `k` best-scoring columns, in their original order
pub fn select_k_best(dataset: &Dataset, k: usize) -> Result<Vec<String>> {
    if k == 0 || k > dataset.num_features() {
        return Err(ForecastError::InvalidData(format!(
            "cannot select {k} of {} features",
            dataset.num_features()
        )));
    }

    let scores = f_classif(&dataset.features, &dataset.labels);
    let mut ranked: Vec<usize> = (0..dataset.num_features()).collect();
    // NaN ranks below every real score; ties keep the later column
    ranked.sort_by(|&a, &b| {
        let sa = if scores[a].is_nan() { f64::NEG_INFINITY } else { scores[a] };
        let sb = if scores[b].is_nan() { f64::NEG_INFINITY } else { scores[b] };
        sb.total_cmp(&sa).then(b.cmp(&a))
    });

    let mut keep: Vec<usize> = ranked.into_iter().take(k).collect();
    keep.sort_unstable();
    Ok(keep.into_iter().map(|i| dataset.columns[i].clone()).collect())
}
