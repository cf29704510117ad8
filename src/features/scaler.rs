//! Min-max feature scaling

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Per-column affine map from the fitted `[min, max]` onto `[low, high]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub feature_range: (f64, f64),
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit on row-major data
    pub fn fit(rows: &[Vec<f64>], feature_range: (f64, f64)) -> Result<Self> {
        let width = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| ForecastError::InvalidData("cannot fit scaler on no rows".to_string()))?;

        let mut data_min = vec![f64::INFINITY; width];
        let mut data_max = vec![f64::NEG_INFINITY; width];
        for row in rows {
            if row.len() != width {
                return Err(ForecastError::InvalidData(format!(
                    "ragged row: expected {width} values, got {}",
                    row.len()
                )));
            }
            for (j, &v) in row.iter().enumerate() {
                data_min[j] = data_min[j].min(v);
                data_max[j] = data_max[j].max(v);
            }
        }

        Ok(Self {
            feature_range,
            data_min,
            data_max,
        })
    }

    pub fn num_features(&self) -> usize {
        self.data_min.len()
    }

    /// Scale one row; values outside the fitted range are not clipped
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.num_features() {
            return Err(ForecastError::InvalidData(format!(
                "scaler expects {} features, got {}",
                self.num_features(),
                row.len()
            )));
        }
        let (low, high) = self.feature_range;
        Ok(row
            .iter()
            .enumerate()
            .map(|(j, &v)| {
                let range = self.data_max[j] - self.data_min[j];
                // constant columns map onto the lower bound
                let range = if range == 0.0 { 1.0 } else { range };
                (v - self.data_min[j]) / range * (high - low) + low
            })
            .collect())
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_fit_transform_to_pi_range() {
        let rows = vec![vec![0.0, 10.0], vec![5.0, 20.0], vec![10.0, 30.0]];
        let scaler = MinMaxScaler::fit(&rows, (0.0, PI)).unwrap();
        let scaled = scaler.transform(&rows).unwrap();
        assert_eq!(scaled[0], vec![0.0, 0.0]);
        assert!((scaled[1][0] - PI / 2.0).abs() < 1e-12);
        assert!((scaled[2][1] - PI).abs() < 1e-12);
    }

    #[test]
    fn test_transform_does_not_clip() {
        let scaler = MinMaxScaler::fit(&[vec![0.0], vec![1.0]], (0.0, 1.0)).unwrap();
        assert_eq!(scaler.transform_row(&[2.0]).unwrap(), vec![2.0]);
        assert_eq!(scaler.transform_row(&[-1.0]).unwrap(), vec![-1.0]);
    }

    #[test]
    fn test_constant_column() {
        let scaler = MinMaxScaler::fit(&[vec![3.0], vec![3.0]], (0.0, PI)).unwrap();
        assert_eq!(scaler.transform_row(&[3.0]).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let scaler = MinMaxScaler::fit(&[vec![0.0, 1.0]], (0.0, 1.0)).unwrap();
        assert!(scaler.transform_row(&[1.0]).is_err());
        assert!(MinMaxScaler::fit(&[], (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_serde_round_trip_keeps_parameters() {
        let scaler = MinMaxScaler::fit(&[vec![1.0], vec![4.0]], (0.0, PI)).unwrap();
        let json = serde_json::to_string(&scaler).unwrap();
        let restored: MinMaxScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, scaler);
    }
}
