//! Small numeric helpers shared across modules

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;

/// Round the exact binary value to `dp` decimal places, half to even
pub fn round_dp(value: f64, dp: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Convert a currency amount with a fixed rate and round to cents
pub fn convert_currency(value: f64, rate: Decimal) -> f64 {
    let rate = rate.to_f64().unwrap_or(1.0);
    round_dp(value * rate, 2)
}

/// Percentage with two decimals, as stored in the metrics file
pub fn as_percent(ratio: f64) -> f64 {
    round_dp(ratio * 100.0, 2)
}

/// Mean of a slice; NaN when empty
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); NaN below two values
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(1.23456, 2), 1.23);
        assert_eq!(round_dp(2.675001, 2), 2.68);
        // 2.675 is stored as 2.67499999...
        assert_eq!(round_dp(2.675, 2), 2.67);
        assert_eq!(round_dp(0.125, 2), 0.12);
        assert_eq!(round_dp(-3.14159, 3), -3.142);
        assert!(round_dp(f64::NAN, 2).is_nan());
    }

    #[test]
    fn test_convert_currency() {
        assert_eq!(convert_currency(10.0, dec!(105.0)), 1050.0);
        assert_eq!(convert_currency(7.4321, dec!(105.0)), 780.37);
    }

    #[test]
    fn test_as_percent() {
        assert_eq!(as_percent(0.523456), 52.35);
        assert_eq!(as_percent(1.0), 100.0);
    }

    #[test]
    fn test_sample_std() {
        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((std - 2.138089935).abs() < 1e-6);
        assert!(sample_std(&[1.0]).is_nan());
    }
}
