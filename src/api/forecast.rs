//! Company forecast rows
//!
//! The forward rows are a random walk around the last close, not a model
//! output. They exist so the frontend chart has something to draw.

use crate::config::ForecastConfig;
use crate::data::{parse_date, Record};
use crate::types::PRICE_COLUMNS;
use crate::utils::{convert_currency, round_dp};
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rand_distr::StandardNormal;
use serde_json::{Number, Value};

pub const VQC_PREDICTION: &str = "vqc_prediction";
pub const SVM_PREDICTION: &str = "svm_prediction";
pub const ACTUAL: &str = "actual";
pub const DATE: &str = "date";

fn number(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

/// Rescale the currency columns of a historical row in place
fn convert_row(row: &mut Record, config: &ForecastConfig) {
    for col in PRICE_COLUMNS.iter().copied().chain(std::iter::once(ACTUAL)) {
        if let Some(value) = row.get_mut(col) {
            if let Some(v) = value.as_f64() {
                *value = number(convert_currency(v, config.exchange_rate));
            }
        }
    }
}

/// Last `history_rows` rows annotated for the chart, followed by the forecast
pub fn build_company_forecast<R: Rng>(
    records: &[Record],
    config: &ForecastConfig,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<Record> {
    let start = records.len().saturating_sub(config.history_rows);
    let source = &records[start..];

    let mut rows: Vec<Record> = source
        .iter()
        .map(|src| {
            let mut row = src.clone();
            row.insert(VQC_PREDICTION.to_string(), Value::Null);
            row.insert(SVM_PREDICTION.to_string(), Value::Null);
            row.insert(ACTUAL.to_string(), src.get("Close").cloned().unwrap_or(Value::Null));
            row.insert(DATE.to_string(), src.get("Date").cloned().unwrap_or(Value::Null));
            convert_row(&mut row, config);
            row
        })
        .collect();

    let last = rows.last();
    let base_date = last
        .and_then(|r| r.get(DATE))
        .and_then(Value::as_str)
        .and_then(parse_date)
        .unwrap_or(today);
    let last_close = last
        .and_then(|r| r.get(ACTUAL))
        .and_then(Value::as_f64)
        .filter(|v| *v != 0.0)
        .unwrap_or(config.fallback_close);

    let template = source.last().cloned().unwrap_or_default();
    for day in 1..=i64::from(config.horizon_days) {
        let z1: f64 = rng.sample(StandardNormal);
        let z2: f64 = rng.sample(StandardNormal);
        let pred = last_close * (1.0 + config.vqc_noise * z1);
        let svm = pred * (1.0 + config.svm_noise * z2);

        let mut row = template.clone();
        for col in PRICE_COLUMNS {
            row.insert(col.to_string(), Value::Null);
        }
        let date = base_date + Duration::days(day);
        row.insert(DATE.to_string(), Value::String(date.format("%Y-%m-%d").to_string()));
        row.insert(ACTUAL.to_string(), Value::Null);
        row.insert(VQC_PREDICTION.to_string(), number(round_dp(pred, 2)));
        row.insert(SVM_PREDICTION.to_string(), number(round_dp(svm, 2)));
        rows.push(row);
    }

    rows
}
