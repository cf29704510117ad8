//! Live index snapshot

use crate::client::Bar;
use crate::error::{ForecastError, Result};
use crate::utils::{convert_currency, round_dp, sample_std};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NO_DATA: &str = "No FTSE 100 data available (1m/5m)";
const NOT_AVAILABLE: &str = "N/A";

/// Response body of `/api/live-metrics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetrics {
    pub current_price: f64,
    pub daily_change: f64,
    /// Integer volume, or `"N/A"`
    pub volume: Value,
    pub volatility: String,
    pub next_prediction: String,
    pub confidence: f64,
    pub currency_symbol: String,
}

/// Sample std of the last `window` close-to-close returns
pub fn recent_volatility(bars: &[Bar], window: usize) -> Option<f64> {
    let returns: Vec<f64> = bars
        .windows(2)
        .filter(|w| w[0].close != 0.0)
        .map(|w| w[1].close / w[0].close - 1.0)
        .filter(|r| r.is_finite())
        .collect();
    let tail = &returns[returns.len().saturating_sub(window)..];
    let std = sample_std(tail);
    (std.is_finite() && std != 0.0).then_some(std)
}

/// Reduce intraday and daily bars to the dashboard snapshot
pub fn summarize_snapshot(
    intraday: &[Bar],
    daily: &[Bar],
    rate: Decimal,
    currency_symbol: &str,
    volatility_window: usize,
) -> Result<LiveMetrics> {
    let latest = intraday
        .last()
        .ok_or_else(|| ForecastError::MarketData(NO_DATA.to_string()))?;
    let price = latest.close;
    let prev_close = match daily {
        [first, _, ..] => first.close,
        _ => price,
    };
    let change = price - prev_close;

    let volume = if latest.volume.is_finite() && latest.volume > 0.0 {
        Value::from(latest.volume as i64)
    } else {
        Value::from(NOT_AVAILABLE)
    };
    let volatility = recent_volatility(intraday, volatility_window)
        .map(|v| format!("{:.1}%", v * 100.0))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let denom = if price != 0.0 { price } else { 1.0 };
    let confidence = round_dp((change.abs() / denom).min(1.0), 2);

    Ok(LiveMetrics {
        current_price: convert_currency(price, rate),
        daily_change: convert_currency(change, rate),
        volume,
        volatility,
        next_prediction: if change > 0.0 { "BUY" } else { "SELL" }.to_string(),
        confidence,
        currency_symbol: currency_symbol.to_string(),
    })
}
