//! Yahoo Finance chart API client
//!
//! Fetches OHLCV bars for an index or ticker.

use super::{Bar, MarketDataProvider};
use crate::config::MarketConfig;
use crate::error::{ForecastError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; quantum-forecast/0.1)";

/// Chart API client
#[derive(Clone)]
pub struct YahooClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl YahooClient {
    /// Create a new client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }
}

/// Flatten the column-oriented chart payload into bars
///
/// Rows without a close are dropped; other missing prices fall back to the
/// close and a missing volume to zero.
fn parse_chart(body: ChartResponse) -> Result<Vec<Bar>> {
    if let Some(err) = body.chart.error {
        return Err(ForecastError::MarketData(format!(
            "{}: {}",
            err.code, err.description
        )));
    }
    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = at(&quote.close, i)?;
            let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)?;
            Some(Bar {
                timestamp,
                open: at(&quote.open, i).unwrap_or(close),
                high: at(&quote.high, i).unwrap_or(close),
                low: at(&quote.low, i).unwrap_or(close),
                close,
                volume: at(&quote.volume, i).unwrap_or(0.0),
            })
        })
        .collect();
    Ok(bars)
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn bars(&self, symbol: &str, range: &str, interval: &str) -> Result<Vec<Bar>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let body: ChartResponse = self
            .http
            .get(&url)
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await?
            .json()
            .await?;

        let bars = parse_chart(body)?;
        debug!("Fetched {} {} bars for {} over {}", bars.len(), interval, symbol, range);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<Vec<Bar>> {
        parse_chart(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_parse_chart_skips_missing_close() {
        let bars = parse(json!({
            "chart": {
                "result": [{
                    "meta": {"symbol": "^FTSE"},
                    "timestamp": [1700000000, 1700000060, 1700000120],
                    "indicators": {"quote": [{
                        "open": [7400.0, null, 7402.0],
                        "high": [7401.0, null, 7403.0],
                        "low": [7399.0, null, 7401.0],
                        "close": [7400.5, null, 7402.5],
                        "volume": [1200, null, null]
                    }]}
                }],
                "error": null
            }
        }))
        .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 7400.5);
        assert_eq!(bars[0].volume, 1200.0);
        assert_eq!(bars[1].volume, 0.0);
        assert_eq!(bars[1].timestamp.timestamp(), 1700000120);
    }

    #[test]
    fn test_parse_chart_empty_result() {
        let bars = parse(json!({"chart": {"result": [], "error": null}})).unwrap();
        assert!(bars.is_empty());

        let bars = parse(json!({
            "chart": {"result": [{"indicators": {"quote": [{}]}}], "error": null}
        }))
        .unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn test_parse_chart_error() {
        let err = parse(json!({
            "chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Not Found: No data found");
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = YahooClient::new("https://example.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "https://example.com");
    }
}
