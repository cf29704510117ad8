//! Router, handler and forecast tests

use super::forecast::{build_company_forecast, ACTUAL, SVM_PREDICTION, VQC_PREDICTION};
use super::live::{recent_volatility, summarize_snapshot, NO_DATA};
use super::*;
use crate::client::{Bar, MockMarketDataProvider};
use crate::config::ForecastConfig;
use crate::data::Record;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{DateTime, NaiveDate, Utc};
use mockall::predicate::eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::io::Write;
use tempfile::TempDir;
use tower::ServiceExt;

fn bar(minute: i64, close: f64, volume: f64) -> Bar {
    Bar {
        timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000 + minute * 60, 0).unwrap(),
        open: close,
        high: close,
        low: close,
        close,
        volume,
    }
}

fn company_records(rows: usize) -> Vec<Record> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..rows)
        .map(|i| {
            let close = 10.0 + i as f64 * 0.1;
            let value = json!({
                "Date": (start + chrono::Duration::days(i as i64)).format("%Y-%m-%d").to_string(),
                "Open": close - 0.05,
                "High": close + 0.1,
                "Low": close - 0.1,
                "Close": close,
                "Volume": 1000 + i,
            });
            match value {
                Value::Object(map) => map,
                _ => unreachable!(),
            }
        })
        .collect()
}

struct Fixture {
    _dir: TempDir,
    state: AppState,
}

fn write_file(dir: &std::path::Path, name: &str, content: &str) {
    std::fs::create_dir_all(dir).unwrap();
    let mut file = std::fs::File::create(dir.join(name)).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

fn fixture(market: MockMarketDataProvider) -> Fixture {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    let models_dir = dir.path().join("models");

    let mut company = String::from("Date,Open,High,Low,Close,Volume\n");
    for i in 0..35 {
        let close = 7.0 + i as f64 * 0.01;
        company.push_str(&format!("2024-02-{:02},{close},{close},{close},{close},{}\n", (i % 28) + 1, 100 + i));
    }
    write_file(&data_dir, "AZN.csv", &company);
    write_file(
        &data_dir,
        "dataset.csv",
        "Price,Close,rsi\nTicker,^FTSE,\nDate,,\n2024-01-02,7700.5,55.1\n2024-01-03,7690.0,inf\n",
    );
    write_file(&data_dir, "predictions.csv", "date,actual,predicted\n2024-01-02,1,0\n2024-01-03,0,nan\n");
    write_file(&models_dir, "model_accuracies.json", r#"[{"model":"SVM (Classical)","accuracy":52.1}]"#);
    write_file(&models_dir, "quantum_metrics.json", r#"{"qubits":3,"circuit_depth":27}"#);

    let mut config = Config::default();
    config.paths.data_dir = data_dir.to_string_lossy().to_string();
    config.paths.models_dir = models_dir.to_string_lossy().to_string();
    config.forecast.seed = Some(42);

    Fixture {
        state: AppState::new(config, Arc::new(market)),
        _dir: dir,
    }
}

async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
    let response = create_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// ---- forecast ----

#[test]
fn test_forecast_history_is_last_rows_converted() {
    let records = company_records(45);
    let config = ForecastConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    let rows = build_company_forecast(&records, &config, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(), &mut rng);

    assert_eq!(rows.len(), 40);
    for (row, src) in rows[..30].iter().zip(&records[15..]) {
        let close = src["Close"].as_f64().unwrap();
        let expected = crate::utils::round_dp(close * 105.0, 2);
        assert_eq!(row["Close"].as_f64().unwrap(), expected);
        assert_eq!(row[ACTUAL].as_f64().unwrap(), expected);
        assert_eq!(row["date"], src["Date"]);
        assert_eq!(row["Volume"], src["Volume"]);
        assert!(row[VQC_PREDICTION].is_null());
        assert!(row[SVM_PREDICTION].is_null());
    }
}

#[test]
fn test_forecast_rows_shape() {
    let records = company_records(40);
    let config = ForecastConfig::default();
    let mut rng = StdRng::seed_from_u64(2);
    let rows = build_company_forecast(&records, &config, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(), &mut rng);

    let last_actual = rows[29][ACTUAL].as_f64().unwrap();
    for (i, row) in rows[30..].iter().enumerate() {
        for col in ["Open", "High", "Low", "Close", ACTUAL] {
            assert!(row[col].is_null(), "{col} should be null");
        }
        let vqc = row[VQC_PREDICTION].as_f64().unwrap();
        let svm = row[SVM_PREDICTION].as_f64().unwrap();
        assert!((vqc / last_actual - 1.0).abs() < 0.1);
        assert!((svm / vqc - 1.0).abs() < 0.05);
        // 2024-01-01 + 39 days = 2024-02-09
        let expected = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap() + chrono::Duration::days(i as i64 + 1);
        assert_eq!(row["date"], expected.format("%Y-%m-%d").to_string());
        // source columns carried from the last row
        assert_eq!(row["Volume"], records[39]["Volume"]);
    }
}

#[test]
fn test_forecast_seeded_is_reproducible() {
    let records = company_records(10);
    let config = ForecastConfig::default();
    let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    let a = build_company_forecast(&records, &config, today, &mut StdRng::seed_from_u64(9));
    let b = build_company_forecast(&records, &config, today, &mut StdRng::seed_from_u64(9));
    assert_eq!(a, b);
    assert_eq!(a.len(), 20);
}

#[test]
fn test_forecast_fallbacks() {
    let config = ForecastConfig::default();
    let today = NaiveDate::from_ymd_opt(2030, 6, 1).unwrap();
    let rows = build_company_forecast(&[], &config, today, &mut StdRng::seed_from_u64(3));

    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0]["date"], "2030-06-02");
    let vqc = rows[0][VQC_PREDICTION].as_f64().unwrap();
    assert!((vqc - 100.0).abs() < 10.0);

    let mut records = company_records(2);
    records[1].insert("Close".to_string(), json!(0));
    records[1].insert("Date".to_string(), json!("not a date"));
    let rows = build_company_forecast(&records, &config, today, &mut StdRng::seed_from_u64(3));
    assert_eq!(rows[2]["date"], "2030-06-02");
    assert!((rows[2][VQC_PREDICTION].as_f64().unwrap() - 100.0).abs() < 10.0);
}

// ---- live snapshot ----

#[test]
fn test_snapshot_fields() {
    let intraday: Vec<Bar> = (0..5).map(|i| bar(i, 100.0 + i as f64, 10.0)).collect();
    let daily = vec![bar(0, 98.0, 0.0), bar(1, 104.0, 0.0)];
    let m = summarize_snapshot(&intraday, &daily, dec!(105.0), "₹", 60).unwrap();

    assert_eq!(m.current_price, 10920.0);
    assert_eq!(m.daily_change, 630.0);
    assert_eq!(m.volume, json!(10));
    assert_eq!(m.next_prediction, "BUY");
    assert_eq!(m.confidence, 0.06);
    assert_eq!(m.currency_symbol, "₹");
    assert!(m.volatility.ends_with('%'));

    let value = serde_json::to_value(&m).unwrap();
    for key in ["currentPrice", "dailyChange", "nextPrediction", "currencySymbol"] {
        assert!(value.get(key).is_some(), "{key}");
    }
}

#[test]
fn test_snapshot_single_daily_row_uses_latest() {
    let intraday = vec![bar(0, 50.0, 0.0)];
    let m = summarize_snapshot(&intraday, &[bar(0, 40.0, 0.0)], dec!(1.0), "£", 60).unwrap();
    assert_eq!(m.daily_change, 0.0);
    assert_eq!(m.next_prediction, "SELL");
    assert_eq!(m.volume, json!("N/A"));
    assert_eq!(m.volatility, "N/A");
    assert_eq!(m.confidence, 0.0);
}

#[test]
fn test_snapshot_requires_bars() {
    let err = summarize_snapshot(&[], &[], dec!(105.0), "₹", 60).unwrap_err();
    assert_eq!(err.to_string(), NO_DATA);
}

#[test]
fn test_volatility_window() {
    let bars: Vec<Bar> = [100.0, 110.0, 99.0, 99.0]
        .iter()
        .enumerate()
        .map(|(i, &c)| bar(i as i64, c, 1.0))
        .collect();
    // returns: 0.1, -0.1, 0.0
    let all = recent_volatility(&bars, 60).unwrap();
    assert!((all - 0.1).abs() < 1e-12);
    // last two returns: -0.1, 0.0
    let tail = recent_volatility(&bars, 2).unwrap();
    assert!((tail - (0.005f64).sqrt()).abs() < 1e-12);
    assert!(recent_volatility(&bars[..2], 60).is_none());
}

// ---- router ----

#[tokio::test]
async fn test_health() {
    let f = fixture(MockMarketDataProvider::new());
    let response = create_router(f.state.clone())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_company_predictions_route() {
    let f = fixture(MockMarketDataProvider::new());
    let (status, body) = get_json(f.state.clone(), "/api/company-predictions?company=AZN").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 40);
    assert!(rows[39]["actual"].is_null());
    assert!(rows[0]["actual"].as_f64().unwrap() > 700.0);
}

#[tokio::test]
async fn test_company_not_found_is_in_band_error() {
    let f = fixture(MockMarketDataProvider::new());
    let (status, body) = get_json(f.state.clone(), "/api/company-predictions?company=NOPE").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "Company data file not found: NOPE.csv"}));

    let (_, body) = get_json(f.state.clone(), "/api/company-predictions?company=..%2Fsecret").await;
    assert!(body["error"].as_str().unwrap().starts_with("Company data file not found"));

    let (_, body) = get_json(f.state.clone(), "/api/company-predictions").await;
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_ftse100_skips_metadata_and_nulls_inf() {
    let f = fixture(MockMarketDataProvider::new());
    let (_, body) = get_json(f.state.clone(), "/api/ftse100").await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Price"], "2024-01-02");
    assert_eq!(rows[0]["Close"], json!(7700.5));
    assert!(rows[1]["rsi"].is_null());
}

#[tokio::test]
async fn test_predictions_routes() {
    let f = fixture(MockMarketDataProvider::new());
    let (_, body) = get_json(f.state.clone(), "/api/predictions").await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[1]["predicted"].is_null());

    let (_, body) = get_json(f.state.clone(), "/api/predictions-last-update").await;
    let stamp = body["lastUpdate"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
}

#[tokio::test]
async fn test_json_passthrough_routes() {
    let f = fixture(MockMarketDataProvider::new());
    let (_, body) = get_json(f.state.clone(), "/api/model-accuracies").await;
    assert_eq!(body[0]["accuracy"], json!(52.1));

    let (_, body) = get_json(f.state.clone(), "/api/quantum-metrics").await;
    assert_eq!(body["circuit_depth"], 27);

    std::fs::remove_file(f.state.config.paths.models_dir().join("quantum_metrics.json")).unwrap();
    let (status, body) = get_json(f.state.clone(), "/api/quantum-metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_live_metrics_falls_back_to_five_minute_bars() {
    let mut market = MockMarketDataProvider::new();
    market
        .expect_bars()
        .with(eq("^FTSE"), eq("1d"), eq("1m"))
        .times(1)
        .returning(|_, _, _| Ok(Vec::new()));
    market
        .expect_bars()
        .with(eq("^FTSE"), eq("5d"), eq("5m"))
        .times(1)
        .returning(|_, _, _| Ok(vec![bar(0, 100.0, 5.0), bar(5, 101.0, 7.0)]));
    market
        .expect_bars()
        .with(eq("^FTSE"), eq("2d"), eq("1d"))
        .times(1)
        .returning(|_, _, _| Ok(vec![bar(0, 99.0, 0.0), bar(1440, 101.0, 0.0)]));

    let f = fixture(market);
    let (_, body) = get_json(f.state.clone(), "/api/live-metrics").await;
    assert_eq!(body["currentPrice"], json!(10605.0));
    assert_eq!(body["dailyChange"], json!(210.0));
    assert_eq!(body["volume"], json!(7));
    assert_eq!(body["nextPrediction"], "BUY");
}

#[tokio::test]
async fn test_live_metrics_no_data() {
    let mut market = MockMarketDataProvider::new();
    market.expect_bars().returning(|_, _, _| Ok(Vec::new()));

    let f = fixture(market);
    let (status, body) = get_json(f.state.clone(), "/api/live-metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": NO_DATA}));
}

#[tokio::test]
async fn test_cors_headers_present() {
    let f = fixture(MockMarketDataProvider::new());
    let response = create_router(f.state.clone())
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
