//! Request handlers
//!
//! Every handler reads its source fresh. Failures are reported in the body as
//! `{"error": "..."}` with status 200, which is what the frontend checks for.

use super::forecast::build_company_forecast;
use super::live::{summarize_snapshot, LiveMetrics, NO_DATA};
use super::AppState;
use crate::data::read_json;
use crate::error::ForecastError;
use crate::storage::{METRICS_FILE, QUANTUM_METRICS_FILE};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

/// Error rendered as an in-band JSON error body
#[derive(Debug)]
pub struct ApiError(ForecastError);

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("Request failed: {}", self.0);
        (StatusCode::OK, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    company: Option<String>,
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Last rows of a company CSV plus a placeholder forecast
pub async fn company_predictions(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> ApiResult<Value> {
    let company = query
        .company
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ForecastError::InvalidData("missing query parameter: company".to_string()))?;

    let records = state.data.company_records(&company)?;
    let forecast = &state.config.forecast;
    let mut rng = match forecast.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let rows = build_company_forecast(&records, forecast, Utc::now().date_naive(), &mut rng);
    Ok(Json(Value::Array(rows.into_iter().map(Value::Object).collect())))
}

/// Circuit report written by the `circuit` command
pub async fn quantum_metrics(State(state): State<AppState>) -> ApiResult<Value> {
    let path = state.config.paths.models_dir().join(QUANTUM_METRICS_FILE);
    Ok(Json(read_json(&path)?))
}

/// Stored accuracy / precision / recall / F1 per model
pub async fn model_accuracies(State(state): State<AppState>) -> ApiResult<Value> {
    let path = state.config.paths.models_dir().join(METRICS_FILE);
    Ok(Json(read_json(&path)?))
}

/// Snapshot of the tracked index from the market data provider
pub async fn live_metrics(State(state): State<AppState>) -> ApiResult<LiveMetrics> {
    let market = &state.config.market;
    let symbol = market.symbol.as_str();

    let mut intraday = state.market.bars(symbol, "1d", "1m").await?;
    if intraday.is_empty() {
        intraday = state.market.bars(symbol, "5d", "5m").await?;
        if intraday.is_empty() {
            warn!("[Live] {}", NO_DATA);
            return Err(ForecastError::MarketData(NO_DATA.to_string()).into());
        }
        info!("[Live] Using 5m interval data ({} bars)", intraday.len());
    } else {
        info!("[Live] Using 1m interval data ({} bars)", intraday.len());
    }
    let daily = state.market.bars(symbol, "2d", "1d").await?;

    let metrics = summarize_snapshot(
        &intraday,
        &daily,
        state.config.forecast.exchange_rate,
        &market.currency_symbol,
        market.volatility_window,
    )?;
    Ok(Json(metrics))
}

/// Feature dataset rows, provider metadata rows skipped
pub async fn ftse100(State(state): State<AppState>) -> ApiResult<Value> {
    let rows = state.data.dataset_records()?;
    Ok(Json(Value::Array(rows.into_iter().map(Value::Object).collect())))
}

/// Precomputed predictions table
pub async fn predictions(State(state): State<AppState>) -> ApiResult<Value> {
    let rows = state.data.prediction_records()?;
    Ok(Json(Value::Array(rows.into_iter().map(Value::Object).collect())))
}

/// When the predictions table was last written
pub async fn predictions_last_update(State(state): State<AppState>) -> ApiResult<Value> {
    let modified = state.data.predictions_modified()?;
    Ok(Json(json!({ "lastUpdate": modified.to_rfc3339() })))
}
