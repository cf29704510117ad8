//! Market data clients
//!
//! The API layer only sees [`MarketDataProvider`]; the Yahoo chart client is
//! the production implementation.

mod yahoo;

pub use yahoo::YahooClient;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Source of historical bars
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Bars over `range` (e.g. `1d`, `5d`) at `interval` (e.g. `1m`, `1d`), oldest first
    async fn bars(&self, symbol: &str, range: &str, interval: &str) -> Result<Vec<Bar>>;
}
