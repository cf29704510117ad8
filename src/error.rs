//! Error types for the forecasting service

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors raised by the data store, pipeline, trainers and API
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// A data file the request depends on does not exist
    #[error("{0}")]
    NotFound(String),

    /// Input rows or columns are unusable
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A persisted model artifact is missing or inconsistent
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Training could not proceed
    #[error("Training error: {0}")]
    Training(String),

    /// The market data provider returned nothing usable
    #[error("{0}")]
    MarketData(String),
}
