//! Core domain types shared by the pipeline, trainers and API

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Indicator columns every model is trained on, in dataset order
pub const FEATURE_COLUMNS: [&str; 7] = [
    "sma_crossover",
    "price_sma_ratio",
    "rsi",
    "macd",
    "macd_hist",
    "adx",
    "obv",
];

/// Binary label column: 1 when the next close is higher
pub const TARGET_COLUMN: &str = "target";

/// Price columns rescaled by the exchange rate in API responses
pub const PRICE_COLUMNS: [&str; 4] = ["Open", "High", "Low", "Close"];

/// One OHLCV bar as stored in a company or index CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
}

/// Derived indicator values for one date
///
/// Fields are NaN where the indicator is still warming up; `target` is
/// `None` for the last row, whose next close is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    pub sma_crossover: f64,
    pub price_sma_ratio: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_hist: f64,
    pub adx: f64,
    pub obv: f64,
    pub target: Option<u8>,
}

impl FeatureRow {
    /// Feature values in `FEATURE_COLUMNS` order
    pub fn values(&self) -> [f64; 7] {
        [
            self.sma_crossover,
            self.price_sma_ratio,
            self.rsi,
            self.macd,
            self.macd_hist,
            self.adx,
            self.obv,
        ]
    }
}

/// Row-major design matrix with labels, ordered by date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn num_features(&self) -> usize {
        self.columns.len()
    }

    /// Keep only the named columns, in the given order
    pub fn select(&self, names: &[String]) -> Option<Dataset> {
        let indices: Vec<usize> = names
            .iter()
            .map(|n| self.columns.iter().position(|c| c == n))
            .collect::<Option<_>>()?;

        Some(Dataset {
            dates: self.dates.clone(),
            columns: names.to_vec(),
            features: self
                .features
                .iter()
                .map(|row| indices.iter().map(|&i| row[i]).collect())
                .collect(),
            labels: self.labels.clone(),
        })
    }

    /// First `n` rows (or all of them when shorter)
    pub fn head(&self, n: usize) -> Dataset {
        let n = n.min(self.len());
        Dataset {
            dates: self.dates[..n].to_vec(),
            columns: self.columns.clone(),
            features: self.features[..n].to_vec(),
            labels: self.labels[..n].to_vec(),
        }
    }
}

/// Which trained classifier to score with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Svm,
    Vqc,
    /// VQC trained under shot noise with the reduced circuit
    #[serde(rename = "vqc-hardware")]
    VqcHardware,
}

impl ModelKind {
    /// Substring identifying this model's entries in the metrics file
    pub fn metrics_key(&self) -> &'static str {
        match self {
            ModelKind::Svm => "SVM",
            ModelKind::Vqc => "VQC",
            ModelKind::VqcHardware => "IBM",
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = crate::error::ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svm" => Ok(ModelKind::Svm),
            "vqc" => Ok(ModelKind::Vqc),
            "vqc-hardware" | "hardware" | "ibm" => Ok(ModelKind::VqcHardware),
            other => Err(crate::error::ForecastError::InvalidData(format!(
                "unknown model: {other}"
            ))),
        }
    }
}
