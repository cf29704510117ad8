//! Configuration management
//!
//! Settings are layered: serde defaults, then an optional TOML file, then
//! `QF__`-prefixed environment variables (e.g. `QF__SERVER__PORT=9000`).

use crate::error::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

impl Config {
    /// Load configuration from an optional file plus environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("QF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Filesystem layout for data files and model artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_models_dir")]
    pub models_dir: String,
    #[serde(default = "default_dataset_file")]
    pub dataset_file: String,
    #[serde(default = "default_predictions_file")]
    pub predictions_file: String,
    /// Rows directly under the header that carry provider metadata
    #[serde(default = "default_metadata_rows")]
    pub dataset_metadata_rows: usize,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_models_dir() -> String {
    "models".to_string()
}

fn default_dataset_file() -> String {
    "dataset.csv".to_string()
}

fn default_predictions_file() -> String {
    "predictions.csv".to_string()
}

fn default_metadata_rows() -> usize {
    2
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            models_dir: default_models_dir(),
            dataset_file: default_dataset_file(),
            predictions_file: default_predictions_file(),
            dataset_metadata_rows: default_metadata_rows(),
        }
    }
}

impl PathsConfig {
    /// Data directory with `~` expanded
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).into_owned())
    }

    /// Models directory with `~` expanded
    pub fn models_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.models_dir).into_owned())
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir().join(&self.dataset_file)
    }

    pub fn predictions_path(&self) -> PathBuf {
        self.data_dir().join(&self.predictions_file)
    }
}

/// Synthetic forecast and currency settings for the company endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Multiplier applied to every currency value (GBP -> INR)
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: Decimal,
    #[serde(default = "default_history_rows")]
    pub history_rows: usize,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Close used when the last historical row has none
    #[serde(default = "default_fallback_close")]
    pub fallback_close: f64,
    #[serde(default = "default_vqc_noise")]
    pub vqc_noise: f64,
    #[serde(default = "default_svm_noise")]
    pub svm_noise: f64,
    /// Fixed RNG seed; unset draws fresh entropy per request
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_exchange_rate() -> Decimal {
    dec!(105.0)
}

fn default_history_rows() -> usize {
    30
}

fn default_horizon_days() -> u32 {
    10
}

fn default_fallback_close() -> f64 {
    100.0
}

fn default_vqc_noise() -> f64 {
    0.01
}

fn default_svm_noise() -> f64 {
    0.005
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            exchange_rate: default_exchange_rate(),
            history_rows: default_history_rows(),
            horizon_days: default_horizon_days(),
            fallback_close: default_fallback_close(),
            vqc_noise: default_vqc_noise(),
            svm_noise: default_svm_noise(),
            seed: None,
        }
    }
}

/// External market data provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_market_url")]
    pub base_url: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Number of trailing returns used for volatility
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,
}

fn default_market_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_symbol() -> String {
    "^FTSE".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_volatility_window() -> usize {
    60
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_market_url(),
            symbol: default_symbol(),
            timeout_secs: default_timeout_secs(),
            currency_symbol: default_currency_symbol(),
            volatility_window: default_volatility_window(),
        }
    }
}

/// Offline training settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_split_ratio")]
    pub split_ratio: f64,
    /// Features kept by ANOVA selection (one qubit each)
    #[serde(default = "default_num_features")]
    pub num_features: usize,
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
    #[serde(default)]
    pub svm: SvmConfig,
    #[serde(default)]
    pub vqc: VqcConfig,
    #[serde(default)]
    pub hardware: HardwareConfig,
}

fn default_split_ratio() -> f64 {
    0.8
}

fn default_num_features() -> usize {
    3
}

fn default_random_seed() -> u64 {
    42
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            split_ratio: default_split_ratio(),
            num_features: default_num_features(),
            random_seed: default_random_seed(),
            svm: SvmConfig::default(),
            vqc: VqcConfig::default(),
            hardware: HardwareConfig::default(),
        }
    }
}

/// Polynomial-kernel SVC settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmConfig {
    #[serde(default = "default_degree")]
    pub degree: i32,
    #[serde(default = "default_c")]
    pub c: f64,
    #[serde(default)]
    pub coef0: f64,
    #[serde(default = "default_tol")]
    pub tol: f64,
    /// Consecutive sweeps without alpha changes before SMO stops
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
}

fn default_degree() -> i32 {
    3
}

fn default_c() -> f64 {
    1.0
}

fn default_tol() -> f64 {
    1e-3
}

fn default_max_passes() -> usize {
    5
}

fn default_max_iter() -> usize {
    200
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            degree: default_degree(),
            c: default_c(),
            coef0: 0.0,
            tol: default_tol(),
            max_passes: default_max_passes(),
            max_iter: default_max_iter(),
        }
    }
}

/// Statevector-simulated VQC settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VqcConfig {
    #[serde(default = "default_fm_reps")]
    pub feature_map_reps: usize,
    #[serde(default = "default_ansatz_reps")]
    pub ansatz_reps: usize,
    #[serde(default = "default_train_samples")]
    pub train_samples: usize,
    #[serde(default = "default_test_samples")]
    pub test_samples: usize,
    #[serde(default = "default_vqc_max_evals")]
    pub max_evals: usize,
}

fn default_fm_reps() -> usize {
    2
}

fn default_ansatz_reps() -> usize {
    3
}

fn default_train_samples() -> usize {
    300
}

fn default_test_samples() -> usize {
    50
}

fn default_vqc_max_evals() -> usize {
    100
}

impl Default for VqcConfig {
    fn default() -> Self {
        Self {
            feature_map_reps: default_fm_reps(),
            ansatz_reps: default_ansatz_reps(),
            train_samples: default_train_samples(),
            test_samples: default_test_samples(),
            max_evals: default_vqc_max_evals(),
        }
    }
}

/// Shot-sampled ("hardware-style") VQC settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareConfig {
    #[serde(default = "default_hw_reps")]
    pub feature_map_reps: usize,
    #[serde(default = "default_hw_reps")]
    pub ansatz_reps: usize,
    #[serde(default = "default_hw_samples")]
    pub samples: usize,
    #[serde(default = "default_hw_eval_samples")]
    pub eval_samples: usize,
    #[serde(default = "default_hw_max_evals")]
    pub max_evals: usize,
    #[serde(default = "default_shots")]
    pub shots: usize,
}

fn default_hw_reps() -> usize {
    1
}

fn default_hw_samples() -> usize {
    20
}

fn default_hw_eval_samples() -> usize {
    10
}

fn default_hw_max_evals() -> usize {
    10
}

fn default_shots() -> usize {
    1024
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            feature_map_reps: default_hw_reps(),
            ansatz_reps: default_hw_reps(),
            samples: default_hw_samples(),
            eval_samples: default_hw_eval_samples(),
            max_evals: default_hw_max_evals(),
            shots: default_shots(),
        }
    }
}
