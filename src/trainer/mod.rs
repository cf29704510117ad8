//! Offline training
//!
//! Pipeline: feature dataset -> clean + chronological split -> ANOVA
//! selection -> [0, pi] scaling -> SVM and/or VQC -> artifacts + metrics.
//! The two model paths share the prepared data and never interact.

pub mod classical;
pub mod quantum;


use crate::config::TrainingConfig;
use crate::data::FeatureFrame;
use crate::error::{ForecastError, Result};
use crate::features::{preprocess_for_ml, select_k_best, MinMaxScaler};
use crate::ml::{ClassificationReport, MetricsRecord};
use crate::storage::{update_metrics_file, ArtifactStore, SCALER_FILE, SELECTED_FEATURES_FILE};
use crate::types::Dataset;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;
use tracing::{info, warn};

pub use classical::train_classical;
pub use quantum::{train_hardware, train_statevector};

/// Where the quantum model is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantumBackend {
    #[default]
    Statevector,
    /// Finite-shot sampling with a reduced circuit, as on real hardware
    Hardware,
}

impl std::str::FromStr for QuantumBackend {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "statevector" | "simulator" => Ok(Self::Statevector),
            "hardware" | "ibm" => Ok(Self::Hardware),
            other => Err(ForecastError::InvalidData(format!("unknown backend: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrainOptions {
    pub backend: QuantumBackend,
    pub skip_svm: bool,
    pub skip_vqc: bool,
}

/// Selected, scaled train/test data shared by both model paths
#[derive(Debug, Clone)]
pub struct Prepared {
    pub selected: Vec<String>,
    pub scaler: MinMaxScaler,
    pub train: Dataset,
    pub test: Dataset,
}

/// Evaluation outcome of one model
#[derive(Debug, Clone)]
pub struct ModelScore {
    pub model: String,
    pub report: ClassificationReport,
    pub train_samples: usize,
    pub test_samples: usize,
    pub seconds: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TrainingSummary {
    pub selected: Vec<String>,
    pub scores: Vec<ModelScore>,
}

/// Select features and fit the scaler on the training split, persisting both
pub fn prepare(frame: FeatureFrame, config: &TrainingConfig, store: &ArtifactStore) -> Result<Prepared> {
    let split = preprocess_for_ml(frame, config.split_ratio)?;
    if split.train.is_empty() || split.test.is_empty() {
        return Err(ForecastError::Training(format!(
            "split produced {} train / {} test rows",
            split.train.len(),
            split.test.len()
        )));
    }
    info!(
        "[Train] {} train rows, {} test rows",
        split.train.len(),
        split.test.len()
    );

    let selected = select_k_best(&split.train, config.num_features)?;
    info!("[Train] Selected top {} features: {:?}", selected.len(), selected);
    store.save(SELECTED_FEATURES_FILE, &selected)?;

    let missing = || ForecastError::Training("selected feature missing from split".to_string());
    let train = split.train.select(&selected).ok_or_else(missing)?;
    let test = split.test.select(&selected).ok_or_else(missing)?;

    let scaler = MinMaxScaler::fit(&train.features, (0.0, PI))?;
    store.save(SCALER_FILE, &scaler)?;

    let train = Dataset {
        features: scaler.transform(&train.features)?,
        ..train
    };
    let test = Dataset {
        features: scaler.transform(&test.features)?,
        ..test
    };

    Ok(Prepared {
        selected,
        scaler,
        train,
        test,
    })
}

/// Push a model's scores into the shared metrics file; failures only warn
pub fn record_metrics(path: &Path, key: &str, record: &MetricsRecord) {
    match update_metrics_file(path, key, record) {
        Ok(0) => warn!("[Train] No '{}' entry in {}", key, path.display()),
        Ok(_) => {}
        Err(e) => warn!("[Train] Error updating {} metrics: {}", key, e),
    }
}

/// Run the requested training paths end to end
pub fn run(
    frame: FeatureFrame,
    config: &TrainingConfig,
    store: &ArtifactStore,
    options: TrainOptions,
) -> Result<TrainingSummary> {
    let prepared = prepare(frame, config, store)?;
    let mut summary = TrainingSummary {
        selected: prepared.selected.clone(),
        scores: Vec::new(),
    };

    if !options.skip_svm {
        summary.scores.push(train_classical(&prepared, config, store)?);
    }
    if !options.skip_vqc {
        let score = match options.backend {
            QuantumBackend::Statevector => train_statevector(&prepared, config, store)?,
            QuantumBackend::Hardware => train_hardware(&prepared, config, store)?,
        };
        summary.scores.push(score);
    }

    for score in &summary.scores {
        info!(
            "[Train] {}: accuracy {:.4} | precision {:.4} | recall {:.4} | f1 {:.4} ({:.2}s)",
            score.model,
            score.report.accuracy,
            score.report.precision,
            score.report.recall,
            score.report.f1,
            score.seconds
        );
    }
    Ok(summary)
}
