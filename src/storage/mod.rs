//! Artifact persistence
//!
//! Everything the trainers produce lives as JSON under the models directory.
//! Files are overwritten in place; there is no versioning.

use crate::error::{ForecastError, Result};
use crate::ml::MetricsRecord;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SVM_MODEL_FILE: &str = "svm_model.json";
pub const VQC_WEIGHTS_FILE: &str = "vqc_weights.json";
pub const HARDWARE_WEIGHTS_FILE: &str = "vqc_hardware_weights.json";
/// Rescaling fitted on the hardware subset, applied after `SCALER_FILE`
pub const HARDWARE_SCALER_FILE: &str = "vqc_hardware_scaler.json";
pub const SCALER_FILE: &str = "feature_scaler.json";
pub const SELECTED_FEATURES_FILE: &str = "selected_features.json";
pub const METRICS_FILE: &str = "model_accuracies.json";
pub const QUANTUM_METRICS_FILE: &str = "quantum_metrics.json";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.path(METRICS_FILE)
    }

    /// Write `value` as pretty JSON, creating the directory if needed
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path(name);
        write_pretty(&path, value)?;
        info!("Saved {}", path.display());
        Ok(path)
    }

    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.path(name);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ForecastError::Artifact(format!("cannot read {}: {e}", path.display()))
        })?;
        debug!("Loaded {}", path.display());
        serde_json::from_str(&content)
            .map_err(|e| ForecastError::Artifact(format!("cannot parse {}: {e}", path.display())))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    std::fs::write(path, content)?;
    Ok(())
}

/// Overwrite the scores of every entry whose `model` contains `key`
///
/// Reads and rewrites the whole file; concurrent writers race and the last
/// one wins. Returns how many entries were updated.
pub fn update_metrics_file(path: &Path, key: &str, scores: &MetricsRecord) -> Result<usize> {
    let content = std::fs::read_to_string(path)?;
    let mut records: Vec<MetricsRecord> = serde_json::from_str(&content)?;

    let mut updated = 0;
    for record in records.iter_mut().filter(|r| r.matches(key)) {
        record.update_from(scores);
        updated += 1;
    }

    write_pretty(path, &records)?;
    info!(key, updated, "Metrics updated in {}", path.display());
    Ok(updated)
}
