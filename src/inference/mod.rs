//! Inference adapter
//!
//! Loads the persisted selection, scaler and models, projects a named
//! feature row onto the selected features, scales it and scores it.

use crate::error::{ForecastError, Result};
use crate::features::MinMaxScaler;
use crate::ml::SvmModel;
use crate::quantum::{StatevectorSampler, VqcModel};
use crate::storage::{
    ArtifactStore, HARDWARE_SCALER_FILE, HARDWARE_WEIGHTS_FILE, SCALER_FILE, SELECTED_FEATURES_FILE,
    SVM_MODEL_FILE, VQC_WEIGHTS_FILE,
};
use crate::types::ModelKind;
use std::collections::HashMap;
use tracing::{debug, info};

/// A trained model scoring one scaled feature vector
pub trait Classifier: Send + Sync {
    fn predict(&self, x: &[f64]) -> Result<usize>;

    fn name(&self) -> &str;
}

impl Classifier for SvmModel {
    fn predict(&self, x: &[f64]) -> Result<usize> {
        if let Some(sv) = self.support_vectors.first() {
            if sv.len() != x.len() {
                return Err(ForecastError::InvalidData(format!(
                    "SVM expects {} features, got {}",
                    sv.len(),
                    x.len()
                )));
            }
        }
        Ok(self.predict_one(x))
    }

    fn name(&self) -> &str {
        "SVM"
    }
}

impl Classifier for VqcModel {
    fn predict(&self, x: &[f64]) -> Result<usize> {
        self.predict_one(&mut StatevectorSampler, x)
    }

    fn name(&self) -> &str {
        "VQC"
    }
}

/// Hardware-trained VQC; its inputs get the subset rescaling on top of the shared scaler
pub struct HardwareVqc {
    pub rescale: MinMaxScaler,
    pub model: VqcModel,
}

impl Classifier for HardwareVqc {
    fn predict(&self, x: &[f64]) -> Result<usize> {
        let x = self.rescale.transform_row(x)?;
        self.model.predict_one(&mut StatevectorSampler, &x)
    }

    fn name(&self) -> &str {
        "VQC-Hardware"
    }
}

pub struct Predictor {
    selected: Vec<String>,
    scaler: MinMaxScaler,
    models: Vec<(ModelKind, Box<dyn Classifier>)>,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("selected", &self.selected)
            .field("models", &self.models.iter().map(|(k, _)| *k).collect::<Vec<_>>())
            .finish()
    }
}

impl Predictor {
    /// Pair a selection with its scaler; the dimensions must agree
    pub fn new(selected: Vec<String>, scaler: MinMaxScaler) -> Result<Self> {
        if scaler.num_features() != selected.len() {
            return Err(ForecastError::Artifact(format!(
                "scaler has {} features but {} were selected",
                scaler.num_features(),
                selected.len()
            )));
        }
        Ok(Self {
            selected,
            scaler,
            models: Vec::new(),
        })
    }

    pub fn with_model(mut self, kind: ModelKind, model: Box<dyn Classifier>) -> Self {
        self.models.retain(|(k, _)| *k != kind);
        self.models.push((kind, model));
        self
    }

    /// Load selection, scaler and whichever models have been trained
    pub fn load(store: &ArtifactStore) -> Result<Self> {
        let selected: Vec<String> = store.load(SELECTED_FEATURES_FILE)?;
        let scaler: MinMaxScaler = store.load(SCALER_FILE)?;
        let mut predictor = Self::new(selected, scaler)?;

        if store.exists(SVM_MODEL_FILE) {
            let svm: SvmModel = store.load(SVM_MODEL_FILE)?;
            predictor = predictor.with_model(ModelKind::Svm, Box::new(svm));
        }
        if store.exists(VQC_WEIGHTS_FILE) {
            let vqc = predictor.load_vqc(store, VQC_WEIGHTS_FILE)?;
            predictor = predictor.with_model(ModelKind::Vqc, Box::new(vqc));
        }
        if store.exists(HARDWARE_WEIGHTS_FILE) {
            let model = predictor.load_vqc(store, HARDWARE_WEIGHTS_FILE)?;
            let rescale: MinMaxScaler = store.load(HARDWARE_SCALER_FILE)?;
            if rescale.num_features() != predictor.selected.len() {
                return Err(ForecastError::Artifact(format!(
                    "{HARDWARE_SCALER_FILE} has {} features but {} were selected",
                    rescale.num_features(),
                    predictor.selected.len()
                )));
            }
            predictor = predictor.with_model(ModelKind::VqcHardware, Box::new(HardwareVqc { rescale, model }));
        }

        info!(
            "[Inference] Loaded {} features, models: {:?}",
            predictor.selected.len(),
            predictor.models.iter().map(|(_, m)| m.name()).collect::<Vec<_>>()
        );
        Ok(predictor)
    }

    fn load_vqc(&self, store: &ArtifactStore, name: &str) -> Result<VqcModel> {
        let vqc: VqcModel = store.load(name)?;
        vqc.validate()?;
        if vqc.circuit.num_qubits != self.selected.len() {
            return Err(ForecastError::Artifact(format!(
                "{name} has {} qubits but {} features were selected",
                vqc.circuit.num_qubits,
                self.selected.len()
            )));
        }
        Ok(vqc)
    }

    pub fn has_model(&self, kind: ModelKind) -> bool {
        self.models.iter().any(|(k, _)| *k == kind)
    }

    /// Selected features of `row`, in selection order
    pub fn project(&self, row: &HashMap<String, f64>) -> Result<Vec<f64>> {
        self.selected
            .iter()
            .map(|name| {
                row.get(name)
                    .copied()
                    .ok_or_else(|| ForecastError::InvalidData(format!("missing feature: {name}")))
            })
            .collect()
    }

    /// Project and scale `row`
    pub fn prepare(&self, row: &HashMap<String, f64>) -> Result<Vec<f64>> {
        let projected = self.project(row)?;
        self.scaler.transform_row(&projected)
    }

    pub fn predict(&self, kind: ModelKind, row: &HashMap<String, f64>) -> Result<usize> {
        let (_, model) = self
            .models
            .iter()
            .find(|(k, _)| *k == kind)
            .ok_or_else(|| ForecastError::Artifact(format!("no trained {} model", kind.metrics_key())))?;
        let x = self.prepare(row)?;
        let class = model.predict(&x)?;
        debug!(model = model.name(), class, "Scored feature row");
        Ok(class)
    }
}
