//! SVM training path

use super::{record_metrics, ModelScore, Prepared};
use crate::config::TrainingConfig;
use crate::error::Result;
use crate::ml::{evaluate, svm};
use crate::storage::{ArtifactStore, SVM_MODEL_FILE};
use crate::types::ModelKind;
use std::time::Instant;
use tracing::info;

/// Fit and score on the same subsamples as the VQC so the two metrics compare
pub fn train_classical(prepared: &Prepared, config: &TrainingConfig, store: &ArtifactStore) -> Result<ModelScore> {
    let train = prepared.train.head(config.vqc.train_samples);
    let test = prepared.test.head(config.vqc.test_samples);
    info!("[SVM] Training polynomial-kernel SVC on {} rows", train.len());
    let start = Instant::now();
    let model = svm::fit(&train.features, &train.labels, &config.svm, config.random_seed)?;
    let seconds = start.elapsed().as_secs_f64();

    let predictions = model.predict(&test.features);
    let report = evaluate(&test.labels, &predictions);
    info!(
        "[SVM] Trained in {:.2}s, {} support vectors, test accuracy {:.4}",
        seconds,
        model.num_support_vectors(),
        report.accuracy
    );

    store.save(SVM_MODEL_FILE, &model)?;
    let key = ModelKind::Svm.metrics_key();
    record_metrics(&store.metrics_path(), key, &report.to_record(key));

    Ok(ModelScore {
        model: "SVM".to_string(),
        report,
        train_samples: train.len(),
        test_samples: test.len(),
        seconds,
    })
}
