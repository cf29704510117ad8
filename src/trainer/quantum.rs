//! VQC training paths

use super::{record_metrics, ModelScore, Prepared};
use crate::config::TrainingConfig;
use crate::error::Result;
use crate::features::MinMaxScaler;
use crate::ml::evaluate;
use crate::quantum::{vqc, CircuitConfig, Entanglement, NelderMead, Sampler, ShotSampler, StatevectorSampler};
use crate::storage::{ArtifactStore, HARDWARE_SCALER_FILE, HARDWARE_WEIGHTS_FILE, VQC_WEIGHTS_FILE};
use crate::types::{Dataset, ModelKind};
use std::f64::consts::PI;
use std::time::Instant;
use tracing::info;

struct QuantumRun<'a> {
    name: &'static str,
    circuit: CircuitConfig,
    train: Dataset,
    eval: Dataset,
    max_evals: usize,
    sampler: &'a mut dyn Sampler,
}

fn train_and_score(
    run: QuantumRun<'_>,
    config: &TrainingConfig,
    store: &ArtifactStore,
    weights_file: &str,
    metrics_key: &str,
) -> Result<ModelScore> {
    info!(
        "[{}] {} qubits, feature map reps {}, ansatz reps {}, {} train / {} eval rows",
        run.name,
        run.circuit.num_qubits,
        run.circuit.feature_map_reps,
        run.circuit.ansatz_reps,
        run.train.len(),
        run.eval.len()
    );

    let start = Instant::now();
    let optimizer = NelderMead::with_max_evals(run.max_evals);
    let fit = vqc::fit(
        &run.train.features,
        &run.train.labels,
        run.circuit,
        run.sampler,
        &optimizer,
        config.random_seed,
    )?;
    let seconds = start.elapsed().as_secs_f64();

    let predictions = fit.model.predict(run.sampler, &run.eval.features)?;
    let report = evaluate(&run.eval.labels, &predictions);
    info!(
        "[{}] Trained in {:.2}s ({} evaluations), accuracy {:.4}",
        run.name, seconds, fit.optimization.evaluations, report.accuracy
    );

    store.save(weights_file, &fit.model)?;
    record_metrics(&store.metrics_path(), metrics_key, &report.to_record(metrics_key));

    Ok(ModelScore {
        model: run.name.to_string(),
        report,
        train_samples: run.train.len(),
        test_samples: run.eval.len(),
        seconds,
    })
}

/// Exact simulation on the training subsample, scored on the test subsample
pub fn train_statevector(prepared: &Prepared, config: &TrainingConfig, store: &ArtifactStore) -> Result<ModelScore> {
    let vqc = &config.vqc;
    let mut sampler = StatevectorSampler;
    let run = QuantumRun {
        name: "VQC",
        circuit: CircuitConfig {
            num_qubits: prepared.selected.len(),
            feature_map_reps: vqc.feature_map_reps,
            ansatz_reps: vqc.ansatz_reps,
            entanglement: Entanglement::Linear,
        },
        train: prepared.train.head(vqc.train_samples),
        eval: prepared.test.head(vqc.test_samples),
        max_evals: vqc.max_evals,
        sampler: &mut sampler,
    };
    let key = ModelKind::Vqc.metrics_key();
    train_and_score(run, config, store, VQC_WEIGHTS_FILE, key)
}

/// Reduced circuit under shot noise, scored on the head of its own training rows
///
/// The subset is rescaled onto `[0, pi]` on its own; that scaler is saved
/// next to the weights and applied on top of the shared one at inference.
pub fn train_hardware(prepared: &Prepared, config: &TrainingConfig, store: &ArtifactStore) -> Result<ModelScore> {
    let hw = &config.hardware;
    let mut sampler = ShotSampler::new(hw.shots, config.random_seed);
    info!("[VQC-Hardware] Sampling with {} shots per circuit", sampler.shots());

    let subset = prepared.train.head(hw.samples);
    let rescale = MinMaxScaler::fit(&subset.features, (0.0, PI))?;
    store.save(HARDWARE_SCALER_FILE, &rescale)?;
    let train = Dataset {
        features: rescale.transform(&subset.features)?,
        ..subset
    };
    let run = QuantumRun {
        name: "VQC-Hardware",
        circuit: CircuitConfig {
            num_qubits: prepared.selected.len(),
            feature_map_reps: hw.feature_map_reps,
            ansatz_reps: hw.ansatz_reps,
            entanglement: Entanglement::Linear,
        },
        eval: train.head(hw.eval_samples),
        train,
        max_evals: hw.max_evals,
        sampler: &mut sampler,
    };
    let key = ModelKind::VqcHardware.metrics_key();
    train_and_score(run, config, store, HARDWARE_WEIGHTS_FILE, key)
}
