//! Variational quantum classifier
//!
//! The measured bitstring is mapped to a class by parity (`index % 2`) and
//! the weights are fit by minimising mean cross-entropy.

use super::circuit::{Circuit, CircuitConfig};
use super::optimizer::{NelderMead, OptimizeResult};
use super::sampler::Sampler;
use crate::error::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::{debug, info};

const NUM_CLASSES: usize = 2;
const PROB_FLOOR: f64 = 1e-10;

/// Collapse a basis distribution into class probabilities by parity
pub fn parity_probabilities(distribution: &[f64]) -> [f64; NUM_CLASSES] {
    let mut out = [0.0; NUM_CLASSES];
    for (index, p) in distribution.iter().enumerate() {
        out[index % NUM_CLASSES] += p;
    }
    out
}

pub fn cross_entropy(probs: &[[f64; NUM_CLASSES]], labels: &[usize]) -> f64 {
    if probs.is_empty() {
        return 0.0;
    }
    probs
        .iter()
        .zip(labels)
        .map(|(p, &y)| -p[y.min(NUM_CLASSES - 1)].max(PROB_FLOOR).ln())
        .sum::<f64>()
        / probs.len() as f64
}

/// Trained weights with the circuit they belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqcModel {
    pub circuit: CircuitConfig,
    pub weights: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_loss: Option<f64>,
}

impl VqcModel {
    pub fn new(circuit: CircuitConfig, weights: Vec<f64>) -> Result<Self> {
        let model = Self {
            circuit,
            weights,
            final_loss: None,
        };
        model.validate()?;
        Ok(model)
    }

    /// Weight count must match the ansatz; deserialized models skip `new`
    pub fn validate(&self) -> Result<()> {
        if self.weights.len() != self.circuit.num_weights() {
            return Err(ForecastError::Artifact(format!(
                "VQC expects {} weights, got {}",
                self.circuit.num_weights(),
                self.weights.len()
            )));
        }
        Ok(())
    }

    pub fn class_probabilities(&self, sampler: &mut dyn Sampler, x: &[f64]) -> Result<[f64; NUM_CLASSES]> {
        self.check_width(x)?;
        let circuit = self.circuit.classifier();
        Ok(parity_probabilities(&sampler.distribution(&circuit, x, &self.weights)))
    }

    pub fn predict_one(&self, sampler: &mut dyn Sampler, x: &[f64]) -> Result<usize> {
        let p = self.class_probabilities(sampler, x)?;
        Ok(usize::from(p[1] > p[0]))
    }

    pub fn predict(&self, sampler: &mut dyn Sampler, rows: &[Vec<f64>]) -> Result<Vec<usize>> {
        rows.iter().map(|x| self.predict_one(sampler, x)).collect()
    }

    fn check_width(&self, x: &[f64]) -> Result<()> {
        if x.len() != self.circuit.num_qubits {
            return Err(ForecastError::InvalidData(format!(
                "VQC encodes {} features, got {}",
                self.circuit.num_qubits,
                x.len()
            )));
        }
        Ok(())
    }
}

fn batch_loss(
    circuit: &Circuit,
    sampler: &mut dyn Sampler,
    rows: &[Vec<f64>],
    labels: &[usize],
    theta: &[f64],
) -> f64 {
    let probs: Vec<[f64; NUM_CLASSES]> = rows
        .iter()
        .map(|x| parity_probabilities(&sampler.distribution(circuit, x, theta)))
        .collect();
    cross_entropy(&probs, labels)
}

/// Training outcome: the model plus the optimiser trace
#[derive(Debug, Clone)]
pub struct VqcFit {
    pub model: VqcModel,
    pub optimization: OptimizeResult,
}

/// Fit weights from a uniform `[0, 2pi)` start
pub fn fit(
    rows: &[Vec<f64>],
    labels: &[usize],
    circuit: CircuitConfig,
    sampler: &mut dyn Sampler,
    optimizer: &NelderMead,
    seed: u64,
) -> Result<VqcFit> {
    if rows.is_empty() || rows.len() != labels.len() {
        return Err(ForecastError::Training(format!(
            "VQC needs matching rows and labels, got {} and {}",
            rows.len(),
            labels.len()
        )));
    }
    if let Some(bad) = rows.iter().find(|r| r.len() != circuit.num_qubits) {
        return Err(ForecastError::Training(format!(
            "VQC encodes {} features, got a row with {}",
            circuit.num_qubits,
            bad.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let initial: Vec<f64> = (0..circuit.num_weights())
        .map(|_| rng.random_range(0.0..TAU))
        .collect();

    let classifier = circuit.classifier();
    info!(
        samples = rows.len(),
        weights = initial.len(),
        sampler = sampler.name(),
        max_evals = optimizer.max_evals,
        "Training VQC"
    );

    let result = optimizer.minimize(
        |theta| {
            let loss = batch_loss(&classifier, sampler, rows, labels, theta);
            debug!(loss, "VQC objective");
            loss
        },
        &initial,
    );

    info!(
        loss = result.fun,
        evaluations = result.evaluations,
        "VQC training finished"
    );

    let mut model = VqcModel::new(circuit, result.x.clone())?;
    model.final_loss = Some(result.fun);
    Ok(VqcFit {
        model,
        optimization: result,
    })
}
