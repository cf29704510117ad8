//! Measurement samplers
//!
//! Both samplers return a quasi-distribution over basis states. The exact one
//! reads probabilities off the statevector; the shot sampler draws a finite
//! number of measurements from it, as a hardware backend would.

use super::circuit::Circuit;
use super::statevector::simulate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait Sampler {
    fn distribution(&mut self, circuit: &Circuit, x: &[f64], theta: &[f64]) -> Vec<f64>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatevectorSampler;

impl Sampler for StatevectorSampler {
    fn distribution(&mut self, circuit: &Circuit, x: &[f64], theta: &[f64]) -> Vec<f64> {
        simulate(circuit, x, theta).probabilities()
    }

    fn name(&self) -> &'static str {
        "statevector"
    }
}

/// Finite-shot estimates of the output distribution
#[derive(Debug, Clone)]
pub struct ShotSampler {
    shots: usize,
    rng: StdRng,
}

impl ShotSampler {
    pub fn new(shots: usize, seed: u64) -> Self {
        Self {
            shots: shots.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn shots(&self) -> usize {
        self.shots
    }

    fn draw(&mut self, cumulative: &[f64]) -> usize {
        let total = cumulative.last().copied().unwrap_or(0.0);
        let u = self.rng.random::<f64>() * total;
        cumulative
            .iter()
            .position(|&c| u < c)
            .unwrap_or(cumulative.len().saturating_sub(1))
    }
}

impl Sampler for ShotSampler {
    fn distribution(&mut self, circuit: &Circuit, x: &[f64], theta: &[f64]) -> Vec<f64> {
        let probs = simulate(circuit, x, theta).probabilities();
        let cumulative: Vec<f64> = probs
            .iter()
            .scan(0.0, |acc, p| {
                *acc += p;
                Some(*acc)
            })
            .collect();

        let mut counts = vec![0usize; probs.len()];
        for _ in 0..self.shots {
            counts[self.draw(&cumulative)] += 1;
        }
        counts
            .into_iter()
            .map(|c| c as f64 / self.shots as f64)
            .collect()
    }

    fn name(&self) -> &'static str {
        "shots"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::circuit::Gate;

    fn plus_state() -> Circuit {
        let mut circuit = Circuit::new(1);
        circuit.push(Gate::H(0));
        circuit
    }

    #[test]
    fn test_statevector_sampler_is_exact() {
        let dist = StatevectorSampler.distribution(&plus_state(), &[], &[]);
        assert!((dist[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_shot_sampler_estimates() {
        let mut sampler = ShotSampler::new(1024, 42);
        let dist = sampler.distribution(&plus_state(), &[], &[]);
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((dist[0] - 0.5).abs() < 0.1);
        // frequencies are multiples of 1 / shots
        assert_eq!((dist[0] * 1024.0).fract(), 0.0);
    }

    #[test]
    fn test_shot_sampler_deterministic_state() {
        let mut sampler = ShotSampler::new(100, 1);
        let dist = sampler.distribution(&Circuit::new(2), &[], &[]);
        assert_eq!(dist, vec![1.0, 0.0, 0.0, 0.0]);
    }
}
