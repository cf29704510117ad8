//! Exact statevector simulation
//!
//! Basis index bit `q` holds qubit `q` (qubit 0 is the least significant bit).

use super::circuit::{Circuit, Gate};
use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    /// `|0...0>`
    pub fn zero(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self { amplitudes }
    }

    pub fn apply(&mut self, gate: &Gate, x: &[f64], theta: &[f64]) {
        match *gate {
            Gate::H(q) => self.single(q, |a, b| {
                (
                    (a + b) * FRAC_1_SQRT_2,
                    (a - b) * FRAC_1_SQRT_2,
                )
            }),
            Gate::P(q, angle) => {
                let phase = Complex64::from_polar(1.0, angle.bind(x, theta));
                self.single(q, |a, b| (a, b * phase))
            }
            Gate::Ry(q, angle) => {
                let half = angle.bind(x, theta) / 2.0;
                let (s, c) = half.sin_cos();
                self.single(q, |a, b| (a * c - b * s, a * s + b * c))
            }
            Gate::Cx { control, target } => {
                let (cm, tm) = (1usize << control, 1usize << target);
                for i in 0..self.amplitudes.len() {
                    if i & cm != 0 && i & tm == 0 {
                        self.amplitudes.swap(i, i | tm);
                    }
                }
            }
            // measurement is read out from the final distribution
            Gate::Measure(_) => {}
        }
    }

    fn single(&mut self, qubit: usize, op: impl Fn(Complex64, Complex64) -> (Complex64, Complex64)) {
        let mask = 1usize << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let (a, b) = op(self.amplitudes[i], self.amplitudes[i | mask]);
                self.amplitudes[i] = a;
                self.amplitudes[i | mask] = b;
            }
        }
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }
}

/// Run `circuit` from `|0...0>` with bound inputs and weights
pub fn simulate(circuit: &Circuit, x: &[f64], theta: &[f64]) -> Statevector {
    let mut state = Statevector::zero(circuit.num_qubits);
    for gate in &circuit.gates {
        state.apply(gate, x, theta);
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::circuit::Angle;
    use std::f64::consts::PI;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_hadamard_superposition() {
        let mut circuit = Circuit::new(1);
        circuit.push(Gate::H(0));
        let probs = simulate(&circuit, &[], &[]).probabilities();
        assert!(approx(probs[0], 0.5) && approx(probs[1], 0.5));
    }

    #[test]
    fn test_qubit_zero_is_lsb() {
        let mut circuit = Circuit::new(2);
        circuit.push(Gate::Ry(0, Angle::Weight(0)));
        let probs = simulate(&circuit, &[], &[PI]).probabilities();
        // |01> in big-endian notation, index 1
        assert!(approx(probs[1], 1.0));
    }

    #[test]
    fn test_bell_state() {
        let mut circuit = Circuit::new(2);
        circuit.push(Gate::H(0));
        circuit.push(Gate::Cx { control: 0, target: 1 });
        let probs = simulate(&circuit, &[], &[]).probabilities();
        assert!(approx(probs[0], 0.5));
        assert!(approx(probs[3], 0.5));
        assert!(approx(probs[1] + probs[2], 0.0));
    }

    #[test]
    fn test_phase_interference() {
        // H P(pi) H flips |0> to |1>
        let mut circuit = Circuit::new(1);
        circuit.push(Gate::H(0));
        circuit.push(Gate::P(0, Angle::Feature(0)));
        circuit.push(Gate::H(0));
        let probs = simulate(&circuit, &[PI / 2.0], &[]).probabilities();
        assert!(approx(probs[1], 1.0));
    }

    #[test]
    fn test_norm_preserved() {
        let config = crate::quantum::CircuitConfig {
            num_qubits: 3,
            feature_map_reps: 2,
            ansatz_reps: 3,
            entanglement: Default::default(),
        };
        let theta: Vec<f64> = (0..config.num_weights()).map(|k| k as f64 * 0.3).collect();
        let probs = simulate(&config.classifier(), &[0.4, 1.7, 2.9], &theta).probabilities();
        assert!(approx(probs.iter().sum::<f64>(), 1.0));
    }
}
