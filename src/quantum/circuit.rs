//! Parameterised circuits
//!
//! Gates reference symbolic angles that are bound at simulation time: input
//! features for the ZZ feature map, trainable weights for the ansatz.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Symbolic rotation angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Angle {
    /// `2 * x[i]`
    Feature(usize),
    /// `2 * (pi - x[i]) * (pi - x[j])`
    FeaturePair(usize, usize),
    /// `theta[k]`
    Weight(usize),
}

impl Angle {
    pub fn bind(&self, x: &[f64], theta: &[f64]) -> f64 {
        match *self {
            Angle::Feature(i) => 2.0 * x[i],
            Angle::FeaturePair(i, j) => 2.0 * (PI - x[i]) * (PI - x[j]),
            Angle::Weight(k) => theta[k],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    H(usize),
    /// Phase gate `diag(1, e^{i angle})`
    P(usize, Angle),
    Ry(usize, Angle),
    Cx { control: usize, target: usize },
    Measure(usize),
}

impl Gate {
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::P(..) => "p",
            Gate::Ry(..) => "ry",
            Gate::Cx { .. } => "cx",
            Gate::Measure(_) => "measure",
        }
    }

    fn qubits(&self) -> Vec<usize> {
        match *self {
            Gate::H(q) | Gate::P(q, _) | Gate::Ry(q, _) | Gate::Measure(q) => vec![q],
            Gate::Cx { control, target } => vec![control, target],
        }
    }
}

/// Entangling pattern between neighbouring blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Entanglement {
    #[default]
    Linear,
    Full,
}

impl Entanglement {
    pub fn pairs(&self, num_qubits: usize) -> Vec<(usize, usize)> {
        match self {
            Entanglement::Linear => (0..num_qubits.saturating_sub(1)).map(|i| (i, i + 1)).collect(),
            Entanglement::Full => (0..num_qubits)
                .flat_map(|i| (i + 1..num_qubits).map(move |j| (i, j)))
                .collect(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Entanglement::Linear => "linear",
            Entanglement::Full => "full",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Circuit {
    pub num_qubits: usize,
    pub gates: Vec<Gate>,
}

impl Circuit {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
        }
    }

    pub fn push(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    /// Append another circuit on the same register
    pub fn compose(mut self, other: &Circuit) -> Self {
        self.gates.extend_from_slice(&other.gates);
        self
    }

    pub fn measure_all(mut self) -> Self {
        for q in 0..self.num_qubits {
            self.gates.push(Gate::Measure(q));
        }
        self
    }

    /// Longest chain of gates along any qubit
    pub fn depth(&self) -> usize {
        let mut level = vec![0usize; self.num_qubits];
        for gate in &self.gates {
            let qubits = gate.qubits();
            let next = qubits.iter().map(|&q| level[q]).max().unwrap_or(0) + 1;
            for q in qubits {
                level[q] = next;
            }
        }
        level.into_iter().max().unwrap_or(0)
    }

    pub fn num_feature_parameters(&self) -> usize {
        self.max_index(|a| match a {
            Angle::Feature(i) => Some(i),
            Angle::FeaturePair(i, j) => Some(i.max(j)),
            Angle::Weight(_) => None,
        })
    }

    pub fn num_weight_parameters(&self) -> usize {
        self.max_index(|a| match a {
            Angle::Weight(k) => Some(k),
            _ => None,
        })
    }

    fn max_index(&self, pick: impl Fn(Angle) -> Option<usize>) -> usize {
        self.gates
            .iter()
            .filter_map(|g| match *g {
                Gate::P(_, a) | Gate::Ry(_, a) => pick(a),
                _ => None,
            })
            .max()
            .map_or(0, |m| m + 1)
    }

    pub fn num_clbits(&self) -> usize {
        self.gates
            .iter()
            .filter(|g| matches!(g, Gate::Measure(_)))
            .count()
    }

    pub fn gate_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for gate in &self.gates {
            *counts.entry(gate.name().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Second-order Pauli-Z evolution encoding of `num_qubits` features
pub fn zz_feature_map(num_qubits: usize, reps: usize, entanglement: Entanglement) -> Circuit {
    let mut circuit = Circuit::new(num_qubits);
    for _ in 0..reps {
        for q in 0..num_qubits {
            circuit.push(Gate::H(q));
            circuit.push(Gate::P(q, Angle::Feature(q)));
        }
        for (i, j) in entanglement.pairs(num_qubits) {
            circuit.push(Gate::Cx { control: i, target: j });
            circuit.push(Gate::P(j, Angle::FeaturePair(i, j)));
            circuit.push(Gate::Cx { control: i, target: j });
        }
    }
    circuit
}

/// RY layers interleaved with CX entanglers; `(reps + 1) * num_qubits` weights
pub fn real_amplitudes(num_qubits: usize, reps: usize, entanglement: Entanglement) -> Circuit {
    let mut circuit = Circuit::new(num_qubits);
    let mut next = 0;
    let mut rotation_layer = |circuit: &mut Circuit| {
        for q in 0..num_qubits {
            circuit.push(Gate::Ry(q, Angle::Weight(next)));
            next += 1;
        }
    };
    rotation_layer(&mut circuit);
    for _ in 0..reps {
        for (i, j) in entanglement.pairs(num_qubits) {
            circuit.push(Gate::Cx { control: i, target: j });
        }
        rotation_layer(&mut circuit);
    }
    circuit
}

/// Shape of a feature map + ansatz classifier circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitConfig {
    pub num_qubits: usize,
    pub feature_map_reps: usize,
    pub ansatz_reps: usize,
    #[serde(default)]
    pub entanglement: Entanglement,
}

impl CircuitConfig {
    pub fn feature_map(&self) -> Circuit {
        zz_feature_map(self.num_qubits, self.feature_map_reps, self.entanglement)
    }

    pub fn ansatz(&self) -> Circuit {
        real_amplitudes(self.num_qubits, self.ansatz_reps, self.entanglement)
    }

    /// Feature map followed by the ansatz, unmeasured
    pub fn classifier(&self) -> Circuit {
        self.feature_map().compose(&self.ansatz())
    }

    pub fn num_weights(&self) -> usize {
        (self.ansatz_reps + 1) * self.num_qubits
    }

    pub fn summary(&self) -> CircuitSummary {
        let feature_map = self.feature_map();
        let ansatz = self.ansatz();
        let unmeasured = feature_map.clone().compose(&ansatz);
        let complete = unmeasured.clone().measure_all();

        CircuitSummary {
            circuit_depth: complete.depth(),
            depth: unmeasured.depth(),
            qubits: self.num_qubits,
            reps: self.ansatz_reps,
            entanglement: self.entanglement.as_str().to_string(),
            feature_map: "ZZFeatureMap".to_string(),
            feature_map_reps: self.feature_map_reps,
            feature_map_depth: feature_map.depth(),
            ansatz: "RealAmplitudes".to_string(),
            ansatz_reps: self.ansatz_reps,
            ansatz_depth: ansatz.depth(),
            parameters: complete.num_feature_parameters() + complete.num_weight_parameters(),
            trainable_parameters: complete.num_weight_parameters(),
            gates: complete.gates.len(),
            gate_counts: complete.gate_counts(),
            classical_bits: complete.num_clbits(),
            state_space: 1usize << self.num_qubits,
        }
    }
}

/// Structural report served by `/api/quantum-metrics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitSummary {
    /// Depth of the complete circuit including measurements
    pub circuit_depth: usize,
    /// Depth of feature map + ansatz
    pub depth: usize,
    pub qubits: usize,
    pub reps: usize,
    pub entanglement: String,
    pub feature_map: String,
    pub feature_map_reps: usize,
    pub feature_map_depth: usize,
    pub ansatz: String,
    pub ansatz_reps: usize,
    pub ansatz_depth: usize,
    pub parameters: usize,
    pub trainable_parameters: usize,
    pub gates: usize,
    pub gate_counts: BTreeMap<String, usize>,
    pub classical_bits: usize,
    pub state_space: usize,
}
