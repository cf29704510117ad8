//! Quantum classifier
//!
//! Small, self-contained pieces used by the VQC trainer:
//! - ZZ feature map / RealAmplitudes circuit construction and reporting
//! - Exact statevector simulation and finite-shot sampling
//! - Nelder-Mead optimiser
//! - Parity-interpreted classifier with cross-entropy training

pub mod circuit;
pub mod optimizer;
pub mod sampler;
pub mod statevector;
pub mod vqc;


pub use circuit::{CircuitConfig, CircuitSummary, Entanglement};
pub use optimizer::{NelderMead, OptimizeResult};
pub use sampler::{Sampler, ShotSampler, StatevectorSampler};
pub use vqc::{VqcFit, VqcModel};
