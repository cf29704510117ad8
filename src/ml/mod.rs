//! Classical model and evaluation
//!
//! - Polynomial-kernel SVM trained with SMO
//! - Accuracy / weighted precision, recall and F1
//! - Metrics file records

pub mod metrics;
pub mod svm;

#[cfg(test)]
mod tests;

pub use metrics::{evaluate, ClassificationReport, MetricsRecord};
pub use svm::{PolyKernel, SvmModel};
