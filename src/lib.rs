//! Quantum Forecast
//!
//! Stock-movement classification with a classical SVM and a variational
//! quantum classifier, served to a dashboard over a small HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! Serving:   API (axum) → Data Store (CSV/JSON) → response
//!                       → Market Data (Yahoo) → live snapshot
//!
//! Training:  Data Store → Feature Pipeline → Trainer ─┬→ SVM (SMO)
//!                                                      └→ VQC (statevector / shots)
//!                                                           ↓
//!                                        Artifacts (JSON) → Inference
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod inference;
pub mod ml;
pub mod quantum;
pub mod storage;
pub mod trainer;
pub mod types;
pub mod utils;
