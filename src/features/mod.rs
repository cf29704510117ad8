//! Feature pipeline
//!
//! Turns price history into model-ready matrices:
//! - Indicator derivation from OHLCV bars
//! - Gap filling (median / percentile) and chronological split
//! - ANOVA F-test feature selection
//! - Min-max scaling onto the quantum encoding range

pub mod indicators;
pub mod pipeline;
pub mod scaler;
pub mod selection;

#[cfg(test)]
mod tests;

pub use indicators::build_feature_rows;
pub use pipeline::{chronological_split, clean_frame, preprocess_for_ml, to_dataset, CleanReport, Split};
pub use scaler::MinMaxScaler;
pub use selection::{f_classif, select_k_best};
