//! Polynomial-kernel support vector classifier
//!
//! Binary C-SVC trained with sequential minimal optimization. Kernel
//! parameters follow the usual defaults: `gamma = 1 / (n_features * var(X))`,
//! `coef0 = 0`, `degree = 3`.

use crate::config::SvmConfig;
use crate::error::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const ALPHA_EPS: f64 = 1e-8;

/// `(gamma * <a, b> + coef0) ^ degree`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyKernel {
    pub gamma: f64,
    pub coef0: f64,
    pub degree: i32,
}

impl PolyKernel {
    /// Kernel with `gamma = "scale"` for the given training matrix
    pub fn scaled(rows: &[Vec<f64>], coef0: f64, degree: i32) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(1).max(1);
        let count = (rows.len() * width) as f64;
        let gamma = if rows.is_empty() {
            1.0
        } else {
            let mean = rows.iter().flatten().sum::<f64>() / count;
            let var = rows.iter().flatten().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
            if var > 0.0 {
                1.0 / (width as f64 * var)
            } else {
                1.0
            }
        };
        Self { gamma, coef0, degree }
    }

    pub fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
        let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        (self.gamma * dot + self.coef0).powi(self.degree)
    }
}

/// Trained classifier: support vectors with their signed dual coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmModel {
    pub kernel: PolyKernel,
    /// Sorted class labels; a single entry means every prediction is that class
    pub classes: Vec<usize>,
    pub support_vectors: Vec<Vec<f64>>,
    /// `alpha_i * y_i` for each support vector
    pub dual_coef: Vec<f64>,
    pub intercept: f64,
}

impl SvmModel {
    /// Signed distance from the separating surface; positive favours `classes[1]`
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.support_vectors
            .iter()
            .zip(&self.dual_coef)
            .map(|(sv, coef)| coef * self.kernel.apply(sv, x))
            .sum::<f64>()
            + self.intercept
    }

    pub fn predict_one(&self, x: &[f64]) -> usize {
        match self.classes.as_slice() {
            [only] => *only,
            [negative, positive, ..] => {
                if self.decision_function(x) > 0.0 {
                    *positive
                } else {
                    *negative
                }
            }
            [] => 0,
        }
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<usize> {
        rows.iter().map(|r| self.predict_one(r)).collect()
    }

    pub fn num_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }
}

/// Working state of one SMO run
struct Smo<'a> {
    x: &'a [Vec<f64>],
    y: Vec<f64>,
    alphas: Vec<f64>,
    errors: Vec<f64>,
    b: f64,
    c: f64,
    kernel: PolyKernel,
}

impl Smo<'_> {
    fn k(&self, i: usize, j: usize) -> f64 {
        self.kernel.apply(&self.x[i], &self.x[j])
    }

    fn violates_kkt(&self, i: usize, tol: f64) -> bool {
        let r = self.y[i] * self.errors[i];
        (r < -tol && self.alphas[i] < self.c) || (r > tol && self.alphas[i] > 0.0)
    }

    /// Partner maximising |E_i - E_j|
    fn second_choice(&self, i: usize) -> Option<usize> {
        let ei = self.errors[i];
        (0..self.x.len())
            .filter(|&j| j != i)
            .max_by(|&a, &b| {
                (ei - self.errors[a])
                    .abs()
                    .total_cmp(&(ei - self.errors[b]).abs())
            })
    }

    fn take_step(&mut self, i: usize, j: usize) -> bool {
        if i == j {
            return false;
        }
        let (ai, aj) = (self.alphas[i], self.alphas[j]);
        let (yi, yj) = (self.y[i], self.y[j]);
        let (ei, ej) = (self.errors[i], self.errors[j]);

        let (low, high) = if yi != yj {
            ((aj - ai).max(0.0), (self.c + aj - ai).min(self.c))
        } else {
            ((ai + aj - self.c).max(0.0), (ai + aj).min(self.c))
        };
        if high - low < 1e-12 {
            return false;
        }

        let kii = self.k(i, i);
        let kjj = self.k(j, j);
        let kij = self.k(i, j);
        let eta = 2.0 * kij - kii - kjj;
        if eta >= 0.0 {
            return false;
        }

        let aj_new = (aj - yj * (ei - ej) / eta).clamp(low, high);
        if (aj_new - aj).abs() < 1e-5 {
            return false;
        }
        let ai_new = ai + yi * yj * (aj - aj_new);

        let b1 = self.b - ei - yi * (ai_new - ai) * kii - yj * (aj_new - aj) * kij;
        let b2 = self.b - ej - yi * (ai_new - ai) * kij - yj * (aj_new - aj) * kjj;
        let b_new = if ai_new > 0.0 && ai_new < self.c {
            b1
        } else if aj_new > 0.0 && aj_new < self.c {
            b2
        } else {
            (b1 + b2) / 2.0
        };

        let di = yi * (ai_new - ai);
        let dj = yj * (aj_new - aj);
        let db = b_new - self.b;
        for k in 0..self.x.len() {
            let delta = di * self.k(i, k) + dj * self.k(j, k) + db;
            self.errors[k] += delta;
        }

        self.alphas[i] = ai_new;
        self.alphas[j] = aj_new;
        self.b = b_new;
        true
    }
}

/// Fit a polynomial-kernel SVC on row-major features
pub fn fit(rows: &[Vec<f64>], labels: &[usize], config: &SvmConfig, seed: u64) -> Result<SvmModel> {
    if rows.is_empty() || rows.len() != labels.len() {
        return Err(ForecastError::Training(format!(
            "SVM needs matching rows and labels, got {} and {}",
            rows.len(),
            labels.len()
        )));
    }

    let mut classes: Vec<usize> = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();
    if classes.len() > 2 {
        return Err(ForecastError::Training(format!(
            "SVM is binary, found {} classes",
            classes.len()
        )));
    }

    let kernel = PolyKernel::scaled(rows, config.coef0, config.degree);
    if classes.len() == 1 {
        info!("Only class {} present, SVM degenerates to a constant", classes[0]);
        return Ok(SvmModel {
            kernel,
            classes,
            support_vectors: Vec::new(),
            dual_coef: Vec::new(),
            intercept: 0.0,
        });
    }

    let y: Vec<f64> = labels
        .iter()
        .map(|&l| if l == classes[1] { 1.0 } else { -1.0 })
        .collect();
    let mut smo = Smo {
        x: rows,
        errors: y.iter().map(|v| -v).collect(),
        y,
        alphas: vec![0.0; rows.len()],
        b: 0.0,
        c: config.c,
        kernel,
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let n = rows.len();
    let mut passes = 0;
    let mut sweeps = 0;
    while passes < config.max_passes && sweeps < config.max_iter {
        let mut changed = 0;
        for i in 0..n {
            if !smo.violates_kkt(i, config.tol) {
                continue;
            }
            let heuristic = smo.second_choice(i);
            let random = rng.random_range(0..n);
            if heuristic.is_some_and(|j| smo.take_step(i, j)) || smo.take_step(i, random) {
                changed += 1;
            }
        }
        sweeps += 1;
        passes = if changed == 0 { passes + 1 } else { 0 };
        debug!(sweep = sweeps, changed, "SMO sweep");
    }

    let (support_vectors, dual_coef): (Vec<Vec<f64>>, Vec<f64>) = smo
        .alphas
        .iter()
        .enumerate()
        .filter(|(_, &a)| a > ALPHA_EPS)
        .map(|(i, &a)| (rows[i].clone(), a * smo.y[i]))
        .unzip();

    info!(
        support_vectors = support_vectors.len(),
        sweeps, "SVM (poly) converged"
    );

    Ok(SvmModel {
        kernel: smo.kernel,
        classes,
        support_vectors,
        dual_coef,
        intercept: smo.b,
    })
}
