//! Derivative-free minimisation (Nelder-Mead simplex)

use tracing::debug;

const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeResult {
    pub x: Vec<f64>,
    pub fun: f64,
    pub evaluations: usize,
    /// Best objective value after each iteration
    pub history: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMead {
    pub max_evals: usize,
    /// Offset of the initial simplex vertices along each axis
    pub initial_step: f64,
    /// Stop once the simplex value spread falls below this
    pub fatol: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_evals: 100,
            initial_step: 1.0,
            fatol: 1e-8,
        }
    }
}

impl NelderMead {
    pub fn with_max_evals(max_evals: usize) -> Self {
        Self {
            max_evals,
            ..Self::default()
        }
    }

    pub fn minimize(&self, mut f: impl FnMut(&[f64]) -> f64, x0: &[f64]) -> OptimizeResult {
        let n = x0.len();
        let mut evals = 0;
        let mut eval = |x: &[f64], evals: &mut usize| {
            *evals += 1;
            let v = f(x);
            if v.is_nan() {
                f64::INFINITY
            } else {
                v
            }
        };

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        let f0 = eval(x0, &mut evals);
        simplex.push((x0.to_vec(), f0));
        for i in 0..n {
            if evals >= self.max_evals {
                break;
            }
            let mut v = x0.to_vec();
            v[i] += self.initial_step;
            let fv = eval(&v, &mut evals);
            simplex.push((v, fv));
        }

        let mut history = Vec::new();
        while evals < self.max_evals && simplex.len() == n + 1 && n > 0 {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
            history.push(simplex[0].1);
            if (simplex[n].1 - simplex[0].1).abs() < self.fatol {
                break;
            }

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|(v, _)| v[j]).sum::<f64>() / n as f64)
                .collect();
            let along = |coef: f64, worst: &[f64]| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(worst)
                    .map(|(c, w)| c + coef * (w - c))
                    .collect()
            };

            let worst = simplex[n].0.clone();
            let reflected = along(-ALPHA, &worst);
            let fr = eval(&reflected, &mut evals);

            if fr < simplex[0].1 {
                if evals >= self.max_evals {
                    simplex[n] = (reflected, fr);
                    break;
                }
                let expanded = along(-GAMMA, &worst);
                let fe = eval(&expanded, &mut evals);
                simplex[n] = if fe < fr { (expanded, fe) } else { (reflected, fr) };
            } else if fr < simplex[n - 1].1 {
                simplex[n] = (reflected, fr);
            } else {
                if evals >= self.max_evals {
                    break;
                }
                let (contracted, fc) = if fr < simplex[n].1 {
                    let c = along(-RHO, &worst);
                    let fc = eval(&c, &mut evals);
                    (c, fc)
                } else {
                    let c = along(RHO, &worst);
                    let fc = eval(&c, &mut evals);
                    (c, fc)
                };
                if fc < fr.min(simplex[n].1) {
                    simplex[n] = (contracted, fc);
                } else {
                    // shrink towards the best vertex
                    let best = simplex[0].0.clone();
                    for vertex in simplex.iter_mut().skip(1) {
                        if evals >= self.max_evals {
                            break;
                        }
                        let v: Vec<f64> = best
                            .iter()
                            .zip(&vertex.0)
                            .map(|(b, x)| b + SIGMA * (x - b))
                            .collect();
                        let fv = eval(&v, &mut evals);
                        *vertex = (v, fv);
                    }
                }
            }
            debug!(evals, best = simplex[0].1, "Nelder-Mead step");
        }

        let (x, fun) = simplex
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((x0.to_vec(), f0));
        history.push(fun);

        OptimizeResult {
            x,
            fun,
            evaluations: evals,
            history,
        }
    }
}
