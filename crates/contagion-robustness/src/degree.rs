use contagion_core::{Network, F};
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

/// Cumulative degree distribution: `values[k] = P(K >= k)` for `k = 0..=max_degree`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DegreeDistribution {
    pub values: Vec<F>,
}

/// `P(x) = coefficient * x^(-exponent)` with its goodness of fit
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerLawFit {
    pub coefficient: F,
    pub exponent: F,
    pub r_squared: F,
}

impl PowerLawFit {
    pub fn predict(&self, x: F) -> F {
        self.coefficient * x.powf(-self.exponent)
    }
}

impl DegreeDistribution {
    /// Distribution of total degree (in + out). Empty network gives no values.
    pub fn of(network: &Network) -> Self {
        let degrees: Vec<usize> = (0..network.len()).map(|id| network.degree(id)).collect();
        let Some(&max) = degrees.iter().max() else {
            return Self { values: Vec::new() };
        };

        let mut counts = vec![0usize; max + 1];
        for &d in &degrees {
            counts[d] += 1;
        }

        let mut tail = 0usize;
        let mut cumulative = vec![0usize; max + 1];
        for k in (0..=max).rev() {
            tail += counts[k];
            cumulative[k] = tail;
        }

        let total = cumulative[0] as F;
        Self {
            values: cumulative.into_iter().map(|c| c as F / total).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Points `(x, P)` with `x = k + 1`, the abscissa used by the power-law fit
    pub fn points(&self) -> impl Iterator<Item = (F, F)> + '_ {
        self.values.iter().enumerate().map(|(k, &p)| ((k + 1) as F, p))
    }

    /// Nonlinear least squares of `P = C * x^(-gamma)` on the original
    /// scale over every point, zeros included (Levenberg-Marquardt, started
    /// from the log-log fit). Needs at least two points.
    pub fn fit_power_law(&self) -> Option<PowerLawFit> {
        let points: Vec<(F, F)> = self.points().collect();
        if points.len() < 2 {
            return None;
        }
        let start = self
            .fit_log_log()
            .map_or(Vector2::new(1.0, 1.0), |fit| Vector2::new(fit.coefficient, fit.exponent));
        let params = levenberg_marquardt(&points, start)?;
        Some(self.scored(params[0], params[1]))
    }

    /// Ordinary least squares on `(ln x, ln P)`, skipping zero points.
    /// Needs at least two positive points.
    pub fn fit_log_log(&self) -> Option<PowerLawFit> {
        let logs: Vec<(F, F)> = self
            .points()
            .filter(|&(_, p)| p > 0.0)
            .map(|(x, p)| (x.ln(), p.ln()))
            .collect();
        if logs.len() < 2 {
            return None;
        }

        let m = logs.len() as F;
        let mean_x = logs.iter().map(|(x, _)| x).sum::<F>() / m;
        let mean_y = logs.iter().map(|(_, y)| y).sum::<F>() / m;
        let sxx: F = logs.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let sxy: F = logs.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        Some(self.scored(intercept.exp(), -slope))
    }

    /// R² on the original scale
    fn scored(&self, coefficient: F, exponent: F) -> PowerLawFit {
        let mut fit = PowerLawFit {
            coefficient,
            exponent,
            r_squared: 0.0,
        };
        let n = self.values.len() as F;
        let mean_p = self.values.iter().sum::<F>() / n;
        let (ss_res, ss_tot) = self.points().fold((0.0, 0.0), |(res, tot), (x, p)| {
            (res + (p - fit.predict(x)).powi(2), tot + (p - mean_p).powi(2))
        });
        fit.r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };
        fit
    }
}

const LM_MAX_ITERATIONS: usize = 500;
const LM_TOLERANCE: F = 1e-14;

fn sum_of_squares(points: &[(F, F)], params: &Vector2<F>) -> F {
    points
        .iter()
        .map(|&(x, y)| (y - params[0] * x.powf(-params[1])).powi(2))
        .sum()
}

/// Damped Gauss-Newton on `(C, gamma)`. Only steps that lower the sum of
/// squares are taken, so the result is never worse than `start`.
fn levenberg_marquardt(points: &[(F, F)], start: Vector2<F>) -> Option<Vector2<F>> {
    let mut params = start;
    let mut cost = sum_of_squares(points, &params);
    if !cost.is_finite() {
        return None;
    }
    let mut lambda = 1e-3;

    for _ in 0..LM_MAX_ITERATIONS {
        if cost == 0.0 || lambda > 1e16 {
            break;
        }
        let mut jtj = Matrix2::<F>::zeros();
        let mut jtr = Vector2::<F>::zeros();
        for &(x, y) in points {
            let power = x.powf(-params[1]);
            // d/dC and d/dgamma of C * x^(-gamma)
            let row = Vector2::new(power, -params[0] * power * x.ln());
            jtj += row * row.transpose();
            jtr += row * (y - params[0] * power);
        }

        let damped = jtj + Matrix2::from_diagonal(&jtj.diagonal()) * lambda;
        let Some(step) = damped.lu().solve(&jtr) else {
            lambda *= 10.0;
            continue;
        };
        let candidate = params + step;
        let candidate_cost = sum_of_squares(points, &candidate);
        if candidate_cost.is_finite() && candidate_cost < cost {
            let improvement = cost - candidate_cost;
            params = candidate;
            cost = candidate_cost;
            lambda /= 10.0;
            if improvement <= LM_TOLERANCE * cost || step.norm() <= LM_TOLERANCE * (params.norm() + LM_TOLERANCE) {
                break;
            }
        } else {
            lambda *= 10.0;
        }
    }
    Some(params)
}
