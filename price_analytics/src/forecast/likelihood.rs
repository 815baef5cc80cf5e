//! Exact Gaussian log-likelihood of a zero-mean AR(p) process.
//!
//! The model is parameterized by its partial autocorrelations `r_1..r_p`,
//! each in `(-1, 1)`, which keeps every candidate stationary. Durbin-Levinson
//! turns them into one-step predictor coefficients and innovation variances,
//! so the likelihood is evaluated in innovations form without building the
//! full covariance matrix. The innovation variance is concentrated out.

use std::f64::consts::PI;

/// Map an unconstrained value into `(-1, 1)`.
pub fn to_pacf(x: f64) -> f64 {
    x / (1.0 + x * x).sqrt()
}

/// Inverse of [`to_pacf`]; `r` must lie strictly inside `(-1, 1)`.
pub fn from_pacf(r: f64) -> f64 {
    r / (1.0 - r * r).sqrt()
}

/// Durbin-Levinson: predictor coefficients of every order `1..=p`.
///
/// `rows[k-1]` holds `phi_{k,1..=k}`; the last row is the AR polynomial.
pub fn levinson_rows(pacf: &[f64]) -> Vec<Vec<f64>> {
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(pacf.len());
    for (k, &r) in pacf.iter().enumerate() {
        let mut row = Vec::with_capacity(k + 1);
        if let Some(prev) = rows.last() {
            for j in 0..k {
                row.push(prev[j] - r * prev[k - 1 - j]);
            }
        }
        row.push(r);
        rows.push(row);
    }
    rows
}

/// AR coefficients implied by the partial autocorrelations.
pub fn pacf_to_ar(pacf: &[f64]) -> Vec<f64> {
    levinson_rows(pacf).pop().unwrap_or_default()
}

/// Sample partial autocorrelations up to lag `p` of a zero-mean series.
///
/// Returns `None` when the series has no variance.
pub fn sample_pacf(x: &[f64], p: usize) -> Option<Vec<f64>> {
    let n = x.len();
    let acov = |lag: usize| -> f64 {
        x[..n.saturating_sub(lag)]
            .iter()
            .zip(&x[lag.min(n)..])
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / n as f64
    };
    let c0 = acov(0);
    if !(c0 > 0.0) || !c0.is_finite() {
        return None;
    }
    let rho: Vec<f64> = (0..=p).map(|lag| acov(lag) / c0).collect();

    // Levinson-Durbin on the sample autocorrelations
    let mut pacf = Vec::with_capacity(p);
    let mut phi: Vec<f64> = Vec::with_capacity(p);
    let mut v = 1.0;
    for k in 1..=p {
        let num = rho[k] - phi.iter().enumerate().map(|(j, f)| f * rho[k - 1 - j]).sum::<f64>();
        let r = if v > 0.0 { num / v } else { 0.0 };
        let next: Vec<f64> = (0..k - 1).map(|j| phi[j] - r * phi[k - 2 - j]).collect();
        phi = next;
        phi.push(r);
        v *= 1.0 - r * r;
        pacf.push(r);
    }
    Some(pacf)
}

/// Result of evaluating the concentrated likelihood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Maximum-likelihood innovation variance for these coefficients.
    pub sigma2: f64,
    pub log_likelihood: f64,
}

/// Concentrated exact log-likelihood of `x` under the AR model with the
/// given partial autocorrelations.
///
/// Returns `None` if any partial autocorrelation is outside `(-1, 1)` or the
/// evaluation is numerically degenerate.
pub fn evaluate(x: &[f64], pacf: &[f64]) -> Option<Evaluation> {
    if pacf.iter().any(|r| !(r.abs() < 1.0)) {
        return None;
    }
    let n = x.len();
    let p = pacf.len();
    let rows = levinson_rows(pacf);

    // innovation variances in units of sigma^2: v_p = 1
    let gamma0 = 1.0 / pacf.iter().map(|r| 1.0 - r * r).product::<f64>();
    let mut v = Vec::with_capacity(p + 1);
    v.push(gamma0);
    for r in pacf {
        let last = v[v.len() - 1];
        v.push(last * (1.0 - r * r));
    }

    let mut weighted_ss = 0.0;
    let mut log_det = 0.0;
    for t in 0..n {
        let k = t.min(p);
        let predicted: f64 = match k {
            0 => 0.0,
            _ => rows[k - 1]
                .iter()
                .enumerate()
                .map(|(j, phi)| phi * x[t - 1 - j])
                .sum(),
        };
        let e = x[t] - predicted;
        weighted_ss += e * e / v[k];
        log_det += v[k].ln();
    }

    let sigma2 = weighted_ss / n as f64;
    if !(sigma2 > 0.0) || !sigma2.is_finite() {
        return None;
    }
    let nf = n as f64;
    let log_likelihood = -0.5 * nf * ((2.0 * PI).ln() + sigma2.ln() + 1.0) - 0.5 * log_det;
    log_likelihood.is_finite().then_some(Evaluation {
        sigma2,
        log_likelihood,
    })
}
