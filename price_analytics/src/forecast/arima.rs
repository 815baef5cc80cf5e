//! ARIMA(p, d, 0) estimation and forecasting.
//!
//! The series is differenced `d` times and a zero-mean AR(p) is fit to the
//! result by exact maximum likelihood. Point forecasts are produced on the
//! differenced scale and integrated back; their standard errors come from the
//! psi-weights of the integrated AR polynomial.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    ModelFitError,
    likelihood::{evaluate, from_pacf, pacf_to_ar, sample_pacf, to_pacf},
    optimizer::{NelderMeadOptions, minimize},
};

/// Fewest observations a fit is attempted on.
pub const MIN_OBSERVATIONS: usize = 30;

/// Start values are kept away from the stationarity boundary.
const START_PACF_LIMIT: f64 = 0.99;

/// Model order `(p, d, q)`. Only `q = 0` can be estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Observations needed to fit this order.
    pub fn required_observations(&self) -> usize {
        MIN_OBSERVATIONS.max(self.p + self.d + 1)
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(5, 1, 0)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Successive differences; `levels[0]` is the input, `levels[d]` is the
/// `d`-times differenced series.
pub fn difference(values: &[f64], d: usize) -> Vec<Vec<f64>> {
    let mut levels = vec![values.to_vec()];
    for _ in 0..d {
        let prev = &levels[levels.len() - 1];
        let next = prev.windows(2).map(|w| w[1] - w[0]).collect();
        levels.push(next);
    }
    levels
}

/// A fitted ARIMA(p, d, 0) model.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaFit {
    pub order: ArimaOrder,
    /// AR coefficients `phi_1..phi_p` of the differenced series.
    pub ar: Vec<f64>,
    /// Innovation variance.
    pub sigma2: f64,
    pub log_likelihood: f64,
    /// Length of the differenced series the likelihood was evaluated on.
    pub nobs: usize,
    pub iterations: usize,
    pub converged: bool,
    /// Last value of every differencing level `0..d`.
    level_tails: Vec<f64>,
    /// Last `p` values of the differenced series, oldest first.
    history: Vec<f64>,
}

impl ArimaFit {
    /// Akaike information criterion; sigma^2 counts as a parameter.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood + 2.0 * (self.order.p + 1) as f64
    }

    /// Point forecasts for the next `horizon` steps, at the original scale.
    pub fn predict(&self, horizon: usize) -> Vec<f64> {
        let mut hist = self.history.clone();
        let mut diffed = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let len = hist.len();
            let next: f64 = self.ar.iter().enumerate().map(|(j, phi)| phi * hist[len - 1 - j]).sum();
            hist.push(next);
            diffed.push(next);
        }

        // integrate back one level at a time
        let mut out = diffed;
        for &last in self.level_tails.iter().rev() {
            let mut acc = last;
            for v in out.iter_mut() {
                acc += *v;
                *v = acc;
            }
        }
        out
    }

    /// Standard error of each of the next `horizon` forecasts.
    pub fn std_errors(&self, horizon: usize) -> Vec<f64> {
        let psi = psi_weights(&integrated_ar(&self.ar, self.order.d), horizon);
        let mut acc = 0.0;
        psi.iter()
            .map(|w| {
                acc += w * w;
                (self.sigma2 * acc).sqrt()
            })
            .collect()
    }
}

/// AR coefficients of `phi(B) (1 - B)^d`, written as `1 - sum a_j B^j`.
fn integrated_ar(ar: &[f64], d: usize) -> Vec<f64> {
    // polynomial coefficients, c[0] = 1
    let mut c: Vec<f64> = std::iter::once(1.0).chain(ar.iter().map(|a| -a)).collect();
    for _ in 0..d {
        let mut next = vec![0.0; c.len() + 1];
        for (i, coef) in c.iter().enumerate() {
            next[i] += coef;
            next[i + 1] -= coef;
        }
        c = next;
    }
    c[1..].iter().map(|v| -v).collect()
}

/// First `count` psi-weights of the MA(infinity) form, `psi_0 = 1`.
fn psi_weights(a: &[f64], count: usize) -> Vec<f64> {
    let mut psi: Vec<f64> = Vec::with_capacity(count);
    for j in 0..count {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let w = (1..=j.min(a.len())).map(|i| a[i - 1] * psi[j - i]).sum();
        psi.push(w);
    }
    psi
}

/// Fit ARIMA(p, d, 0) to `values`.
///
/// # Errors
/// See [`ModelFitError`]; every failure is reported, none panics.
pub fn fit(values: &[f64], order: ArimaOrder) -> Result<ArimaFit, ModelFitError> {
    if order.q != 0 {
        return Err(ModelFitError::UnsupportedOrder { order });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(ModelFitError::NonFiniteInput { index });
    }
    let required = order.required_observations();
    if values.len() < required {
        return Err(ModelFitError::InsufficientData {
            required,
            actual: values.len(),
        });
    }

    let levels = difference(values, order.d);
    let w = &levels[order.d];
    let start_pacf = sample_pacf(w, order.p).ok_or(ModelFitError::Singular)?;
    let start: Vec<f64> = start_pacf
        .iter()
        .map(|r| from_pacf(r.clamp(-START_PACF_LIMIT, START_PACF_LIMIT)))
        .collect();

    let cost = |x: &[f64]| {
        let pacf: Vec<f64> = x.iter().map(|v| to_pacf(*v)).collect();
        evaluate(w, &pacf).map_or(f64::INFINITY, |e| -e.log_likelihood)
    };
    let min = minimize(cost, &start, NelderMeadOptions::default());

    if !min.value.is_finite() || min.x.iter().any(|v| !v.is_finite()) {
        return Err(ModelFitError::Optimization {
            message: "optimizer did not reach a finite likelihood".to_string(),
        });
    }
    let pacf: Vec<f64> = min.x.iter().map(|v| to_pacf(*v)).collect();
    let eval = evaluate(w, &pacf).ok_or_else(|| ModelFitError::Optimization {
        message: "likelihood is degenerate at the optimum".to_string(),
    })?;
    let ar = pacf_to_ar(&pacf);
    if ar.iter().any(|v| !v.is_finite()) {
        return Err(ModelFitError::Optimization {
            message: "non-finite AR coefficients".to_string(),
        });
    }

    debug!(
        %order,
        ?ar,
        sigma2 = eval.sigma2,
        log_likelihood = eval.log_likelihood,
        iterations = min.iterations,
        converged = min.converged,
        "fitted ARIMA"
    );

    let level_tails = levels[..order.d]
        .iter()
        .map(|level| level[level.len() - 1])
        .collect();
    let history = w[w.len() - order.p..].to_vec();

    Ok(ArimaFit {
        order,
        ar,
        sigma2: eval.sigma2,
        log_likelihood: eval.log_likelihood,
        nobs: w.len(),
        iterations: min.iterations,
        converged: min.converged,
        level_tails,
        history,
    })
}
