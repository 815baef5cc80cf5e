//! Deterministic Nelder-Mead simplex minimizer.
//!
//! The initial simplex is built from fixed offsets around the start point,
//! so repeated runs on the same objective visit the same points in the same
//! order. Non-finite objective values are treated as `+inf`.

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadOptions {
    /// Offset added to each coordinate to build the initial simplex.
    pub initial_step: f64,
    /// Convergence threshold on the spread of objective values.
    pub f_tolerance: f64,
    /// Convergence threshold on the simplex size (max-norm).
    pub x_tolerance: f64,
    pub max_iterations: usize,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            initial_step: 0.25,
            f_tolerance: 1e-10,
            x_tolerance: 1e-9,
            max_iterations: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

fn eval<F: FnMut(&[f64]) -> f64>(f: &mut F, x: &[f64]) -> f64 {
    let v = f(x);
    if v.is_finite() { v } else { f64::INFINITY }
}

/// `centroid + coef * (centroid - worst)`.
fn along(centroid: &[f64], worst: &[f64], coef: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(worst)
        .map(|(c, w)| c + coef * (c - w))
        .collect()
}

/// Minimize `f` starting from `start`.
pub fn minimize<F>(mut f: F, start: &[f64], options: NelderMeadOptions) -> Minimum
where
    F: FnMut(&[f64]) -> f64,
{
    let n = start.len();
    if n == 0 {
        let value = eval(&mut f, start);
        return Minimum {
            x: vec![],
            value,
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(start.to_vec());
    for i in 0..n {
        let mut vertex = start.to_vec();
        vertex[i] += options.initial_step;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(&mut f, v)).collect();

    let mut iterations = 0;
    let mut converged = false;
    while iterations < options.max_iterations {
        // order vertices best..worst; stable so ties keep insertion order
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let spread = (values[n] - values[0]).abs();
        let size = simplex[1..]
            .iter()
            .flat_map(|v| v.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max);
        if spread <= options.f_tolerance * (1.0 + values[0].abs()) && size <= options.x_tolerance {
            converged = true;
            break;
        }
        iterations += 1;

        let mut centroid = vec![0.0; n];
        for vertex in &simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x / n as f64;
            }
        }

        let reflected = along(&centroid, &simplex[n], REFLECT);
        let f_reflected = eval(&mut f, &reflected);

        if f_reflected < values[0] {
            let expanded = along(&centroid, &simplex[n], EXPAND);
            let f_expanded = eval(&mut f, &expanded);
            if f_expanded < f_reflected {
                simplex[n] = expanded;
                values[n] = f_expanded;
            } else {
                simplex[n] = reflected;
                values[n] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[n - 1] {
            simplex[n] = reflected;
            values[n] = f_reflected;
            continue;
        }

        // contraction: outside if the reflection improved on the worst point
        let (contracted, f_contracted) = if f_reflected < values[n] {
            let p = along(&centroid, &simplex[n], CONTRACT);
            let fp = eval(&mut f, &p);
            (p, fp)
        } else {
            let p = along(&centroid, &simplex[n], -CONTRACT);
            let fp = eval(&mut f, &p);
            (p, fp)
        };
        if f_contracted < values[n].min(f_reflected) {
            simplex[n] = contracted;
            values[n] = f_contracted;
            continue;
        }

        let best = simplex[0].clone();
        for i in 1..=n {
            let shrunk: Vec<f64> = best
                .iter()
                .zip(&simplex[i])
                .map(|(b, x)| b + SHRINK * (x - b))
                .collect();
            values[i] = eval(&mut f, &shrunk);
            simplex[i] = shrunk;
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);
    trace!(iterations, converged, value = values[best], "nelder-mead finished");
    Minimum {
        x: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}
