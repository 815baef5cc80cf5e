//! Exponentially weighted moving average (unadjusted).
//!
//! `avg[i] = alpha * x[i] + (1 - alpha) * avg[i-1]`, seeded with the first
//! observation. NaN slots are not observations: the previous average is
//! carried forward, but the weight of that average keeps decaying by
//! `(1 - alpha)` per skipped slot, so the next real observation counts for
//! more than it would without the gap.

use std::num::NonZeroUsize;

/// `alpha = 2 / (span + 1)`.
pub fn span_to_alpha(span: NonZeroUsize) -> f64 {
    2.0 / (span.get() as f64 + 1.0)
}

/// `alpha = 1 / window` (Wilder smoothing).
pub fn window_to_alpha(window: NonZeroUsize) -> f64 {
    1.0 / window.get() as f64
}

/// EWMA of `values` with smoothing factor `alpha` in `(0, 1]`.
///
/// Output is aligned with the input. It is NaN up to the first non-NaN input.
pub fn ewm_mean(values: &[f64], alpha: f64) -> Vec<f64> {
    let decay = 1.0 - alpha;
    let mut out = Vec::with_capacity(values.len());
    let mut avg = f64::NAN;
    let mut old_wt = 1.0;

    for &x in values {
        if avg.is_nan() {
            // not seeded yet
            avg = x;
            out.push(avg);
            continue;
        }

        old_wt *= decay;
        if !x.is_nan() {
            avg = (old_wt * avg + alpha * x) / (old_wt + alpha);
            old_wt = 1.0;
        }
        out.push(avg);
    }
    out
}

#[cfg(test)]
mod tests {
    use nonzero_ext::nonzero;

    use super::*;

    #[test]
    fn matches_plain_recurrence_without_gaps() {
        let xs = [10.0, 11.0, 9.5, 12.0, 12.5];
        let alpha = span_to_alpha(nonzero!(3usize));
        assert_eq!(alpha, 0.5);

        let got = ewm_mean(&xs, alpha);
        let mut expected = vec![xs[0]];
        for &x in &xs[1..] {
            let prev = *expected.last().unwrap();
            expected.push(alpha * x + (1.0 - alpha) * prev);
        }
        for (g, e) in got.iter().zip(&expected) {
            assert!((g - e).abs() < 1e-12);
        }
    }

    #[test]
    fn leading_nans_stay_undefined() {
        let got = ewm_mean(&[f64::NAN, f64::NAN, 4.0, 6.0], 0.5);
        assert!(got[0].is_nan() && got[1].is_nan());
        assert_eq!(got[2], 4.0);
        assert_eq!(got[3], 5.0);
    }

    #[test]
    fn gap_carries_average_and_decays_its_weight() {
        let got = ewm_mean(&[4.0, f64::NAN, 8.0], 0.5);
        assert_eq!(got[1], 4.0);
        // old weight 0.25 after one skipped slot: (0.25*4 + 0.5*8) / 0.75
        assert!((got[2] - 5.0 / 0.75).abs() < 1e-12);
    }

    #[test]
    fn alpha_one_tracks_input() {
        let xs = [3.0, f64::NAN, 7.0, 1.0];
        let got = ewm_mean(&xs, window_to_alpha(nonzero!(1usize)));
        assert_eq!(got, vec![3.0, 3.0, 7.0, 1.0]);
    }
}
