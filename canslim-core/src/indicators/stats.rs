//! Scalar statistics over `f64` slices.
//!
//! Every function returns `None` when the statistic is undefined for the
//! input (too few values, or a non-finite result), never NaN.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    finite(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    finite((ss / (values.len() - 1) as f64).sqrt())
}

/// Sample covariance (n - 1 denominator) of two equal-length slices.
pub fn sample_covariance(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let ma = mean(a)?;
    let mb = mean(b)?;
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    finite(sum / (a.len() - 1) as f64)
}

/// Population variance (n denominator).
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    finite(ss / values.len() as f64)
}

/// Least-squares slope of `values` against their index `0..n`.
pub fn linear_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values)?;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    finite(num / den)
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn mean_of_empty_is_none() {
        assert!(mean(&[]).is_none());
        assert_approx(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sample_std_known_value() {
        // values 2,4,4,4,5,5,7,9: mean 5, ss 32, sample var 32/7
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_approx(sample_std(&v).unwrap(), (32.0f64 / 7.0).sqrt(), 1e-12);
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn covariance_and_variance_denominators_differ() {
        let a = [1.0, 2.0, 3.0, 4.0];
        // ss = 5.0
        assert_approx(sample_covariance(&a, &a).unwrap(), 5.0 / 3.0, 1e-12);
        assert_approx(population_variance(&a).unwrap(), 5.0 / 4.0, 1e-12);
    }

    #[test]
    fn covariance_rejects_mismatched_lengths() {
        assert!(sample_covariance(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn slope_of_a_line() {
        let v: Vec<f64> = (0..20).map(|i| 3.0 + 0.5 * i as f64).collect();
        assert_approx(linear_slope(&v).unwrap(), 0.5, 1e-12);
        assert_approx(linear_slope(&[4.0; 10]).unwrap(), 0.0, 1e-12);
        assert!(linear_slope(&[1.0]).is_none());
    }

    #[test]
    fn nan_input_yields_none() {
        assert!(mean(&[1.0, f64::NAN]).is_none());
        assert!(linear_slope(&[1.0, f64::NAN, 3.0]).is_none());
    }
}
