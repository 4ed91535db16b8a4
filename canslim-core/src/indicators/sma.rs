//! Simple moving average over a trailing window.
//!
//! First valid value at index `period - 1`.

/// Trailing mean over `period` values. Positions before the first full
/// window, and any window containing NaN, are NaN.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let mut sum = 0.0;
    let mut nan_count = 0usize;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            nan_count += 1;
        } else {
            sum += v;
        }

        if i >= period {
            let leaving = values[i - period];
            if leaving.is_nan() {
                nan_count -= 1;
            } else {
                sum -= leaving;
            }
        }

        if i + 1 >= period && nan_count == 0 {
            result[i] = sum / period as f64;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn five_period_mean() {
        let result = rolling_mean(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5);

        assert_eq!(result.len(), 7);
        for v in result.iter().take(4) {
            assert!(v.is_nan());
        }
        assert_approx(result[4], 12.0, 1e-9);
        assert_approx(result[5], 13.0, 1e-9);
        assert_approx(result[6], 14.0, 1e-9);
    }

    #[test]
    fn one_period_is_identity() {
        let result = rolling_mean(&[100.0, 200.0, 300.0], 1);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn first_value_lands_at_period_minus_one() {
        let values: Vec<f64> = (0..150).map(|i| i as f64).collect();
        let result = rolling_mean(&values, 100);
        assert!(result[98].is_nan());
        assert_approx(result[99], 49.5, 1e-9);
    }

    #[test]
    fn nan_poisons_only_windows_that_contain_it() {
        let values = [10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0];
        let result = rolling_mean(&values, 3);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, 1e-9);
    }

    #[test]
    fn too_few_values_is_all_nan() {
        let result = rolling_mean(&[10.0, 11.0], 5);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn zero_period_is_all_nan() {
        assert!(rolling_mean(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }
}
