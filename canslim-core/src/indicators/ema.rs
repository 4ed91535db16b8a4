//! Exponential moving averages.
//!
//! Two conventions are in common use and both are provided:
//!
//! - **Bias-adjusted EWM** (`ewm_adjusted`): every value from the first
//!   observation on is a weighted mean with weights `(1 - alpha)^i`,
//!   normalized by the weight sum. No warmup, no seed.
//! - **SMA-seeded EMA** (`ema_of_series`): the value at index
//!   `period-1` is the SMA of the first `period` values, then the recursion
//!   `EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1]`. Lookback: period - 1.
//!
//! Both use `alpha = 2 / (span + 1)`.

/// SMA-seeded EMA of an arbitrary series.
///
/// NaN inside the seed window yields an all-NaN result; NaN after the seed
/// taints every later value.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    let seed_window = &values[..period];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }
    let seed = seed_window.iter().sum::<f64>() / period as f64;
    result[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        if values[i].is_nan() {
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}

/// Bias-adjusted exponentially weighted mean with the given span.
///
/// `y[t] = sum_i (1-alpha)^i * x[t-i] / sum_i (1-alpha)^i`, computed
/// recursively. A NaN input taints every later value.
pub fn ewm_adjusted(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            break;
        }
        numerator = v + decay * numerator;
        denominator = 1.0 + decay * denominator;
        result[i] = numerator / denominator;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn seeded_ema_known_values() {
        // alpha = 0.5, seed at index 2 = SMA(10,11,12) = 11
        // EMA[3] = 0.5*13 + 0.5*11 = 12, EMA[4] = 0.5*14 + 0.5*12 = 13
        let result = ema_of_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_nan_in_seed_produces_all_nan() {
        let result = ema_of_series(&[10.0, f64::NAN, 12.0, 13.0], 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ewm_first_value_is_the_input() {
        let result = ewm_adjusted(&[42.0, 10.0], 12);
        assert_approx(result[0], 42.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ewm_adjusted_known_values() {
        // span 3 → alpha 0.5, decay 0.5
        // y0 = 1
        // y1 = (2 + 0.5*1) / (1 + 0.5) = 2.5 / 1.5
        // y2 = (3 + 0.5*2.5) / (1 + 0.5*1.5) = 4.25 / 1.75
        let result = ewm_adjusted(&[1.0, 2.0, 3.0], 3);
        assert_approx(result[0], 1.0, DEFAULT_EPSILON);
        assert_approx(result[1], 2.5 / 1.5, DEFAULT_EPSILON);
        assert_approx(result[2], 4.25 / 1.75, DEFAULT_EPSILON);
    }

    #[test]
    fn ewm_constant_series_is_constant() {
        let result = ewm_adjusted(&[7.0; 50], 26);
        assert!(result.iter().all(|v| (v - 7.0).abs() < 1e-12));
    }

    #[test]
    fn ewm_nan_taints_tail() {
        let result = ewm_adjusted(&[1.0, 2.0, f64::NAN, 4.0], 3);
        assert!(!result[1].is_nan());
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
    }
}
