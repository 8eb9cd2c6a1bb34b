//! Descriptive statistics shared by the consensus and trend paths.
//!
//! Variance is population variance (divisor n), matching how the upstream
//! layers report their own aggregates.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Round to 3 decimals, the precision agreement and confidence scores are
/// reported at.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Round to 2 decimals, used for mode bucketing.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_median() {
        assert_eq!(mean(&[10.0, 12.0, 14.0]), 12.0);
        assert_eq!(median(&[10.0, 12.0, 100.0]), 12.0);
        // Even counts average the middle pair.
        assert_eq!(median(&[10.0, 12.0]), 11.0);
    }

    #[test]
    fn test_population_variance() {
        // Deviations of ±1 around mean 2 with divisor n = 2.
        assert_eq!(variance(&[1.0, 3.0]), 1.0);
        assert_eq!(std_dev(&[1.0, 3.0]), 1.0);
    }

    #[test]
    fn test_empty_input_degrades_to_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(variance(&[]), 0.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round3(0.61111), 0.611);
        assert_eq!(round2(1.2345), 1.23);
    }
}
