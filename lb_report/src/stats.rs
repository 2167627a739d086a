// ABOUTME: Small numeric helpers shared by the reporter.
/// Arithmetic mean; `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Samples left after dropping the first `warmup`; empty if none remain
pub fn retained_after_warmup(values: &[f64], warmup: usize) -> &[f64] {
    values.get(warmup..).unwrap_or(&[])
}

/// Percentage of `avg` relative to `baseline`, rounded to two decimals.
///
/// 100.0 means identical performance; below 100 is faster than the baseline
/// when durations shrink.
pub fn speedup_percent(avg: f64, baseline: f64) -> f64 {
    ((avg / baseline) * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_equal_values_is_exact() {
        let values = vec![10.0; 91];
        assert_eq!(mean(&values), Some(10.0));
    }

    #[test]
    fn test_mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_retained_after_warmup_drops_leading_samples() {
        let mut values = vec![100.0; 10];
        values.extend(vec![2.0; 90]);
        let retained = retained_after_warmup(&values, 10);
        assert_eq!(retained.len(), 90);
        assert_eq!(mean(retained), Some(2.0));
    }

    #[test]
    fn test_warmup_larger_than_sequence_retains_nothing() {
        assert!(retained_after_warmup(&[1.0, 2.0], 5).is_empty());
        assert!(retained_after_warmup(&[1.0, 2.0], 2).is_empty());
        assert_eq!(mean(retained_after_warmup(&[1.0, 2.0], 2)), None);
    }

    #[test]
    fn test_speedup_equal_to_baseline_is_100() {
        assert_eq!(speedup_percent(9.5341, 9.5341), 100.0);
    }

    #[test]
    fn test_speedup_rounds_to_two_decimals() {
        // 1.0/3.0 * 100 = 33.333... -> 33.33
        assert_eq!(speedup_percent(1.0, 3.0), 33.33);
        // 2.0/3.0 * 100 = 66.666... -> 66.67
        assert_eq!(speedup_percent(2.0, 3.0), 66.67);
    }

    #[test]
    fn test_speedup_above_baseline() {
        assert_eq!(speedup_percent(12.0, 10.0), 120.0);
    }
}
