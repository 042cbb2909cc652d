pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean; NaN for an empty slice so callers can map it to the
    /// "unknown" color.
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_nan() {
        assert!(StatsHelper::mean(&[]).is_nan());
    }

    #[test]
    fn mean_handles_single_value() {
        assert_eq!(StatsHelper::mean(&[4.0]), 4.0);
        assert_eq!(StatsHelper::mean(&[50.0, 15.0, 40.0]), 35.0);
    }
}
