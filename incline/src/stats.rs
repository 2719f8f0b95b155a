//! Length weighted incline statistics.

use crate::math::round;

/// One polyline's incline, in percent, weighted by its length in
/// meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InclineSample {
    pub incline: f64,
    pub weight: f64,
}

impl InclineSample {
    pub fn new(incline: f64, weight: f64) -> Self {
        Self { incline, weight }
    }
}

/// Weighted mean and weighted standard deviation of a street's GPS
/// samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedIncline {
    /// Rounded to 2 decimals.
    pub mean: f64,

    /// `NaN` for a single sample.
    pub std_dev: f64,
}

impl WeightedIncline {
    /// Returns `None` for an empty sample set.
    pub fn aggregate(samples: &[InclineSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        Some(Self {
            mean: weighted_mean(samples),
            std_dev: weighted_std_dev(samples),
        })
    }
}

/// `Σ(incline·weight) / Σweight`, rounded to 2 decimals.
///
/// `NaN` for an empty sample set.
pub fn weighted_mean(samples: &[InclineSample]) -> f64 {
    round(unrounded_mean(samples), 2)
}

/// NIST weighted sample standard deviation:
///
/// ```text
/// sqrt( Σ w·(x - mean)² / ((n - 1)·Σw / n) )
/// ```
///
/// Returns `NaN` for fewer than two samples.
pub fn weighted_std_dev(samples: &[InclineSample]) -> f64 {
    let n = samples.len();
    if n <= 1 {
        return f64::NAN;
    }
    let mean = unrounded_mean(samples);
    let (sum_weights, sum_squares) =
        samples
            .iter()
            .fold((0.0, 0.0), |(sum_weights, sum_squares), sample| {
                (
                    sum_weights + sample.weight,
                    sum_squares + sample.weight * (sample.incline - mean).powi(2),
                )
            });
    #[allow(clippy::cast_precision_loss)]
    let n = n as f64;
    let denominator = (n - 1.0) * sum_weights / n;
    (sum_squares / denominator).sqrt()
}

fn unrounded_mean(samples: &[InclineSample]) -> f64 {
    let (sum_weighted, sum_weights) = samples
        .iter()
        .fold((0.0, 0.0), |(sum_weighted, sum_weights), sample| {
            (
                sum_weighted + sample.incline * sample.weight,
                sum_weights + sample.weight,
            )
        });
    sum_weighted / sum_weights
}

#[cfg(test)]
mod tests {
    use super::{weighted_mean, weighted_std_dev, InclineSample, WeightedIncline};
    use approx::assert_relative_eq;

    fn samples(pairs: &[(f64, f64)]) -> Vec<InclineSample> {
        pairs
            .iter()
            .map(|&(incline, weight)| InclineSample::new(incline, weight))
            .collect()
    }

    #[test]
    fn test_weighted_mean() {
        let s = samples(&[(5.0, 100.0), (3.0, 50.0)]);
        assert_eq!(weighted_mean(&s), 4.33);
    }

    #[test]
    fn test_weighted_mean_reorder_and_split() {
        let s = samples(&[(5.0, 100.0), (3.0, 50.0), (-1.5, 20.0)]);
        let reordered = samples(&[(-1.5, 20.0), (5.0, 100.0), (3.0, 50.0)]);
        let split = samples(&[(5.0, 60.0), (3.0, 50.0), (-1.5, 20.0), (5.0, 40.0)]);
        assert_eq!(weighted_mean(&s), weighted_mean(&reordered));
        assert_eq!(weighted_mean(&s), weighted_mean(&split));
    }

    #[test]
    fn test_std_dev_undefined_below_two_samples() {
        assert!(weighted_std_dev(&[]).is_nan());
        assert!(weighted_std_dev(&samples(&[(2.5, 10.0)])).is_nan());
    }

    #[test]
    fn test_std_dev_of_identical_inclines_is_zero() {
        let s = samples(&[(1.5, 12.5), (1.5, 80.0), (1.5, 3.0)]);
        assert_eq!(weighted_std_dev(&s), 0.0);
    }

    #[test]
    fn test_std_dev() {
        // Equal weights reduce to the ordinary sample standard
        // deviation.
        let s = samples(&[(2.0, 1.0), (4.0, 1.0), (4.0, 1.0), (4.0, 1.0)]);
        assert_relative_eq!(weighted_std_dev(&s), 1.0);

        // mean = 13/3, Σw(x - mean)² = 400/3, denominator = 75.
        let s = samples(&[(5.0, 100.0), (3.0, 50.0)]);
        assert_relative_eq!(weighted_std_dev(&s), 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_aggregate() {
        assert_eq!(WeightedIncline::aggregate(&[]), None);

        let single = WeightedIncline::aggregate(&samples(&[(-2.75, 42.0)])).unwrap();
        assert_eq!(single.mean, -2.75);
        assert!(single.std_dev.is_nan());

        let s = samples(&[(5.0, 100.0), (3.0, 50.0)]);
        let first = WeightedIncline::aggregate(&s).unwrap();
        let second = WeightedIncline::aggregate(&s).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.mean, 4.33);
    }
}
