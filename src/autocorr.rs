use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Estimator of the integrated autocorrelation time of a scalar series
///
/// The estimate is the number of steps separating effectively independent
/// entries of the series. Implementations must be deterministic for a fixed
/// input and bounded by the series length; they are expected to return a
/// non-positive value for degenerate input, which callers substitute with
/// their own fallback.
pub trait AutocorrTimeEstimator {
    fn autocorr_time(&self, series: &[f64]) -> f64;
}

/// Windowed self-consistent autocorrelation-time estimator
///
/// Computes `tau = 1 + 2 sum rho(k)` from the normalized autocovariance
/// function of the mean-centered series, truncating the sum at the first lag
/// `k >= window * tau` (Sokal's windowing criterion). Small windows bias the
/// estimate low, large windows let noise accumulate; the default of 5 is the
/// conventional compromise.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SokalEstimator {
    #[serde(default = "SokalEstimator::default_window")]
    pub window: f64,
}

impl SokalEstimator {
    pub fn new(window: f64) -> Self {
        assert!(window > 0.0, "window must be positive");
        Self { window }
    }

    #[inline]
    pub fn default_window() -> f64 {
        5.0
    }
}

impl Default for SokalEstimator {
    fn default() -> Self {
        Self::new(Self::default_window())
    }
}

impl AutocorrTimeEstimator for SokalEstimator {
    fn autocorr_time(&self, series: &[f64]) -> f64 {
        let n = series.len();
        if n < 2 {
            return 0.0;
        }
        let mean = series.iter().sum::<f64>() / n as f64;
        let centered: Vec<_> = series.iter().map(|&x| x - mean).collect();
        let variance = centered.iter().map(|&d| d * d).sum::<f64>() / n as f64;
        if variance <= 0.0 {
            return 0.0;
        }

        let mut tau = 1.0;
        for lag in 1..n {
            let autocov = centered[..n - lag]
                .iter()
                .zip(&centered[lag..])
                .map(|(&a, &b)| a * b)
                .sum::<f64>()
                / n as f64;
            tau += 2.0 * autocov / variance;
            if lag as f64 >= self.window * tau {
                break;
            }
        }
        tau
    }
}
