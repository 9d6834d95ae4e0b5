//! Mean, covariance and quantiles of thinned chain samples
//!
//! Posterior samples routinely carry a large common offset (the NIST MCMC
//! reference cases sit near 1e13), so both reductions here avoid the naive
//! formulas: the mean is computed in two passes around a crude offset, and
//! the covariance always multiplies values centered by that stable mean.
//! `sum(x * y) / n - mean_x * mean_y` cancels catastrophically for such data
//! and must not be reintroduced.

use crate::error::StatsError;
use crate::types::{ArrayRef1, ArrayRef2};

use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

/// Point estimates extracted from thinned posterior samples
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainStats {
    /// Posterior mean per dimension
    pub mean: Array1<f64>,
    /// Posterior standard deviation per dimension
    pub std_err: Array1<f64>,
    /// Posterior covariance matrix
    pub covariance: Array2<f64>,
}

/// Mean, standard errors and covariance of per-dimension sample rows
pub fn chain_stats(samples: &ArrayRef2<f64>) -> Result<ChainStats, StatsError> {
    if samples.nrows() == 0 || samples.ncols() == 0 {
        return Err(StatsError::EmptySamples);
    }
    let mean = chain_mean(samples);
    let covariance = chain_covariance(samples, &mean);
    let std_err = covariance.diag().mapv(f64::sqrt);
    Ok(ChainStats {
        mean,
        std_err,
        covariance,
    })
}

/// Per-dimension mean, computed in two passes
///
/// The crude first-pass mean serves as an offset for the second pass, which
/// averages the residuals; this keeps full precision when the samples share a
/// large additive constant.
pub fn chain_mean(samples: &ArrayRef2<f64>) -> Array1<f64> {
    let n = samples.ncols() as f64;
    samples
        .rows()
        .into_iter()
        .map(|row| {
            let offset = row.sum() / n;
            offset + row.iter().map(|&x| x - offset).sum::<f64>() / n
        })
        .collect()
}

/// Covariance matrix of the sample rows around the supplied mean
///
/// Every entry averages products of mean-centered values; a constant row
/// therefore yields exactly zero variance.
pub fn chain_covariance(samples: &ArrayRef2<f64>, mean: &ArrayRef1<f64>) -> Array2<f64> {
    let dim = samples.nrows();
    let n = samples.ncols() as f64;
    let mut cov = Array2::zeros((dim, dim));
    for (a, b) in (0..dim).tuple_combinations() {
        let value = Zip::from(samples.row(a))
            .and(samples.row(b))
            .fold(0.0, |sum, &xa, &xb| sum + (xa - mean[a]) * (xb - mean[b]))
            / n;
        cov[[a, b]] = value;
        cov[[b, a]] = value;
    }
    for a in 0..dim {
        cov[[a, a]] = samples
            .row(a)
            .iter()
            .map(|&x| (x - mean[a]) * (x - mean[a]))
            .sum::<f64>()
            / n;
    }
    cov
}

// Underlying array is guaranteed to be sorted and contiguous
#[derive(Clone, Debug, PartialEq)]
pub struct SortedSamples(Array1<f64>);

impl SortedSamples {
    pub fn minimum(&self) -> f64 {
        *self.first().expect("samples must be non-empty")
    }

    pub fn maximum(&self) -> f64 {
        self[self.len() - 1]
    }

    pub fn median(&self) -> f64 {
        assert_ne!(self.len(), 0);
        let i = (self.len() - 1) / 2;
        if self.len() % 2 == 0 {
            0.5 * (self[i] + self[i + 1])
        } else {
            self[i]
        }
    }

    // R-5 from https://en.wikipedia.org/wiki/Quantile
    pub fn ppf(&self, q: f64) -> f64 {
        assert_ne!(self.len(), 0);
        assert!(
            (0.0..=1.0).contains(&q),
            "quantile should be between zero and unity"
        );
        let h = self.len() as f64 * q - 0.5;
        let h_floor = h.floor();
        if h_floor < 0.0 {
            self.minimum()
        } else {
            let i = h_floor as usize;
            if i >= self.len() - 1 {
                self.maximum()
            } else {
                self[i] + (h - h_floor) * (self[i + 1] - self[i])
            }
        }
    }
}

impl From<Vec<f64>> for SortedSamples {
    fn from(mut v: Vec<f64>) -> Self {
        v[..].sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());
        Self(Array1::from_vec(v))
    }
}

impl From<&[f64]> for SortedSamples {
    fn from(s: &[f64]) -> Self {
        s.to_vec().into()
    }
}

impl From<ArrayView1<'_, f64>> for SortedSamples {
    fn from(v: ArrayView1<'_, f64>) -> Self {
        v.to_vec().into()
    }
}

impl std::ops::Deref for SortedSamples {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice().unwrap()
    }
}

impl AsRef<[f64]> for SortedSamples {
    fn as_ref(&self) -> &[f64] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    #[test]
    fn empty_samples_are_an_error() {
        let samples = Array2::<f64>::zeros((2, 0));
        assert_eq!(chain_stats(&samples).err(), Some(StatsError::EmptySamples));
        let samples = Array2::<f64>::zeros((0, 2));
        assert_eq!(chain_stats(&samples).err(), Some(StatsError::EmptySamples));
    }

    #[test]
    fn constant_series_small_magnitude() {
        let samples = Array2::from_elem((1, 1000), 3.0);
        let stats = chain_stats(&samples).unwrap();
        assert_eq!(stats.mean[0], 3.0);
        assert_eq!(stats.covariance[[0, 0]], 0.0);
        assert_eq!(stats.std_err[0], 0.0);
    }

    #[test]
    fn constant_series_large_magnitude() {
        // the two-pass mean and centered covariance keep this exact even when
        // a naive accumulation of x and x^2 would lose every significant digit
        let value = 10000000000000.2;
        let samples = Array2::from_elem((1, 1000), value);
        let stats = chain_stats(&samples).unwrap();
        assert_eq!(stats.mean[0], value);
        assert_eq!(stats.covariance[[0, 0]], 0.0);
    }

    #[test]
    fn known_covariance() {
        let samples = array![[1.0, 2.0, 3.0, 4.0], [2.0, 4.0, 6.0, 8.0]];
        let stats = chain_stats(&samples).unwrap();
        assert_relative_eq!(stats.mean[0], 2.5, epsilon = 1e-15);
        assert_relative_eq!(stats.mean[1], 5.0, epsilon = 1e-15);
        assert_relative_eq!(stats.covariance[[0, 0]], 1.25, epsilon = 1e-15);
        assert_relative_eq!(stats.covariance[[1, 1]], 5.0, epsilon = 1e-15);
        assert_relative_eq!(stats.covariance[[0, 1]], 2.5, epsilon = 1e-15);
        assert_eq!(stats.covariance[[0, 1]], stats.covariance[[1, 0]]);
        assert_relative_eq!(stats.std_err[0], f64::sqrt(1.25), epsilon = 1e-15);
    }

    #[test]
    fn covariance_survives_large_offsets() {
        let offset = 1e13;
        let small = [0.1, -0.2, 0.3, -0.4, 0.15, 0.05];
        let shifted: Vec<f64> = small.iter().map(|&x| offset + x).collect();
        let plain = Array2::from_shape_vec((1, small.len()), small.to_vec()).unwrap();
        let offsetted = Array2::from_shape_vec((1, small.len()), shifted).unwrap();
        let desired = chain_stats(&plain).unwrap();
        let actual = chain_stats(&offsetted).unwrap();
        assert_abs_diff_eq!(
            actual.covariance[[0, 0]],
            desired.covariance[[0, 0]],
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(actual.mean[0] - offset, desired.mean[0], epsilon = 1e-3);
    }

    #[test]
    fn sorted_samples_order_and_extrema() {
        let sorted = SortedSamples::from(vec![3.0, 1.0, 2.0]);
        assert_eq!(&sorted[..], &[1.0, 2.0, 3.0]);
        assert_eq!(sorted.minimum(), 1.0);
        assert_eq!(sorted.maximum(), 3.0);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(SortedSamples::from(vec![5.0, 1.0, 3.0]).median(), 3.0);
        assert_eq!(SortedSamples::from(vec![4.0, 1.0, 3.0, 2.0]).median(), 2.5);
    }

    #[test]
    fn ppf_interpolates() {
        let sorted = SortedSamples::from(vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(sorted.ppf(0.0), 0.0);
        assert_eq!(sorted.ppf(1.0), 3.0);
        assert_abs_diff_eq!(sorted.ppf(0.5), 1.5, epsilon = 1e-15);
        // R-5: h = 4 * 0.25 - 0.5 = 0.5
        assert_abs_diff_eq!(sorted.ppf(0.25), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn ppf_of_uniform_grid_is_linear() {
        let n = 10001;
        let sorted = SortedSamples::from((0..n).map(|i| i as f64 / (n - 1) as f64).collect_vec());
        for &q in &[0.025, 0.5, 0.975] {
            assert_abs_diff_eq!(sorted.ppf(q), q, epsilon = 1e-3);
        }
    }
}
