//! High-level curve-fit entry points
//!
//! Each function builds the matching log-posterior from the data arrays,
//! runs a fresh default-configuration [EnsembleSampler] for a fixed number of
//! steps, and reduces the thinned chain to posterior means, standard errors
//! and a covariance matrix.

use crate::error::FitError;
use crate::ln_pdf::{ConstantErrorLnPdf, KnownErrorLnPdf, LnPdf, ScatterErrorLnPdf};
use crate::params::Parameter;
use crate::sampler::{EnsembleSampler, SamplerConfig};
use crate::stats::{chain_stats, ChainStats};
use crate::terminator::Terminator;

use itertools::Itertools;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Number of MCMC steps performed by the fit entry points
pub const DEFAULT_STEPS: usize = 20000;

/// Initial guess for the noise-like parameter the fit entry points append
const APPENDED_PARAMETER: Parameter = Parameter {
    value: 1.0,
    scale: 0.5,
    frozen: false,
};

/// Result of a fit entry point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Posterior mean of every parameter
    pub params: Array1<f64>,
    /// Posterior standard deviation of every parameter
    pub errors: Array1<f64>,
    /// Posterior covariance matrix
    pub covariance: Array2<f64>,
}

impl From<ChainStats> for FitResult {
    fn from(stats: ChainStats) -> Self {
        Self {
            params: stats.mean,
            errors: stats.std_err,
            covariance: stats.covariance,
        }
    }
}

/// Fit `model` to `(x, y)` points sharing a single unknown Gaussian error
///
/// `p0` holds the initial guesses of the model parameters; the unknown noise
/// scale is appended internally and reported as the trailing entry of the
/// result.
pub fn fit_constant_error<F>(
    x: &[f64],
    y: &[f64],
    p0: &[Parameter],
    model: F,
) -> Result<FitResult, FitError>
where
    F: Fn(&[f64], f64) -> f64,
{
    check_lengths(&[x.len(), y.len()], "x and y")?;
    let ln_pdf = ConstantErrorLnPdf::new(x, y, model);
    run_fit(&ln_pdf, &with_appended(p0))
}

/// Fit `model` to `(x, y)` points with known per-point errors `yerr`
pub fn fit_known_error<F>(
    x: &[f64],
    y: &[f64],
    yerr: &[f64],
    p0: &[Parameter],
    model: F,
) -> Result<FitResult, FitError>
where
    F: Fn(&[f64], f64) -> f64,
{
    check_lengths(&[x.len(), y.len(), yerr.len()], "x, y and yerr")?;
    let ln_pdf = KnownErrorLnPdf::new(x, y, yerr, model);
    run_fit(&ln_pdf, p0)
}

/// Fit `model` to `(x, y)` points with known errors `yerr` plus an unknown
/// intrinsic scatter
///
/// The scatter parameter is appended internally and reported as the trailing
/// entry of the result.
pub fn fit_scatter_error<F>(
    x: &[f64],
    y: &[f64],
    yerr: &[f64],
    p0: &[Parameter],
    model: F,
) -> Result<FitResult, FitError>
where
    F: Fn(&[f64], f64) -> f64,
{
    check_lengths(&[x.len(), y.len(), yerr.len()], "x, y and yerr")?;
    let ln_pdf = ScatterErrorLnPdf::new(x, y, yerr, model);
    run_fit(&ln_pdf, &with_appended(p0))
}

fn run_fit(ln_pdf: &impl LnPdf, p0: &[Parameter]) -> Result<FitResult, FitError> {
    let mut sampler = EnsembleSampler::new(SamplerConfig::default())?;
    sampler.run(ln_pdf, p0, &[Terminator::fixed_steps(DEFAULT_STEPS)])?;
    let samples = sampler.samples()?;
    Ok(chain_stats(&samples)?.into())
}

fn with_appended(p0: &[Parameter]) -> Vec<Parameter> {
    p0.iter()
        .copied()
        .chain(std::iter::once(APPENDED_PARAMETER))
        .collect_vec()
}

fn check_lengths(lens: &[usize], what: &'static str) -> Result<(), FitError> {
    if lens.iter().all_equal() {
        Ok(())
    } else {
        Err(FitError::LengthMismatch(what))
    }
}
