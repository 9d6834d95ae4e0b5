//! Affine-invariant ensemble sampler
//!
//! The implementation follows Goodman & Weare (2010): the ensemble is split
//! into two complementary walker groups, and every walker is updated with a
//! "stretch move" along the line connecting it to a randomly drawn partner
//! from the other group. The scale factor `z` is drawn from the density
//! `g(z) ~ 1/sqrt(z)` on `[1/a, a]`, where `a` is the stretch scale, and the
//! proposal is accepted with probability `min(1, z^(D-1) * exp(ln_pdf(Y) -
//! ln_pdf(X)))`. Sampling the two groups in turn keeps the update a valid
//! two-block sweep: the second group's partners are drawn from the first
//! group's already-updated positions.
//!
//! After the run the sampler estimates the integrated autocorrelation time of
//! every dimension from an ensemble-summed proxy series, derives a thinning
//! interval from the largest estimate, and discards twenty thinning intervals
//! as burn-in.

use crate::autocorr::{AutocorrTimeEstimator, SokalEstimator};
use crate::error::SamplerError;
use crate::ln_pdf::LnPdf;
use crate::params::Parameter;
use crate::terminator::{Terminator, TerminatorTrait};

use log::{debug, warn};
use ndarray::{s, Array1, Array2, Zip};
use rand::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Thinning interval used when the autocorrelation-time estimate is unusable
const FALLBACK_SKIP: usize = 50;

/// Number of thinning intervals discarded as burn-in
const BURN_IN_SKIPS: usize = 20;

/// Configuration of [EnsembleSampler]
///
/// A fresh default value is constructed per use; there is no shared mutable
/// default.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SamplerConfig {
    /// Number of walkers in the ensemble; must be even and at least 2
    #[serde(default = "SamplerConfig::default_nwalkers")]
    pub nwalkers: usize,
    /// Stretch-move scale parameter `a`; must be greater than unity
    #[serde(default = "SamplerConfig::default_stretch")]
    pub stretch: f64,
    /// Seed of the internal random generator; drawn from the OS when `None`
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SamplerConfig {
    #[inline]
    pub fn default_nwalkers() -> usize {
        100
    }

    #[inline]
    pub fn default_stretch() -> f64 {
        2.0
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            nwalkers: Self::default_nwalkers(),
            stretch: Self::default_stretch(),
            seed: None,
        }
    }
}

/// Sample `z` from `g(z) ~ 1/sqrt(z)` on `[1/stretch, stretch]` by inverse
/// transform of a uniform draw `u`
#[inline]
fn stretch_z(stretch: f64, u: f64) -> f64 {
    let zf = (stretch - 1.0) * u;
    (1.0 + zf) * (1.0 + zf) / stretch
}

/// Affine-invariant ensemble MCMC sampler
///
/// The sampler owns the walker state and the full chain history. [Self::run]
/// drives initialization, iteration until a [Terminator] fires, and the
/// autocorrelation-based choice of the thinning interval; [Self::samples]
/// then extracts thinned, de-correlated samples for statistics.
pub struct EnsembleSampler {
    nwalkers: usize,
    stretch: f64,
    rng: StdRng,
    estimator: Box<dyn AutocorrTimeEstimator>,
    dim: usize,
    /// One (nwalkers, dim) position matrix per recorded step; walkers
    /// `0..nwalkers/2` form the first group, the rest the second
    chain: Vec<Array2<f64>>,
    /// Log-density of every walker's most recently recorded position
    ln_prob: Array1<f64>,
    n_accept: u64,
    n_attempt: u64,
    skip: Option<usize>,
}

impl EnsembleSampler {
    pub fn new(config: SamplerConfig) -> Result<Self, SamplerError> {
        if config.nwalkers < 2 || config.nwalkers % 2 != 0 {
            return Err(SamplerError::InvalidWalkerCount(config.nwalkers));
        }
        if !(config.stretch > 1.0) {
            return Err(SamplerError::InvalidStretchScale(config.stretch));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            nwalkers: config.nwalkers,
            stretch: config.stretch,
            rng,
            estimator: Box::new(SokalEstimator::default()),
            dim: 0,
            chain: Vec::new(),
            ln_prob: Array1::zeros(0),
            n_accept: 0,
            n_attempt: 0,
            skip: None,
        })
    }

    /// Replace the autocorrelation-time estimator used to pick the thinning
    /// interval
    pub fn with_estimator(mut self, estimator: impl AutocorrTimeEstimator + 'static) -> Self {
        self.estimator = Box::new(estimator);
        self
    }

    /// Run the full sampling sequence
    ///
    /// Initializes the ensemble around the initial parameter values, iterates
    /// stretch-move steps until any terminator fires, then derives the
    /// thinning interval and burn-in length from the per-dimension
    /// autocorrelation times. An unusable estimate falls back to a fixed
    /// interval of 50 steps.
    pub fn run(
        &mut self,
        ln_pdf: &impl LnPdf,
        params: &[Parameter],
        terminators: &[Terminator],
    ) -> Result<(), SamplerError> {
        if params.is_empty() {
            return Err(SamplerError::EmptyParameters);
        }
        if terminators.is_empty() {
            return Err(SamplerError::NoTerminators);
        }

        self.init(ln_pdf, params);
        let step_limit = terminators
            .iter()
            .map(|term| match term {
                Terminator::FixedSteps(fixed) => fixed.n,
            })
            .min();
        if let Some(n) = step_limit {
            self.chain.reserve(n + 1);
        }
        while !terminators.iter().any(|term| term.stop(&self.chain)) {
            self.step(ln_pdf);
        }

        let max_time = self
            .autocorrelation_times()
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);
        let skip = max_time.ceil();
        self.skip = Some(if skip.is_finite() && skip > 0.0 {
            skip as usize
        } else {
            warn!("unusable autocorrelation time {max_time}, thinning every {FALLBACK_SKIP} steps");
            FALLBACK_SKIP
        });
        debug!(
            "run finished: {} steps, acceptance fraction {:.3}, thinning interval {}",
            self.n_steps(),
            self.acceptance_fraction(),
            self.skip.unwrap_or(FALLBACK_SKIP),
        );
        Ok(())
    }

    fn init(&mut self, ln_pdf: &impl LnPdf, params: &[Parameter]) {
        self.dim = params.len();
        self.chain.clear();
        self.skip = None;
        self.n_accept = 0;
        self.n_attempt = 0;

        let mut positions = Array2::zeros((self.nwalkers, self.dim));
        let mut ln_prob = Array1::zeros(self.nwalkers);
        for w in 0..self.nwalkers {
            for (x, param) in positions.row_mut(w).iter_mut().zip(params) {
                *x = param.value + (self.rng.random::<f64>() * 2.0 - 1.0) * param.scale;
            }
            ln_prob[w] = ln_pdf.ln_pdf(positions.row(w).as_slice().expect("row is contiguous"));
        }
        self.ln_prob = ln_prob;
        self.chain.push(positions);
    }

    /// Advance every walker once: first group, then second group against the
    /// first group's fresh positions
    fn step(&mut self, ln_pdf: &impl LnPdf) {
        let half = self.nwalkers / 2;
        let mut positions = self
            .chain
            .last()
            .expect("chain is initialized before stepping")
            .clone();

        for group in 0..2 {
            let other = 1 - group;
            for j in 0..half {
                let walker = group * half + j;
                let partner = other * half + self.rng.random_range(0..half);
                let zr = stretch_z(self.stretch, self.rng.random::<f64>());

                // TODO: honor Parameter::frozen by pinning those dimensions here
                let src = positions.row(walker).to_owned();
                let target = positions.row(partner).to_owned();
                let proposal =
                    Zip::from(&src).and(&target).map_collect(|&s, &t| t + zr * (s - t));
                let ln_prob_new =
                    ln_pdf.ln_pdf(proposal.as_slice().expect("proposal is contiguous"));

                let ln_accept =
                    (self.dim - 1) as f64 * zr.ln() + ln_prob_new - self.ln_prob[walker];
                self.n_attempt += 1;
                if self.rng.random::<f64>().ln() < ln_accept {
                    self.n_accept += 1;
                    positions.row_mut(walker).assign(&proposal);
                    self.ln_prob[walker] = ln_prob_new;
                }
                // a rejected walker keeps its position; the step still
                // records it again, advancing the chain in lock-step
            }
        }

        self.chain.push(positions);
    }

    /// Integrated autocorrelation time of every dimension
    ///
    /// Each dimension's time series is formed by summing the first walker
    /// group's positions at every recorded step, a cheap proxy for the mixing
    /// of the whole ensemble.
    pub fn autocorrelation_times(&self) -> Vec<f64> {
        let half = self.nwalkers / 2;
        (0..self.dim)
            .map(|i| {
                let series: Vec<f64> = self
                    .chain
                    .iter()
                    .map(|step| step.slice(s![..half, i]).sum())
                    .collect();
                self.estimator.autocorr_time(&series)
            })
            .collect()
    }

    /// Thinned post-burn-in samples, one row per dimension
    ///
    /// Walks the chain history from the burn-in index in steps of the
    /// thinning interval and collects the first walker group's positions.
    pub fn samples(&self) -> Result<Array2<f64>, SamplerError> {
        let skip = self.skip.ok_or(SamplerError::NotRun)?;
        let burn_in = BURN_IN_SKIPS * skip;
        if burn_in >= self.chain.len() {
            return Err(SamplerError::ChainTooShort {
                n_steps: self.n_steps(),
                burn_in,
            });
        }

        let half = self.nwalkers / 2;
        let n_retained = (self.chain.len() - burn_in).div_ceil(skip);
        let mut out = Array2::zeros((self.dim, n_retained * half));
        for (retained, step) in self.chain[burn_in..].iter().step_by(skip).enumerate() {
            for w in 0..half {
                out.slice_mut(s![.., retained * half + w])
                    .assign(&step.row(w));
            }
        }
        Ok(out)
    }

    /// Chain history: one (nwalkers, dim) position matrix per recorded step
    pub fn chain(&self) -> &[Array2<f64>] {
        &self.chain
    }

    /// Log-density of every walker's current position
    pub fn ln_prob(&self) -> &Array1<f64> {
        &self.ln_prob
    }

    /// Number of completed steps
    pub fn n_steps(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    pub fn nwalkers(&self) -> usize {
        self.nwalkers
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Thinning interval chosen after the run
    pub fn skip(&self) -> Option<usize> {
        self.skip
    }

    /// Burn-in length chosen after the run
    pub fn burn_in(&self) -> Option<usize> {
        self.skip.map(|skip| BURN_IN_SKIPS * skip)
    }

    /// Fraction of proposals accepted so far
    pub fn acceptance_fraction(&self) -> f64 {
        if self.n_attempt == 0 {
            0.0
        } else {
            self.n_accept as f64 / self.n_attempt as f64
        }
    }
}
