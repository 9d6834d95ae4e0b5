#![doc = include_str!("../README.md")]

mod autocorr;
pub use autocorr::{AutocorrTimeEstimator, SokalEstimator};

mod error;
pub use error::{FitError, SamplerError, StatsError};

mod fit;
pub use fit::{fit_constant_error, fit_known_error, fit_scatter_error, FitResult, DEFAULT_STEPS};

mod ln_pdf;
pub use ln_pdf::{ConstantErrorLnPdf, KnownErrorLnPdf, LnPdf, ScatterErrorLnPdf};

mod params;
pub use params::Parameter;

mod sampler;
pub use sampler::{EnsembleSampler, SamplerConfig};

mod stats;
pub use stats::{chain_covariance, chain_mean, chain_stats, ChainStats, SortedSamples};

mod terminator;
pub use terminator::{FixedSteps, Terminator, TerminatorTrait};

mod types;
pub use types::{ArrayRef1, ArrayRef2};

pub use ndarray;
