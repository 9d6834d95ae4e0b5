/// Error returned from [crate::EnsembleSampler]
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SamplerError {
    #[error("the number of walkers must be even and at least 2, got {0}")]
    InvalidWalkerCount(usize),

    #[error("the stretch scale must be greater than unity, got {0}")]
    InvalidStretchScale(f64),

    #[error("at least one parameter is required")]
    EmptyParameters,

    #[error("at least one terminator is required")]
    NoTerminators,

    #[error("the sampler has not completed a run yet")]
    NotRun,

    #[error("chain of {n_steps} steps is shorter than the burn-in length {burn_in}")]
    ChainTooShort { n_steps: usize, burn_in: usize },
}

/// Error returned from [crate::chain_stats]
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("sample sequences must be non-empty")]
    EmptySamples,
}

/// Error returned from the fit entry points
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FitError {
    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error("data arrays must have equal lengths: {0}")]
    LengthMismatch(&'static str),
}
