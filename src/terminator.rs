use enum_dispatch::enum_dispatch;
use ndarray::Array2;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stopping rule consulted by [crate::EnsembleSampler::run] after every
/// completed step
///
/// `chain` holds one position matrix (walker x dimension) per recorded step,
/// the initial ensemble included. A run stops as soon as any of the supplied
/// terminators returns `true`.
#[enum_dispatch]
pub trait TerminatorTrait {
    fn stop(&self, chain: &[Array2<f64>]) -> bool;
}

/// Stopping rule for the MCMC run
#[enum_dispatch(TerminatorTrait)]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Terminator {
    FixedSteps(FixedSteps),
}

impl Terminator {
    pub fn fixed_steps(n: usize) -> Self {
        FixedSteps::new(n).into()
    }
}

/// Stop once the number of completed steps exceeds `n`
///
/// A run terminated by `FixedSteps::new(n)` alone records exactly `n`
/// completed steps, a chain history of `n + 1` entries.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct FixedSteps {
    pub n: usize,
}

impl FixedSteps {
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl TerminatorTrait for FixedSteps {
    fn stop(&self, chain: &[Array2<f64>]) -> bool {
        // the history holds the initial ensemble plus one entry per step
        chain.len() > self.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(len: usize) -> Vec<Array2<f64>> {
        (0..len).map(|_| Array2::zeros((2, 1))).collect()
    }

    #[test]
    fn fixed_steps_counts_completed_steps() {
        let term = Terminator::fixed_steps(3);
        assert!(!term.stop(&history(1))); // initial state only, 0 steps done
        assert!(!term.stop(&history(3))); // 2 steps done
        assert!(term.stop(&history(4))); // 3 steps done
    }

    #[test]
    fn serialization_round_trip() {
        let term = Terminator::fixed_steps(20000);
        let de: Terminator = serde_json::from_str(&serde_json::to_string(&term).unwrap()).unwrap();
        assert_eq!(term, de);
    }
}
