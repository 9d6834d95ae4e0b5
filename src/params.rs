use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single model parameter passed to [crate::EnsembleSampler::run]
///
/// `value` is the initial guess, `scale` the amplitude of the uniform scatter
/// applied to it when the walker ensemble is initialized. Walkers start at
/// `value + U(-scale, scale)`, independently per walker and per parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Parameter {
    /// Initial value
    pub value: f64,
    /// Characteristic scale of the initial walker scatter
    pub scale: f64,
    /// Reserved; frozen parameters are not yet pinned during updates
    #[serde(default)]
    pub frozen: bool,
}

impl Parameter {
    pub fn new(value: f64, scale: f64) -> Self {
        Self {
            value,
            scale,
            frozen: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_not_frozen() {
        assert!(!Parameter::new(1.0, 0.1).frozen);
    }

    #[test]
    fn frozen_defaults_to_false_in_json() {
        let param: Parameter = serde_json::from_str(r#"{"value": 2.0, "scale": 0.5}"#).unwrap();
        assert_eq!(param, Parameter::new(2.0, 0.5));
    }
}
