//! Prover configuration.
//!
//! The defaults reproduce the FibonacciSq statement: 1023 trace values over
//! a 1024-element subgroup, committed on an 8× larger coset.

use serde::{Deserialize, Serialize};

use crate::error::{StarkError, StarkResult};
use crate::field::GROUP_ORDER;

/// Parameters of a proving run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Order of the trace subgroup.
    pub domain_size: usize,
    /// Blow-up factor of the extended evaluation domain.
    pub extension_factor: usize,
    /// Number of trace values.
    pub trace_length: usize,
    /// First trace value, `a[0]`.
    pub first: u64,
    /// Second trace value, `a[1]`.
    pub second: u64,
    /// Claimed last trace value, `a[trace_length - 1]`.
    pub claimed_output: u64,
    /// Minimum domain size evaluated with rayon.
    pub parallel_threshold: usize,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            domain_size: 1024,
            extension_factor: 8,
            trace_length: 1023,
            first: 1,
            second: 3141592,
            claimed_output: 2338775057,
            parallel_threshold: 4096,
        }
    }
}

impl ProverConfig {
    /// Parses a configuration from JSON; missing fields take their defaults.
    pub fn from_json_str(input: &str) -> StarkResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|err| StarkError::InvalidConfig(format!("invalid config JSON: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Size of the extended evaluation domain.
    pub fn extended_size(&self) -> usize {
        self.domain_size * self.extension_factor
    }

    /// Checks that the domains exist and the trace fits in them.
    pub fn validate(&self) -> StarkResult<()> {
        if !self.domain_size.is_power_of_two() || self.domain_size < 4 {
            return Err(StarkError::InvalidConfig(format!(
                "domain size {} must be a power of two of at least 4",
                self.domain_size
            )));
        }
        if !self.extension_factor.is_power_of_two() || self.extension_factor < 2 {
            return Err(StarkError::InvalidConfig(format!(
                "extension factor {} must be a power of two of at least 2",
                self.extension_factor
            )));
        }
        let extended = self
            .domain_size
            .checked_mul(self.extension_factor)
            .ok_or_else(|| StarkError::InvalidConfig("extended domain overflows".into()))?;
        if GROUP_ORDER % extended as u64 != 0 {
            return Err(StarkError::InvalidConfig(format!(
                "extended domain size {extended} does not divide the group order"
            )));
        }
        if self.trace_length < 3 || self.trace_length >= self.domain_size {
            return Err(StarkError::InvalidConfig(format!(
                "trace length {} must lie in [3, {})",
                self.trace_length, self.domain_size
            )));
        }
        Ok(())
    }
}
