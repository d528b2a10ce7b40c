//! FibonacciSq execution trace.
//!
//! The computation being proven is the recurrence
//! `a[n] = a[n-2]^2 + a[n-1]^2` over the prime field.

use crate::config::ProverConfig;
use crate::field::FieldElement;

/// Parameters of a FibonacciSq trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FibSquare {
    /// `a[0]`.
    pub first: FieldElement,
    /// `a[1]`.
    pub second: FieldElement,
    /// Number of values to generate.
    pub length: usize,
}

impl FibSquare {
    /// Reads the trace parameters from a prover configuration.
    pub fn from_config(config: &ProverConfig) -> Self {
        Self {
            first: FieldElement::new(config.first),
            second: FieldElement::new(config.second),
            length: config.trace_length,
        }
    }

    /// Generates the trace values.
    pub fn generate(&self) -> Vec<FieldElement> {
        let mut trace = Vec::with_capacity(self.length);
        trace.extend([self.first, self.second].into_iter().take(self.length));
        while trace.len() < self.length {
            let n = trace.len();
            let (a, b) = (trace[n - 2], trace[n - 1]);
            trace.push(a * a + b * b);
        }
        trace
    }
}

impl Default for FibSquare {
    fn default() -> Self {
        Self::from_config(&ProverConfig::default())
    }
}
