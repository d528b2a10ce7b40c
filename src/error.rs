//! Crate-wide error type.
//!
//! Every failure is fatal for the proof being generated: stages return
//! `Result<_, StarkError>` and the pipeline stops at the first error.

use thiserror::Error;

use crate::field::FieldError;
use crate::merkle::CommitmentError;
use crate::polynomial::PolynomialError;

/// Result alias used across the prover.
pub type StarkResult<T> = Result<T, StarkError>;

/// Errors surfaced by proof generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StarkError {
    /// Field arithmetic failed.
    #[error("field error: {0}")]
    Field(#[from] FieldError),
    /// Polynomial arithmetic failed outside of constraint construction.
    #[error("polynomial error: {0}")]
    Polynomial(#[from] PolynomialError),
    /// A commitment could not be opened.
    #[error("commitment error: {0}")]
    Commitment(#[from] CommitmentError),
    /// A constraint quotient did not divide exactly: the trace does not
    /// satisfy the claimed computation.
    #[error("trace does not satisfy the {constraint} constraint: {source}")]
    TraceInvalid {
        /// Which constraint failed.
        constraint: &'static str,
        /// The underlying division failure.
        source: PolynomialError,
    },
    /// Randomness was requested before its prerequisite messages were mixed in.
    #[error("protocol order violated: {0}")]
    ProtocolOrder(&'static str),
    /// A random integer was requested from an empty range.
    #[error("empty random range [{low}, {high}]")]
    InvalidRange {
        /// Inclusive lower bound.
        low: u64,
        /// Inclusive upper bound.
        high: u64,
    },
    /// A proof record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The prover configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
