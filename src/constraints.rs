//! Constraint quotients and the composition polynomial.
//!
//! With `f` the trace polynomial, `G` the trace subgroup and `n` the trace
//! length, the statement reduces to three quotients that are polynomials
//! exactly when the trace is valid:
//!
//! ```text
//! p0 = (f(X) - a[0])    / (X - G[0])
//! p1 = (f(X) - a[n-1])  / (X - G[n-1])
//! p2 = (f(G[2]X) - f(G[1]X)^2 - f(X)^2) / ∏_{i < n-2} (X - G[i])
//! ```
//!
//! The transition denominator is computed as `(X^|G| - 1)` divided by the
//! points where the recurrence is not enforced.

use crate::channel::Channel;
use crate::error::{StarkError, StarkResult};
use crate::field::FieldElement;
use crate::polynomial::Polynomial;

/// The three constraint quotients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraints {
    /// First trace value.
    pub first: Polynomial,
    /// Last trace value equals the claimed output.
    pub last: Polynomial,
    /// The FibonacciSq recurrence holds between consecutive steps.
    pub transition: Polynomial,
}

impl Constraints {
    /// Builds the quotients for `trace_poly` interpolated over `domain`.
    ///
    /// `trace_length` values were interpolated at `domain[..trace_length]`.
    pub fn build(
        trace_poly: &Polynomial,
        domain: &[FieldElement],
        trace_length: usize,
        first: FieldElement,
        claimed_output: FieldElement,
    ) -> StarkResult<Self> {
        let x = Polynomial::x();
        let linear = |point: FieldElement| &x - &Polynomial::constant(point);
        let quotient =
            |constraint: &'static str, numerator: &Polynomial, denominator: &Polynomial| {
                numerator
                    .div_exact(denominator)
                    .map_err(|source| StarkError::TraceInvalid { constraint, source })
            };

        let first_numerator = trace_poly - &Polynomial::constant(first);
        let first = quotient("first value", &first_numerator, &linear(domain[0]))?;

        let last_point = domain[trace_length - 1];
        let last_numerator = trace_poly - &Polynomial::constant(claimed_output);
        let last = quotient("claimed output", &last_numerator, &linear(last_point))?;

        let transition_numerator = &(&trace_poly.compose_linear(domain[2])
            - &trace_poly.compose_linear(domain[1]).pow(2))
            - &trace_poly.pow(2);
        let transition_denominator = transition_denominator(domain, trace_length)?;
        let transition = quotient("transition", &transition_numerator, &transition_denominator)?;

        log::debug!(
            "constraint degrees: first {:?}, last {:?}, transition {:?}",
            first.degree(),
            last.degree(),
            transition.degree()
        );
        Ok(Self {
            first,
            last,
            transition,
        })
    }

    /// Draws three coefficients and returns `a0·p0 + a1·p1 + a2·p2`.
    ///
    /// Must be called right after the trace root has been mixed into
    /// `channel`.
    pub fn compose(&self, channel: &mut Channel) -> StarkResult<(Polynomial, [FieldElement; 3])> {
        let mut coefficients = [FieldElement::ZERO; 3];
        for (k, slot) in coefficients.iter_mut().enumerate() {
            *slot = channel.receive_random_field_element(&format!(
                "composition polynomial coefficient #{k}"
            ))?;
        }
        let [a0, a1, a2] = coefficients;
        let composition =
            &(&self.first.scale(a0) + &self.last.scale(a1)) + &self.transition.scale(a2);
        Ok((composition, coefficients))
    }
}

/// `∏ (X - G[i])` over the steps where the recurrence must hold.
fn transition_denominator(domain: &[FieldElement], trace_length: usize) -> StarkResult<Polynomial> {
    let one = Polynomial::constant(FieldElement::ONE);
    let all = &Polynomial::monomial(domain.len(), FieldElement::ONE) - &one;
    let excluded = Polynomial::vanishing(&domain[trace_length - 2..]);
    Ok(all.div_exact(&excluded)?)
}
