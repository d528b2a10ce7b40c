//! FRI commitment phase.
//!
//! Each round draws `beta` from the channel and folds
//! `p(X) = even(X^2) + X·odd(X^2)` into `even(X) + beta·odd(X)`, which at
//! least halves the degree, while the domain shrinks to the squares of its
//! first half.  The loop stops once the polynomial is a constant.

use crate::channel::{Channel, Mix};
use crate::domain::{evaluate_over, next_fri_domain};
use crate::error::StarkResult;
use crate::field::FieldElement;
use crate::merkle::MerkleTree;
use crate::polynomial::Polynomial;

/// One committed FRI layer.
#[derive(Debug, Clone)]
pub struct FriLayer {
    /// Polynomial of this layer.
    pub polynomial: Polynomial,
    /// Evaluation domain of this layer.
    pub domain: Vec<FieldElement>,
    /// `polynomial` evaluated over `domain`.
    pub evaluations: Vec<FieldElement>,
    /// Commitment to `evaluations`.
    pub tree: MerkleTree,
}

impl FriLayer {
    /// Evaluates `polynomial` over `domain` and commits to the result.
    pub fn commit(
        polynomial: Polynomial,
        domain: Vec<FieldElement>,
        parallel_threshold: usize,
    ) -> Self {
        let evaluations = evaluate_over(&polynomial, &domain, parallel_threshold);
        let tree = MerkleTree::build(&evaluations);
        Self {
            polynomial,
            domain,
            evaluations,
            tree,
        }
    }

    /// Number of committed evaluations.
    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    /// Returns `true` if the layer has no evaluations.
    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    /// Folds this layer with `beta` into the next one.
    pub fn fold(&self, beta: FieldElement, parallel_threshold: usize) -> Self {
        Self::commit(
            next_fri_polynomial(&self.polynomial, beta),
            next_fri_domain(&self.domain),
            parallel_threshold,
        )
    }
}

/// Returns `even(X) + beta·odd(X)`.
pub fn next_fri_polynomial(poly: &Polynomial, beta: FieldElement) -> Polynomial {
    let (even, odd) = poly.split_even_odd();
    &even + &odd.scale(beta)
}

/// All FRI layers, the composition layer first, with their folding coefficients.
#[derive(Debug, Clone)]
pub struct FriCommitment {
    /// Committed layers; the last one is constant.
    pub layers: Vec<FriLayer>,
    /// `betas[i]` folds `layers[i]` into `layers[i + 1]`.
    pub betas: Vec<FieldElement>,
}

impl FriCommitment {
    /// Runs the folding loop starting from the already committed `first` layer.
    ///
    /// Every non-constant layer root is mixed into `channel` before the next
    /// beta is drawn; the constant term of the last layer is sent mixed once
    /// the loop ends.
    pub fn build(
        first: FriLayer,
        channel: &mut Channel,
        parallel_threshold: usize,
    ) -> StarkResult<Self> {
        let mut layers = vec![first];
        let mut betas = Vec::new();
        while let Some(current) = layers.last().filter(|l| is_foldable(&l.polynomial)) {
            let round = layers.len();
            let beta =
                channel.receive_random_field_element(&format!("fri polynomial beta #{round}"))?;
            let next = current.fold(beta, parallel_threshold);
            if is_foldable(&next.polynomial) {
                channel.send(format!("fri layer merkle root #{round}"), next.tree.root(), Mix::Yes);
            }
            log::debug!(
                "fri layer {round}: degree {:?}, {} evaluations",
                next.polynomial.degree(),
                next.len()
            );
            layers.push(next);
            betas.push(beta);
        }
        let commitment = Self { layers, betas };
        channel.send("last fri layer", commitment.last_value(), Mix::Yes);
        Ok(commitment)
    }

    /// Constant value of the final layer.
    pub fn last_value(&self) -> FieldElement {
        self.layers
            .last()
            .map(|layer| layer.polynomial.free_term())
            .unwrap_or(FieldElement::ZERO)
    }
}

fn is_foldable(poly: &Polynomial) -> bool {
    matches!(poly.degree(), Some(d) if d > 0)
}
