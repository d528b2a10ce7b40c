//! Evaluation domains.
//!
//! Trace values live on a multiplicative subgroup; commitments are made on a
//! left coset `g·H` of a larger subgroup, which never meets the trace
//! domain.  Each FRI round squares the first half of its domain, halving it.

use crate::error::StarkResult;
use crate::field::FieldElement;
use crate::polynomial::Polynomial;
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

/// The cyclic subgroup of the given order, in generator-power order.
pub fn subgroup(order: usize) -> StarkResult<Vec<FieldElement>> {
    let g = FieldElement::subgroup_generator(order as u64)?;
    Ok(powers(g, order))
}

/// The coset `generator · H` of the subgroup `H` of the given order.
pub fn left_coset(order: usize) -> StarkResult<Vec<FieldElement>> {
    let shift = FieldElement::generator();
    Ok(subgroup(order)?.into_iter().map(|x| shift * x).collect())
}

/// Squares the first half of `domain`.
pub fn next_fri_domain(domain: &[FieldElement]) -> Vec<FieldElement> {
    domain[..domain.len() / 2].iter().map(|&x| x * x).collect()
}

/// Evaluates `poly` at every point of `domain`, preserving domain order.
///
/// Domains with at least `parallel_threshold` points are evaluated with rayon
/// when more than one worker thread is available.
pub fn evaluate_over(
    poly: &Polynomial,
    domain: &[FieldElement],
    parallel_threshold: usize,
) -> Vec<FieldElement> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if domain.len() >= parallel_threshold && rayon::current_num_threads() > 1 {
            return domain.par_iter().map(|&x| poly.eval(x)).collect();
        }
    }
    #[cfg(target_arch = "wasm32")]
    let _ = parallel_threshold;
    domain.iter().map(|&x| poly.eval(x)).collect()
}

fn powers(base: FieldElement, count: usize) -> Vec<FieldElement> {
    let mut out = Vec::with_capacity(count);
    let mut current = FieldElement::ONE;
    for _ in 0..count {
        out.push(current);
        current *= base;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StarkError;
    use crate::field::FieldError;
    use std::collections::HashSet;

    #[test]
    fn subgroup_is_closed_and_distinct() {
        let h = subgroup(64).unwrap();
        let set: HashSet<_> = h.iter().copied().collect();
        assert_eq!(set.len(), 64);
        assert!(set.contains(&(h[5] * h[61])));
        assert_eq!(h[1].pow(64), FieldElement::ONE);
    }

    #[test]
    fn coset_is_disjoint_from_trace_domain() {
        let trace_domain: HashSet<_> = subgroup(128).unwrap().into_iter().collect();
        let coset = left_coset(1024).unwrap();
        assert_eq!(coset.len(), 1024);
        assert!(coset.iter().all(|x| !trace_domain.contains(x)));
    }

    #[test]
    fn fri_domain_halves_and_pairs_opposites() {
        let coset = left_coset(32).unwrap();
        // x and -x sit half a domain apart.
        assert_eq!(coset[3 + 16], -coset[3]);
        let next = next_fri_domain(&coset);
        assert_eq!(next.len(), 16);
        assert_eq!(next[3], coset[3] * coset[3]);
        assert_eq!(next[3], coset[19] * coset[19]);
    }

    #[test]
    fn parallel_and_sequential_evaluation_agree() {
        let poly = Polynomial::new((1..40).map(FieldElement::new).collect());
        let domain = left_coset(256).unwrap();
        let sequential = evaluate_over(&poly, &domain, usize::MAX);
        let parallel = evaluate_over(&poly, &domain, 0);
        assert_eq!(sequential, parallel);
        assert_eq!(sequential[7], poly.eval(domain[7]));
    }

    #[test]
    fn order_must_divide_group_order() {
        assert_eq!(
            subgroup(1000),
            Err(StarkError::Field(FieldError::InvalidSubgroupOrder(1000)))
        );
    }
}
