//! Dense univariate polynomials over the prime field.
//!
//! A [`Polynomial`] stores its coefficients lowest degree first and never
//! keeps trailing zero coefficients, so the zero polynomial is the empty
//! coefficient vector and has no degree.  Besides ring arithmetic the type
//! offers Horner evaluation, the linear substitution `p(c·X)`, exact
//! division for building constraint quotients and Lagrange interpolation.

use std::collections::HashSet;
use std::ops::{Add, Mul, Neg, Sub};

use thiserror::Error;

use crate::field::FieldElement;

/// Failures raised by polynomial arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolynomialError {
    /// The divisor was the zero polynomial.
    #[error("division by the zero polynomial")]
    DivisionByZero,
    /// An exact division left a non-zero remainder.
    #[error("exact division left a remainder of degree {remainder_degree}")]
    NonZeroRemainder {
        /// Degree of the remainder that should have vanished.
        remainder_degree: usize,
    },
    /// Two interpolation points shared the same x-coordinate.
    #[error("duplicate interpolation point x = {0}")]
    DuplicateInterpolationPoint(FieldElement),
    /// Interpolation received a different number of x and y values.
    #[error("interpolation given {xs} x-coordinates but {ys} values")]
    LengthMismatch {
        /// Number of x-coordinates.
        xs: usize,
        /// Number of y-values.
        ys: usize,
    },
}

/// A polynomial with coefficients in [`FieldElement`], lowest degree first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Polynomial {
    coeffs: Vec<FieldElement>,
}

impl Polynomial {
    /// Creates a polynomial from coefficients, dropping trailing zeros.
    pub fn new(mut coeffs: Vec<FieldElement>) -> Self {
        while coeffs.last().map_or(false, |c| c.is_zero()) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    /// The zero polynomial.
    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    /// The constant polynomial `c`.
    pub fn constant(c: FieldElement) -> Self {
        Self::new(vec![c])
    }

    /// The monomial `X`.
    pub fn x() -> Self {
        Self::monomial(1, FieldElement::ONE)
    }

    /// The monomial `coeff·X^degree`.
    pub fn monomial(degree: usize, coeff: FieldElement) -> Self {
        let mut coeffs = vec![FieldElement::ZERO; degree + 1];
        coeffs[degree] = coeff;
        Self::new(coeffs)
    }

    /// The polynomial `∏ (X - x)` vanishing exactly on `points`.
    pub fn vanishing(points: &[FieldElement]) -> Self {
        let mut coeffs = Vec::with_capacity(points.len() + 1);
        coeffs.push(FieldElement::ONE);
        for &x in points {
            coeffs.push(FieldElement::ZERO);
            for k in (1..coeffs.len()).rev() {
                let lower = coeffs[k - 1];
                coeffs[k] += lower;
                coeffs[k - 1] = -(x * lower);
            }
        }
        Self::new(coeffs)
    }

    /// Coefficients, lowest degree first, without trailing zeros.
    pub fn coefficients(&self) -> &[FieldElement] {
        &self.coeffs
    }

    /// Returns `true` for the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree of the polynomial, or `None` (degree −∞) for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    /// Constant coefficient; zero for the zero polynomial.
    pub fn free_term(&self) -> FieldElement {
        self.coeffs.first().copied().unwrap_or(FieldElement::ZERO)
    }

    fn leading_coefficient(&self) -> Option<FieldElement> {
        self.coeffs.last().copied()
    }

    /// Evaluates the polynomial at `x` using Horner's method.
    pub fn eval(&self, x: FieldElement) -> FieldElement {
        self.coeffs
            .iter()
            .rev()
            .fold(FieldElement::ZERO, |acc, &c| acc * x + c)
    }

    /// Multiplies every coefficient by `c`.
    pub fn scale(&self, c: FieldElement) -> Self {
        Self::new(self.coeffs.iter().map(|&a| a * c).collect())
    }

    /// Returns `p(c·X)` by scaling coefficient `k` by `c^k`.
    pub fn compose_linear(&self, c: FieldElement) -> Self {
        let mut power = FieldElement::ONE;
        let coeffs = self
            .coeffs
            .iter()
            .map(|&a| {
                let scaled = a * power;
                power *= c;
                scaled
            })
            .collect();
        Self::new(coeffs)
    }

    /// Raises the polynomial to the `exponent`-th power.
    pub fn pow(&self, mut exponent: u32) -> Self {
        let mut base = self.clone();
        let mut result = Self::constant(FieldElement::ONE);
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = &result * &base;
            }
            exponent >>= 1;
            if exponent > 0 {
                base = &base * &base;
            }
        }
        result
    }

    /// Long division, returning `(quotient, remainder)`.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), PolynomialError> {
        let divisor_degree = divisor.degree().ok_or(PolynomialError::DivisionByZero)?;
        let lead_inv = divisor
            .leading_coefficient()
            .ok_or(PolynomialError::DivisionByZero)?
            .inverse()
            .map_err(|_| PolynomialError::DivisionByZero)?;
        let dividend_degree = match self.degree() {
            Some(d) if d >= divisor_degree => d,
            _ => return Ok((Self::zero(), self.clone())),
        };

        let mut remainder = self.coeffs.clone();
        let mut quotient = vec![FieldElement::ZERO; dividend_degree - divisor_degree + 1];
        for k in (0..quotient.len()).rev() {
            let coeff = remainder[k + divisor_degree] * lead_inv;
            quotient[k] = coeff;
            if coeff.is_zero() {
                continue;
            }
            for (j, &d) in divisor.coeffs.iter().enumerate() {
                remainder[k + j] -= coeff * d;
            }
        }
        remainder.truncate(divisor_degree);
        Ok((Self::new(quotient), Self::new(remainder)))
    }

    /// Divides by `divisor`, failing unless the division is exact.
    pub fn div_exact(&self, divisor: &Self) -> Result<Self, PolynomialError> {
        let (quotient, remainder) = self.div_rem(divisor)?;
        match remainder.degree() {
            None => Ok(quotient),
            Some(remainder_degree) => Err(PolynomialError::NonZeroRemainder { remainder_degree }),
        }
    }

    /// Synthetic division by `(X - z)`, returning `(quotient, p(z))`.
    pub fn divide_by_linear(&self, z: FieldElement) -> (Self, FieldElement) {
        let n = self.coeffs.len();
        if n == 0 {
            return (Self::zero(), FieldElement::ZERO);
        }
        let mut quotient = vec![FieldElement::ZERO; n - 1];
        let mut acc = FieldElement::ZERO;
        for k in (1..n).rev() {
            acc = acc * z + self.coeffs[k];
            quotient[k - 1] = acc;
        }
        let value = acc * z + self.coeffs[0];
        (Self::new(quotient), value)
    }

    /// Splits `p(X) = even(X^2) + X·odd(X^2)` into `(even, odd)`.
    pub fn split_even_odd(&self) -> (Self, Self) {
        let even = self.coeffs.iter().step_by(2).copied().collect();
        let odd = self.coeffs.iter().skip(1).step_by(2).copied().collect();
        (Self::new(even), Self::new(odd))
    }

    /// Returns the unique polynomial of degree `< xs.len()` through `(xs[i], ys[i])`.
    ///
    /// Lagrange interpolation over the vanishing polynomial `Z(X) = ∏(X - x_j)`:
    /// each basis numerator is `Z(X)/(X - x_i)`, normalised by its value at
    /// `x_i`.  Costs `O(n^2)` field operations.
    pub fn interpolate(xs: &[FieldElement], ys: &[FieldElement]) -> Result<Self, PolynomialError> {
        if xs.len() != ys.len() {
            return Err(PolynomialError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        let mut seen = HashSet::with_capacity(xs.len());
        for &x in xs {
            if !seen.insert(x) {
                return Err(PolynomialError::DuplicateInterpolationPoint(x));
            }
        }

        let vanishing = Self::vanishing(xs);
        let mut coeffs = vec![FieldElement::ZERO; xs.len()];
        for (&x, &y) in xs.iter().zip(ys) {
            if y.is_zero() {
                continue;
            }
            let (numerator, _) = vanishing.divide_by_linear(x);
            // Distinct points keep the denominator non-zero.
            let weight = y
                .checked_div(numerator.eval(x))
                .map_err(|_| PolynomialError::DuplicateInterpolationPoint(x))?;
            for (acc, &c) in coeffs.iter_mut().zip(numerator.coefficients()) {
                *acc += weight * c;
            }
        }
        Ok(Self::new(coeffs))
    }
}

impl From<Vec<FieldElement>> for Polynomial {
    fn from(coeffs: Vec<FieldElement>) -> Self {
        Self::new(coeffs)
    }
}

impl From<FieldElement> for Polynomial {
    fn from(c: FieldElement) -> Self {
        Self::constant(c)
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Polynomial {
        let (long, short) = if self.coeffs.len() >= rhs.coeffs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut coeffs = long.coeffs.clone();
        for (acc, &c) in coeffs.iter_mut().zip(&short.coeffs) {
            *acc += c;
        }
        Polynomial::new(coeffs)
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Polynomial {
        self + &(-rhs)
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial::new(self.coeffs.iter().map(|&c| -c).collect())
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        if self.is_zero() || rhs.is_zero() {
            return Polynomial::zero();
        }
        let mut coeffs = vec![FieldElement::ZERO; self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, &a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, &b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Polynomial::new(coeffs)
    }
}

impl Mul<FieldElement> for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: FieldElement) -> Polynomial {
        self.scale(rhs)
    }
}

impl Add for Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: Polynomial) -> Polynomial {
        &self + &rhs
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Polynomial) -> Polynomial {
        &self - &rhs
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: Polynomial) -> Polynomial {
        &self * &rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::MODULUS;
    use proptest::prelude::*;

    fn fe(v: u64) -> FieldElement {
        FieldElement::new(v)
    }

    fn poly(max_len: usize) -> impl Strategy<Value = Polynomial> {
        prop::collection::vec((0..MODULUS).prop_map(FieldElement::new), 0..max_len)
            .prop_map(Polynomial::new)
    }

    proptest! {
        #[test]
        fn ring_laws_hold_pointwise(p in poly(12), q in poly(12), x in 0..MODULUS) {
            let x = fe(x);
            prop_assert_eq!((&p + &q).eval(x), p.eval(x) + q.eval(x));
            prop_assert_eq!((&p - &q).eval(x), p.eval(x) - q.eval(x));
            prop_assert_eq!((&p * &q).eval(x), p.eval(x) * q.eval(x));
        }

        #[test]
        fn exact_division_round_trips(p in poly(10), q in poly(6)) {
            prop_assume!(!q.is_zero());
            let product = &p * &q;
            prop_assert_eq!(product.div_exact(&q).unwrap(), p);
        }

        #[test]
        fn interpolation_passes_through_points(
            xs in prop::collection::hash_set(0..MODULUS, 1..16),
            seed in 0..MODULUS,
        ) {
            let xs: Vec<_> = xs.into_iter().map(fe).collect();
            let ys: Vec<_> = (0..xs.len() as u64)
                .map(|i| fe(seed) * fe(i + 1) + fe(i * i))
                .collect();
            let p = Polynomial::interpolate(&xs, &ys).unwrap();
            prop_assert!(p.degree().map_or(true, |d| d < xs.len()));
            for (x, y) in xs.iter().zip(&ys) {
                prop_assert_eq!(p.eval(*x), *y);
            }
        }
    }

    #[test]
    fn trailing_zeros_are_trimmed() {
        let p = Polynomial::new(vec![fe(1), fe(2), FieldElement::ZERO, FieldElement::ZERO]);
        assert_eq!(p.degree(), Some(1));
        assert_eq!(Polynomial::new(vec![FieldElement::ZERO]).degree(), None);
        assert!((&p - &p).is_zero());
        assert_eq!(Polynomial::zero().free_term(), FieldElement::ZERO);
    }

    #[test]
    fn compose_linear_substitutes_scaled_variable() {
        let p = Polynomial::new(vec![fe(3), fe(0), fe(5), fe(7)]);
        let c = fe(11);
        let composed = p.compose_linear(c);
        for x in [0u64, 1, 2, 99, 123456] {
            assert_eq!(composed.eval(fe(x)), p.eval(c * fe(x)));
        }
    }

    #[test]
    fn non_exact_division_fails() {
        // (X^2 + 1) / (X - 1) leaves remainder 2.
        let p = Polynomial::new(vec![fe(1), fe(0), fe(1)]);
        let q = &Polynomial::x() - &Polynomial::constant(fe(1));
        assert_eq!(
            p.div_exact(&q),
            Err(PolynomialError::NonZeroRemainder { remainder_degree: 0 })
        );
        assert_eq!(p.div_exact(&Polynomial::zero()), Err(PolynomialError::DivisionByZero));
    }

    #[test]
    fn division_by_larger_degree_is_all_remainder() {
        let p = Polynomial::x();
        let q = Polynomial::monomial(3, fe(2));
        let (quotient, remainder) = p.div_rem(&q).unwrap();
        assert!(quotient.is_zero());
        assert_eq!(remainder, p);
    }

    #[test]
    fn vanishing_polynomial_vanishes() {
        let points = [fe(2), fe(3), fe(17)];
        let z = Polynomial::vanishing(&points);
        assert_eq!(z.degree(), Some(3));
        for x in points {
            assert_eq!(z.eval(x), FieldElement::ZERO);
        }
        assert_ne!(z.eval(fe(4)), FieldElement::ZERO);
    }

    #[test]
    fn x_pow_n_minus_one_factors_over_subgroup() {
        let g = FieldElement::subgroup_generator(16).unwrap();
        let subgroup: Vec<_> = (0..16).map(|i| g.pow(i)).collect();
        let x16_minus_one = &Polynomial::monomial(16, FieldElement::ONE)
            - &Polynomial::constant(FieldElement::ONE);
        assert_eq!(Polynomial::vanishing(&subgroup), x16_minus_one);
        assert_eq!(Polynomial::x().pow(16), Polynomial::monomial(16, FieldElement::ONE));
    }

    #[test]
    fn split_even_odd_recombines() {
        let p = Polynomial::new((1..=7).map(fe).collect());
        let (even, odd) = p.split_even_odd();
        let x = fe(42);
        assert_eq!(even.eval(x * x) + x * odd.eval(x * x), p.eval(x));
    }

    #[test]
    fn interpolation_rejects_bad_input() {
        assert_eq!(
            Polynomial::interpolate(&[fe(1), fe(1)], &[fe(2), fe(3)]),
            Err(PolynomialError::DuplicateInterpolationPoint(fe(1)))
        );
        assert_eq!(
            Polynomial::interpolate(&[fe(1)], &[]),
            Err(PolynomialError::LengthMismatch { xs: 1, ys: 0 })
        );
        assert!(Polynomial::interpolate(&[], &[]).unwrap().is_zero());
    }
}
