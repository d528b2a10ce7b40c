//! Finite field arithmetic.
//!
//! All values handled by the prover live in the prime field of order
//! `p = 3·2^30 + 1`.  The [`FieldElement`] type stores a fully reduced
//! representative in `[0, p)` and exposes addition, subtraction,
//! multiplication, exponentiation and inversion.  The multiplicative group
//! has order `3·2^30`, so it contains cyclic subgroups of every order
//! dividing that number; those subgroups (and their cosets) are the
//! evaluation domains of the proof system.

use std::fmt;
use std::iter::{Product, Sum};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// The field modulus `3·2^30 + 1`.
pub const MODULUS: u64 = 3 * (1 << 30) + 1;

/// Order of the multiplicative group, `p - 1 = 3·2^30`.
pub const GROUP_ORDER: u64 = MODULUS - 1;

/// Generator of the full multiplicative group.
const GENERATOR: u64 = 5;

/// Failures raised by field arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Attempted to invert or divide by the additive identity.
    #[error("division by zero in the prime field")]
    DivisionByZero,
    /// A raw value was not a canonical representative of the field.
    #[error("value {0} is not below the field modulus")]
    NonCanonical(u64),
    /// A subgroup was requested whose order does not divide `3·2^30`.
    #[error("subgroup order {0} does not divide the multiplicative group order")]
    InvalidSubgroupOrder(u64),
}

/// An element of the prime field `F_p`, `p = 3·2^30 + 1`.
///
/// The stored value is always reduced, so the derived equality and hashing
/// compare field elements rather than integer representatives.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct FieldElement(u64);

impl FieldElement {
    /// The additive identity.
    pub const ZERO: FieldElement = FieldElement(0);
    /// The multiplicative identity.
    pub const ONE: FieldElement = FieldElement(1);

    /// Creates a field element, reducing `value` modulo `p`.
    #[inline]
    pub const fn new(value: u64) -> Self {
        FieldElement(value % MODULUS)
    }

    /// Creates a field element from a canonical representative.
    ///
    /// Returns [`FieldError::NonCanonical`] when `value >= p`.
    pub fn try_from_canonical(value: u64) -> Result<Self, FieldError> {
        if value < MODULUS {
            Ok(FieldElement(value))
        } else {
            Err(FieldError::NonCanonical(value))
        }
    }

    /// Returns the reduced integer representative.
    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the fixed generator of the multiplicative group.
    #[inline]
    pub const fn generator() -> Self {
        FieldElement(GENERATOR)
    }

    /// Returns `true` for the additive identity.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Raises `self` to `exponent` by square-and-multiply.
    pub fn pow(self, mut exponent: u64) -> Self {
        let mut base = self;
        let mut result = FieldElement::ONE;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result *= base;
            }
            base *= base;
            exponent >>= 1;
        }
        result
    }

    /// Computes the multiplicative inverse.
    ///
    /// Uses Fermat's little theorem, `a^(p-2) = a^-1`.  Zero has no inverse.
    pub fn inverse(self) -> Result<Self, FieldError> {
        if self.is_zero() {
            return Err(FieldError::DivisionByZero);
        }
        Ok(self.pow(MODULUS - 2))
    }

    /// Divides `self` by `rhs`.
    pub fn checked_div(self, rhs: Self) -> Result<Self, FieldError> {
        Ok(self * rhs.inverse()?)
    }

    /// Returns a generator of the cyclic subgroup of the given order.
    pub fn subgroup_generator(order: u64) -> Result<Self, FieldError> {
        if order == 0 || GROUP_ORDER % order != 0 {
            return Err(FieldError::InvalidSubgroupOrder(order));
        }
        Ok(Self::generator().pow(GROUP_ORDER / order))
    }

    /// Canonical 4-byte big-endian encoding, used for hashing.
    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        // p < 2^32, so every reduced value fits.
        (self.0 as u32).to_be_bytes()
    }

    /// Samples a uniformly random element.
    ///
    /// Not cryptographic; the prover never calls this.
    pub fn random_element<R: Rng + ?Sized>(rng: &mut R) -> Self {
        FieldElement(rng.gen_range(0..MODULUS))
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.0)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        FieldElement::try_from_canonical(raw).map_err(serde::de::Error::custom)
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        FieldElement::new(value)
    }
}

impl From<u32> for FieldElement {
    fn from(value: u32) -> Self {
        FieldElement::new(value as u64)
    }
}

impl Add for FieldElement {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut s = self.0 + rhs.0;
        if s >= MODULUS {
            s -= MODULUS;
        }
        FieldElement(s)
    }
}

impl Sub for FieldElement {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        if self.0 >= rhs.0 {
            FieldElement(self.0 - rhs.0)
        } else {
            FieldElement(MODULUS - (rhs.0 - self.0))
        }
    }
}

impl Mul for FieldElement {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        // Both operands are below 2^32, so the product fits in a u64.
        FieldElement((self.0 * rhs.0) % MODULUS)
    }
}

impl Neg for FieldElement {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        FieldElement::ZERO - self
    }
}

impl AddAssign for FieldElement {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for FieldElement {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for FieldElement {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Sum for FieldElement {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(FieldElement::ZERO, |acc, x| acc + x)
    }
}

impl Product for FieldElement {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(FieldElement::ONE, |acc, x| acc * x)
    }
}
