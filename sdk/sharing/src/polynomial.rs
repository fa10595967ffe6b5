//! Random polynomials over a prime field
//!
//! `f(x) = a0 + a1*x + ... + a_{k-1}*x^{k-1}` with `a0` the chunk being
//! shared and the remaining coefficients drawn from a [`CoefficientSource`].

use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use rand::{CryptoRng, RngCore};

use crate::error::{Result, SharingError};
use crate::field::PrimeField;
use crate::part::Point;

/// Supplies the random coefficients of sharing polynomials.
///
/// Every cryptographically secure generator is a source. Fixed sources are
/// only meant for test vectors: reusing coefficients breaks secrecy.
pub trait CoefficientSource {
    /// Next coefficient, which must lie in `[0, p)`.
    fn next_coefficient(&mut self, field: &PrimeField) -> BigUint;
}

impl<R: RngCore + CryptoRng + ?Sized> CoefficientSource for R {
    fn next_coefficient(&mut self, field: &PrimeField) -> BigUint {
        field.random(self)
    }
}

/// A sharing polynomial. Never serialized; `Debug` shows the degree only.
#[derive(Clone, PartialEq, Eq)]
pub struct Polynomial {
    coefficients: Vec<BigUint>,
}

impl Polynomial {
    /// Build from explicit coefficients, constant term first.
    pub fn from_coefficients(coefficients: Vec<BigUint>, field: &PrimeField) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(SharingError::invalid("polynomial needs at least one coefficient"));
        }
        if let Some(i) = coefficients.iter().position(|c| !field.contains(c)) {
            return Err(SharingError::invalid(format!(
                "coefficient {i} is not a field element"
            )));
        }
        Ok(Self { coefficients })
    }

    /// Degree `required - 1` polynomial with `constant` as its value at zero.
    ///
    /// With `required == 1` no coefficients are drawn and every evaluation
    /// equals the constant.
    pub fn random<S: CoefficientSource + ?Sized>(
        constant: BigUint,
        required: usize,
        field: &PrimeField,
        source: &mut S,
    ) -> Result<Self> {
        if required == 0 {
            return Err(SharingError::invalid("threshold must be at least 1"));
        }
        if !field.contains(&constant) {
            return Err(SharingError::invalid("chunk value is not below the modulus"));
        }

        let mut coefficients = Vec::with_capacity(required);
        coefficients.push(constant);
        for _ in 1..required {
            let c = source.next_coefficient(field);
            if !field.contains(&c) {
                return Err(SharingError::invalid(
                    "coefficient source produced a value outside the field",
                ));
            }
            coefficients.push(c);
        }
        Ok(Self { coefficients })
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    pub fn constant(&self) -> &BigUint {
        &self.coefficients[0]
    }

    /// Horner evaluation at `x`.
    pub fn evaluate(&self, x: &BigUint, field: &PrimeField) -> BigUint {
        self.coefficients
            .iter()
            .rev()
            .fold(BigUint::zero(), |acc, c| field.add(&field.mul(&acc, x), c))
    }

    pub fn evaluate_all(&self, xs: &[BigUint], field: &PrimeField) -> Vec<Point> {
        xs.iter()
            .map(|x| Point::new(x.clone(), self.evaluate(x, field)))
            .collect()
    }
}

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Polynomial")
            .field("degree", &self.degree())
            .finish_non_exhaustive()
    }
}

/// Share one chunk: build a fresh polynomial and evaluate it at every `x`.
pub fn split_chunk<S: CoefficientSource + ?Sized>(
    chunk: &BigUint,
    required: usize,
    xs: &[BigUint],
    field: &PrimeField,
    source: &mut S,
) -> Result<Vec<Point>> {
    if xs.iter().any(|x| x.is_zero()) {
        return Err(SharingError::invalid("x = 0 would reveal the secret"));
    }
    let polynomial = Polynomial::random(chunk.clone(), required, field, source)?;
    Ok(polynomial.evaluate_all(xs, field))
}
