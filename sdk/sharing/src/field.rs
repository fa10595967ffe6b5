//! Prime Field Arithmetic
//!
//! All polynomial evaluation and interpolation go through [`PrimeField`].
//! Operands are reduced modulo the prime before use, and every result lies
//! in `[0, p)`.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use crate::error::{Result, SharingError};

/// The field of integers modulo a prime `p`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimeField {
    modulus: BigUint,
}

impl PrimeField {
    /// Create a field over `modulus`.
    ///
    /// Primality is not checked here; a composite modulus surfaces as
    /// [`SharingError::NotInvertible`] during interpolation.
    pub fn new(modulus: BigUint) -> Result<Self> {
        if modulus < BigUint::from(2u32) {
            return Err(SharingError::invalid(format!(
                "field modulus must be at least 2, got {modulus}"
            )));
        }
        Ok(Self { modulus })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Bit length of the modulus
    pub fn bits(&self) -> u64 {
        self.modulus.bits()
    }

    /// True if `a` is already a canonical field element.
    pub fn contains(&self, a: &BigUint) -> bool {
        a < &self.modulus
    }

    pub fn reduce(&self, a: &BigUint) -> BigUint {
        a % &self.modulus
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.modulus
    }

    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let a = self.reduce(a);
        let b = self.reduce(b);
        if a >= b {
            a - b
        } else {
            &self.modulus - b + a
        }
    }

    pub fn neg(&self, a: &BigUint) -> BigUint {
        self.sub(&BigUint::zero(), a)
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.modulus
    }

    pub fn pow(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        base.modpow(exponent, &self.modulus)
    }

    /// Multiplicative inverse via the extended Euclidean algorithm.
    pub fn inv(&self, a: &BigUint) -> Result<BigUint> {
        let p = BigInt::from(self.modulus.clone());
        let mut old_r = BigInt::from(self.reduce(a));
        let mut r = p.clone();
        let mut old_s = BigInt::one();
        let mut s = BigInt::zero();

        while !r.is_zero() {
            let q = &old_r / &r;
            let next_r = &old_r - &q * &r;
            old_r = std::mem::replace(&mut r, next_r);
            let next_s = &old_s - &q * &s;
            old_s = std::mem::replace(&mut s, next_s);
        }

        if !old_r.is_one() {
            return Err(SharingError::NotInvertible(a.clone()));
        }

        // old_s may be negative
        let normalized = ((old_s % &p) + &p) % &p;
        normalized
            .to_biguint()
            .ok_or_else(|| SharingError::NotInvertible(a.clone()))
    }

    pub fn div(&self, a: &BigUint, b: &BigUint) -> Result<BigUint> {
        Ok(self.mul(a, &self.inv(b)?))
    }

    /// Uniformly random element of `[0, p)`
    pub fn random<R: RngCore + CryptoRng + ?Sized>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_below(&self.modulus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(p: u32) -> PrimeField {
        PrimeField::new(BigUint::from(p)).unwrap()
    }

    fn n(v: u32) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_rejects_tiny_modulus() {
        assert!(PrimeField::new(n(0)).is_err());
        assert!(PrimeField::new(n(1)).is_err());
        assert!(PrimeField::new(n(2)).is_ok());
    }

    #[test]
    fn test_add_sub_wrap() {
        let field = f(257);
        assert_eq!(field.add(&n(200), &n(100)), n(43));
        assert_eq!(field.sub(&n(3), &n(5)), n(255));
        assert_eq!(field.sub(&n(5), &n(3)), n(2));
        assert_eq!(field.neg(&n(1)), n(256));
        assert_eq!(field.neg(&n(0)), n(0));
    }

    #[test]
    fn test_mul_and_pow() {
        let field = f(17);
        assert_eq!(field.mul(&n(5), &n(7)), n(1));
        // Fermat: a^(p-1) = 1
        assert_eq!(field.pow(&n(3), &n(16)), n(1));
    }

    #[test]
    fn test_inverse() {
        let field = f(257);
        for a in 1..257u32 {
            let inv = field.inv(&n(a)).unwrap();
            assert_eq!(field.mul(&n(a), &inv), n(1), "a = {a}");
        }
    }

    #[test]
    fn test_inverse_of_zero_fails() {
        let field = f(257);
        let err = field.inv(&n(0)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Arithmetic);
        assert!(field.inv(&n(257)).is_err());
    }

    #[test]
    fn test_inverse_composite_modulus() {
        let field = f(15);
        assert!(field.inv(&n(5)).is_err());
        assert_eq!(field.inv(&n(2)).unwrap(), n(8));
    }

    #[test]
    fn test_div() {
        let field = f(17);
        let q = field.div(&n(3), &n(4)).unwrap();
        assert_eq!(field.mul(&q, &n(4)), n(3));
    }
}
