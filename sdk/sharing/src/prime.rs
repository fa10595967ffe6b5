//! Prime modulus selection.
//!
//! A fresh prime is drawn for every split unless the caller pins one. The
//! prime is sized from the chunk width plus [`SAFETY_MARGIN_BITS`], so every
//! chunk value is strictly below it, and grown further when the number of
//! parts needs more distinct x-coordinates.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, ToPrimitive, Zero};
use rand::{CryptoRng, RngCore};

use crate::error::{Result, SharingError};

/// Extra bits above the chunk width
pub const SAFETY_MARGIN_BITS: u64 = 8;

/// Miller-Rabin rounds used when no count is configured
pub const DEFAULT_PRIMALITY_ROUNDS: usize = 40;

const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Bit length of the modulus needed for chunks of `chunk_bytes` bytes.
pub fn modulus_bits_for_chunk(chunk_bytes: usize) -> u64 {
    chunk_bytes as u64 * 8 + SAFETY_MARGIN_BITS
}

/// Probabilistic primality test: trial division, then `rounds` Miller-Rabin
/// witnesses drawn from `rng`.
pub fn is_probable_prime<R: RngCore + CryptoRng + ?Sized>(
    n: &BigUint,
    rounds: usize,
    rng: &mut R,
) -> bool {
    if let Some(small) = n.to_u32() {
        if small < 2 {
            return false;
        }
    }
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if *n == p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_one = n - &one;
    // n is odd and > 97 here, so n - 1 has at least one factor of two
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s as usize;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Generate a probable prime of exactly `bits` bits.
pub fn generate_prime<R: RngCore + CryptoRng + ?Sized>(
    bits: u64,
    rounds: usize,
    rng: &mut R,
) -> Result<BigUint> {
    if bits < 2 {
        return Err(SharingError::invalid(format!(
            "cannot generate a {bits}-bit prime"
        )));
    }
    if rounds == 0 {
        return Err(SharingError::invalid("primality rounds must be at least 1"));
    }

    let top = BigUint::one() << (bits - 1) as usize;
    loop {
        let candidate = (rng.gen_biguint(bits - 1) | &top) | BigUint::one();
        if is_probable_prime(&candidate, rounds, rng) {
            log::trace!("selected {bits}-bit modulus");
            return Ok(candidate);
        }
    }
}

/// Bit length of a modulus with more than `total` nonzero elements.
pub fn modulus_bits_for_count(total: usize) -> u64 {
    u64::from(usize::BITS - total.leading_zeros()) + 1
}

/// Pick the modulus for chunks of `chunk_bytes` bytes shared among `total`
/// participants.
///
/// When `total` needs the larger prime, the chunk width implied by the
/// modulus grows with it.
pub fn select_modulus<R: RngCore + CryptoRng + ?Sized>(
    chunk_bytes: usize,
    total: usize,
    rounds: usize,
    rng: &mut R,
) -> Result<BigUint> {
    if chunk_bytes == 0 {
        return Err(SharingError::invalid("chunk width must be at least one byte"));
    }
    let bits = modulus_bits_for_chunk(chunk_bytes).max(modulus_bits_for_count(total));
    generate_prime(bits, rounds, rng)
}
